// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for pkgmux integration tests.
//!
//! # Components
//!
//! - [`MockPlugin`] - Scripted backend plugin with failure injection and call counters
//! - [`TestHarness`] - Registry of mock and catalog plugins for end-to-end tests

pub mod harness;
pub mod mock_plugin;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_plugin::MockPlugin;
