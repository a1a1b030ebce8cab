// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for pkgmux.
//!
//! This crate provides the package-query contract every backend plugin
//! implements, the error type shared by plugins and the core, and the
//! package data model.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BackendTarget, ErrorCode, PkgmuxError};
pub use traits::{PackagesService, PluginHandle};
pub use types::PluginRef;
