// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin contract definitions.
//!
//! Every backend plugin implements [`PackagesService`] and uses
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod service;

pub use service::{PackagesService, PluginHandle};
