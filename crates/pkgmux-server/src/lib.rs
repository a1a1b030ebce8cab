// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pkgmux core service.
//!
//! [`PackagesServer`] implements the same [`PackagesService`] contract as the
//! plugins it fronts: listings fan out to every plugin, every other
//! operation is routed to the plugin its reference names.
//!
//! [`PackagesService`]: pkgmux_core::PackagesService

pub mod server;

pub use server::PackagesServer;
