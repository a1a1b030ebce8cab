// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-target routing for pkgmux.
//!
//! [`Router`] forwards a request addressed to one named plugin, wraps backend
//! failures with the operation, target and plugin, and rejects responses that
//! miss the fields their operation guarantees.

pub mod router;

pub use router::Router;
