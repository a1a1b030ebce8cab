// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pagination primitives for pkgmux.
//!
//! - [`token`]: a single plugin's page token, which encodes an item offset
//!   or the exhaustion sentinel.
//! - [`cursor`]: the composite cursor handed to callers of the aggregated
//!   listing, mapping every plugin name to its own progress.

pub mod cursor;
pub mod token;

pub use cursor::{CompositeCursor, PluginCursor};
pub use token::{offset_token, page_window, parse_offset, EXHAUSTED_TOKEN};
