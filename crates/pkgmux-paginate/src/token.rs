// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-plugin page tokens.
//!
//! A plugin page token is the decimal item offset of the first item of the
//! page. The empty token is offset zero and `"-1"` marks a plugin that has
//! already been exhausted.

use std::ops::Range;

use pkgmux_core::PkgmuxError;

use crate::cursor::PluginCursor;

/// Token value of [`PluginCursor::Exhausted`].
pub const EXHAUSTED_TOKEN: &str = "-1";

/// Parse a plugin page token into an item offset or the exhaustion sentinel.
pub fn parse_offset(token: &str) -> Result<PluginCursor, PkgmuxError> {
    if token.is_empty() {
        return Ok(PluginCursor::Offset(0));
    }
    if token == EXHAUSTED_TOKEN {
        return Ok(PluginCursor::Exhausted);
    }
    token
        .parse::<u64>()
        .map(PluginCursor::Offset)
        .map_err(|e| PkgmuxError::InvalidPageToken {
            token: token.to_string(),
            reason: e.to_string(),
        })
}

/// Encode a plugin cursor as a page token.
pub fn offset_token(cursor: PluginCursor) -> String {
    cursor.to_string()
}

/// Compute the page of an in-memory list of `total` items.
///
/// Returns the index range to serve and the next page token, which is empty
/// when the page reaches the end. A `page_size` of zero serves everything
/// from the offset on.
pub fn page_window(
    total: usize,
    token: &str,
    page_size: u32,
) -> Result<(Range<usize>, String), PkgmuxError> {
    let start = match parse_offset(token)? {
        PluginCursor::Exhausted => return Ok((total..total, String::new())),
        PluginCursor::Offset(offset) => usize::try_from(offset).unwrap_or(usize::MAX).min(total),
    };
    let end = if page_size == 0 {
        total
    } else {
        start.saturating_add(page_size as usize).min(total)
    };
    let next = if end < total {
        end.to_string()
    } else {
        String::new()
    };
    Ok((start..end, next))
}
