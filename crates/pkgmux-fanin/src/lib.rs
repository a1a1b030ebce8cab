// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out and fan-in over every registered plugin.
//!
//! - [`streamer`]: one task per plugin turning its paginated responses into a
//!   stream of candidates.
//! - [`merge`]: the k-way merge of those streams by package name, tracking a
//!   composite cursor as items are emitted.
//! - [`summaries`]: the aggregated "list available packages" endpoint.
//! - [`installed`]: the non-paginated installed-package fan-out.

pub mod installed;
pub mod merge;
pub mod streamer;
pub mod summaries;

pub use installed::list_installed_packages;
pub use merge::{plugin_page_size, FanIn, MergedItem};
pub use streamer::{Candidate, StreamEvent};
pub use summaries::{list_available_packages, AggregationOptions};
