// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin streaming of available package summaries.
//!
//! A streamer walks one plugin's pages starting at a given offset and hands
//! each summary to the merge engine through a channel of capacity one, so it
//! never runs more than one item ahead of the consumer. Every backend call
//! and every send races the cancellation token.

use pkgmux_core::types::{
    AvailablePackageSummary, GetAvailablePackageSummariesRequest, PaginationOptions,
};
use pkgmux_core::{BackendTarget, PkgmuxError, PluginHandle};
use pkgmux_paginate::{offset_token, PluginCursor};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const OPERATION: &str = "get the available package summaries";

/// A summary ready for merging.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub summary: AvailablePackageSummary,
    /// Categories of the response this summary opened; empty otherwise.
    pub categories: Vec<String>,
    /// Plugin progress once this summary has been consumed.
    pub cursor: PluginCursor,
}

/// What a streamer yields.
#[derive(Debug)]
pub enum StreamEvent {
    Item(Candidate),
    /// The plugin has no further results.
    End,
    /// The stream failed; nothing follows.
    Error(PkgmuxError),
}

/// Spawn a streamer for `handle` onto `tasks`.
///
/// `template` carries the context and filters forwarded to the plugin; its
/// pagination options are replaced per page with `page_size` and the token
/// for the tracked offset.
pub fn spawn(
    tasks: &mut JoinSet<()>,
    handle: PluginHandle,
    template: GetAvailablePackageSummariesRequest,
    page_size: u32,
    start: PluginCursor,
    cancel: CancellationToken,
) -> mpsc::Receiver<StreamEvent> {
    // Capacity one: the worker may hold one item beyond the merge's head, so
    // it can request its next page one item earlier than a strict handoff.
    let (tx, rx) = mpsc::channel(1);
    tasks.spawn(run(handle, template, page_size, start, tx, cancel));
    rx
}

/// Hand one event to the consumer. Returns false when the stream must stop.
async fn emit(
    tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(event) => sent.is_ok(),
    }
}

async fn run(
    handle: PluginHandle,
    template: GetAvailablePackageSummariesRequest,
    page_size: u32,
    start: PluginCursor,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
) {
    let plugin = handle.name().to_string();
    let mut offset = match start {
        PluginCursor::Exhausted => {
            debug!(plugin = %plugin, "plugin already exhausted, not queried");
            emit(&tx, &cancel, StreamEvent::End).await;
            return;
        }
        PluginCursor::Offset(offset) => offset,
    };

    loop {
        let mut request = template.clone();
        request.pagination_options = Some(PaginationOptions {
            page_token: offset_token(PluginCursor::Offset(offset)),
            page_size,
        });
        let context = request.context.clone().unwrap_or_default();
        let target = BackendTarget::Context {
            cluster: context.cluster,
            namespace: context.namespace,
        };

        debug!(plugin = %plugin, offset, page_size, "requesting page");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            response = handle.service.get_available_package_summaries(request) => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(source) => {
                let error = PkgmuxError::Backend {
                    operation: OPERATION,
                    target,
                    plugin: plugin.clone(),
                    source: Box::new(source),
                };
                emit(&tx, &cancel, StreamEvent::Error(error)).await;
                return;
            }
        };

        let count = response.available_package_summaries.len() as u64;
        let last_page = response.next_page_token.is_empty();
        let expected = offset + count;
        if !last_page {
            // The echoed token must be the exact decimal spelling of the offset.
            let consistent = count > 0 && response.next_page_token == expected.to_string();
            if !consistent {
                let error = PkgmuxError::Inconsistency {
                    plugin: plugin.clone(),
                    got: response.next_page_token,
                    expected,
                };
                emit(&tx, &cancel, StreamEvent::Error(error)).await;
                return;
            }
        }

        let mut categories = Some(response.categories);
        let total = response.available_package_summaries.len();
        for (i, summary) in response.available_package_summaries.into_iter().enumerate() {
            offset += 1;
            let cursor = if last_page && i + 1 == total {
                PluginCursor::Exhausted
            } else {
                PluginCursor::Offset(offset)
            };
            let candidate = Candidate {
                summary,
                categories: categories.take().unwrap_or_default(),
                cursor,
            };
            if !emit(&tx, &cancel, StreamEvent::Item(candidate)).await {
                return;
            }
        }

        if last_page {
            debug!(plugin = %plugin, offset, "plugin exhausted");
            emit(&tx, &cancel, StreamEvent::End).await;
            return;
        }
    }
}
