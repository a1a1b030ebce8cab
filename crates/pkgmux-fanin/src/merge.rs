// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! K-way merge of per-plugin summary streams.
//!
//! [`FanIn`] keeps one head candidate per plugin and repeatedly emits the
//! smallest by name, ties going to the plugin registered first. Each emitted
//! item carries the composite cursor as of that item, so a caller can resume
//! right after it. The engine owns its workers: dropping it cancels them.

use pkgmux_config::PageSplit;
use pkgmux_core::types::{AvailablePackageSummary, GetAvailablePackageSummariesRequest};
use pkgmux_core::PkgmuxError;
use pkgmux_paginate::{CompositeCursor, PluginCursor};
use pkgmux_plugin::PluginSnapshot;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::streamer::{self, Candidate, StreamEvent};

/// Per-plugin page size for a global page size spread over `plugins`.
///
/// A global size of zero (unbounded) is passed through; any other size
/// yields at least one item per plugin.
pub fn plugin_page_size(split: PageSplit, page_size: u32, plugins: usize) -> u32 {
    if page_size == 0 || plugins == 0 {
        return page_size;
    }
    let n = u32::try_from(plugins).unwrap_or(u32::MAX);
    let size = match split {
        PageSplit::Even => page_size.div_ceil(n),
        PageSplit::Legacy if n > 1 => page_size / (n - 1),
        PageSplit::Legacy => page_size,
    };
    size.max(1)
}

/// One merged summary.
#[derive(Debug, Clone)]
pub struct MergedItem {
    pub summary: AvailablePackageSummary,
    /// Progress of every plugin once this item is consumed.
    pub cursor: CompositeCursor,
    pub categories: Vec<String>,
}

struct Slot {
    plugin: String,
    /// `None` once the plugin has ended.
    events: Option<mpsc::Receiver<StreamEvent>>,
    head: Option<Candidate>,
}

/// The merge engine for one aggregated call. Not restartable.
pub struct FanIn {
    slots: Vec<Slot>,
    cursor: CompositeCursor,
    /// Items still to emit; `None` is unbounded.
    remaining: Option<usize>,
    done: bool,
    cancel: CancellationToken,
    tasks: JoinSet<()>,
    _guard: DropGuard,
}

impl FanIn {
    /// Start one streamer per plugin in `plugins`, resuming from `cursor`.
    ///
    /// Cursor entries for plugins outside the snapshot are dropped. The
    /// workers observe a child of `parent`.
    pub fn start(
        plugins: &PluginSnapshot,
        request: &GetAvailablePackageSummariesRequest,
        mut cursor: CompositeCursor,
        split: PageSplit,
        parent: &CancellationToken,
    ) -> Self {
        cursor.retain_plugins(plugins.names());
        for name in plugins.names() {
            let current = cursor.get(name);
            cursor.set(name, current);
        }

        let page_size = request.page_size();
        let per_plugin = plugin_page_size(split, page_size, plugins.len());
        let cancel = parent.child_token();
        let mut tasks = JoinSet::new();

        let slots = plugins
            .iter()
            .map(|handle| {
                let start = cursor.get(handle.name());
                debug!(plugin = handle.name(), %start, per_plugin, "starting streamer");
                let events = streamer::spawn(
                    &mut tasks,
                    handle.clone(),
                    request.clone(),
                    per_plugin,
                    start,
                    cancel.clone(),
                );
                Slot {
                    plugin: handle.name().to_string(),
                    events: Some(events),
                    head: None,
                }
            })
            .collect();

        Self {
            slots,
            cursor,
            remaining: (page_size > 0).then_some(page_size as usize),
            done: false,
            _guard: cancel.clone().drop_guard(),
            cancel,
            tasks,
        }
    }

    /// Composite cursor as of the last emitted item.
    pub fn cursor(&self) -> &CompositeCursor {
        &self.cursor
    }

    /// Pull the next merged item. `Ok(None)` once the page is full or every
    /// plugin has ended; the first error stops every worker.
    pub async fn next_item(&mut self) -> Result<Option<MergedItem>, PkgmuxError> {
        if self.done {
            return Ok(None);
        }
        if self.remaining == Some(0) {
            self.finish();
            return Ok(None);
        }

        if let Err(e) = self.refill().await {
            warn!(error = %e, "aborting merge");
            self.finish();
            return Err(e);
        }

        let mut best: Option<usize> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(candidate) = &slot.head else {
                continue;
            };
            let better = match best.and_then(|b| self.slots[b].head.as_ref()) {
                Some(current) => candidate.summary.name < current.summary.name,
                None => true,
            };
            if better {
                best = Some(i);
            }
        }

        let Some(index) = best else {
            self.finish();
            return Ok(None);
        };
        let slot = &mut self.slots[index];
        let Some(candidate) = slot.head.take() else {
            return Ok(None);
        };
        self.cursor.set(&slot.plugin, candidate.cursor);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }

        Ok(Some(MergedItem {
            summary: candidate.summary,
            cursor: self.cursor.clone(),
            categories: candidate.categories,
        }))
    }

    /// Fill every empty head of a live plugin.
    async fn refill(&mut self) -> Result<(), PkgmuxError> {
        for slot in &mut self.slots {
            if slot.head.is_some() {
                continue;
            }
            let Some(events) = slot.events.as_mut() else {
                continue;
            };
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(PkgmuxError::Cancelled),
                event = events.recv() => event,
            };
            match event {
                Some(StreamEvent::Item(candidate)) => slot.head = Some(candidate),
                Some(StreamEvent::End) => {
                    self.cursor.set(&slot.plugin, PluginCursor::Exhausted);
                    slot.events = None;
                }
                Some(StreamEvent::Error(e)) => return Err(e),
                None if self.cancel.is_cancelled() => return Err(PkgmuxError::Cancelled),
                None => {
                    return Err(PkgmuxError::Internal(format!(
                        "stream of the plugin {:?} closed without ending",
                        slot.plugin
                    )));
                }
            }
        }
        Ok(())
    }

    /// Stop every worker. Further calls to `next_item` return `Ok(None)`.
    fn finish(&mut self) {
        self.done = true;
        self.cancel.cancel();
        self.tasks.abort_all();
        for slot in &mut self.slots {
            slot.events = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_rounds_up() {
        assert_eq!(plugin_page_size(PageSplit::Even, 10, 3), 4);
        assert_eq!(plugin_page_size(PageSplit::Even, 3, 2), 2);
        assert_eq!(plugin_page_size(PageSplit::Even, 5, 1), 5);
    }

    #[test]
    fn legacy_split_divides_by_one_less() {
        assert_eq!(plugin_page_size(PageSplit::Legacy, 10, 3), 5);
        assert_eq!(plugin_page_size(PageSplit::Legacy, 3, 2), 3);
        assert_eq!(plugin_page_size(PageSplit::Legacy, 7, 1), 7);
    }

    #[test]
    fn non_zero_page_size_never_splits_to_zero() {
        assert_eq!(plugin_page_size(PageSplit::Even, 1, 5), 1);
        assert_eq!(plugin_page_size(PageSplit::Legacy, 1, 5), 1);
    }

    #[test]
    fn unbounded_and_empty_pass_through() {
        assert_eq!(plugin_page_size(PageSplit::Even, 0, 3), 0);
        assert_eq!(plugin_page_size(PageSplit::Legacy, 0, 3), 0);
        assert_eq!(plugin_page_size(PageSplit::Even, 4, 0), 4);
    }
}
