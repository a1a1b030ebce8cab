// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The aggregated "list available packages" endpoint.

use std::collections::BTreeSet;
use std::time::Duration;

use pkgmux_config::{AggregationConfig, PageSplit};
use pkgmux_core::types::{GetAvailablePackageSummariesRequest, GetAvailablePackageSummariesResponse};
use pkgmux_core::PkgmuxError;
use pkgmux_paginate::CompositeCursor;
use pkgmux_plugin::PluginSnapshot;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::merge::FanIn;

/// Tuning of an aggregated listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationOptions {
    pub page_split: PageSplit,
    /// Deadline for the whole call; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl From<&AggregationConfig> for AggregationOptions {
    fn from(config: &AggregationConfig) -> Self {
        Self {
            page_split: config.page_split,
            request_timeout: config.request_timeout(),
        }
    }
}

/// List available packages across every plugin in `plugins`, sorted by name.
///
/// The request's page token is a composite cursor produced by a previous
/// call, or empty for the first page. The returned next page token is empty
/// once every plugin is exhausted.
pub async fn list_available_packages(
    plugins: &PluginSnapshot,
    request: GetAvailablePackageSummariesRequest,
    options: &AggregationOptions,
    cancel: &CancellationToken,
) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
    let context = request.context.clone().unwrap_or_default();
    info!(
        cluster = %context.cluster,
        namespace = %context.namespace,
        page_size = request.page_size(),
        plugins = plugins.len(),
        "listing available packages"
    );

    let cursor = CompositeCursor::parse(request.page_token())?;
    let page = collect_page(plugins, &request, cursor, options.page_split, cancel);
    match options.request_timeout {
        Some(duration) => tokio::time::timeout(duration, page)
            .await
            .map_err(|_| PkgmuxError::Timeout { duration })?,
        None => page.await,
    }
}

async fn collect_page(
    plugins: &PluginSnapshot,
    request: &GetAvailablePackageSummariesRequest,
    cursor: CompositeCursor,
    split: PageSplit,
    cancel: &CancellationToken,
) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
    let mut engine = FanIn::start(plugins, request, cursor, split, cancel);
    let mut summaries = Vec::new();
    let mut categories = BTreeSet::new();

    while let Some(item) = engine.next_item().await? {
        categories.extend(item.categories);
        summaries.push(item.summary);
    }

    let cursor = engine.cursor();
    let next_page_token = if cursor.all_exhausted() {
        String::new()
    } else {
        cursor.encode()?
    };

    Ok(GetAvailablePackageSummariesResponse {
        available_package_summaries: summaries,
        categories: categories.into_iter().collect(),
        next_page_token,
    })
}
