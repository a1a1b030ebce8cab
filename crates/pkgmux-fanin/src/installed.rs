// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installed-package listing across every plugin.
//!
//! Installed lists are small and not merged incrementally: every plugin is
//! asked once, concurrently, and the results are concatenated and sorted.
//! Pagination options are forwarded but the combined list is not paginated.

use futures::future::try_join_all;
use pkgmux_core::types::{
    Context, GetInstalledPackageSummariesRequest, GetInstalledPackageSummariesResponse,
    InstalledPackageRef, InstalledPackageSummary,
};
use pkgmux_core::{BackendTarget, PkgmuxError, PluginHandle};
use pkgmux_plugin::PluginSnapshot;
use tracing::info;

const OPERATION: &str = "get the installed package summaries";

/// List installed packages of every plugin, sorted by name then plugin name.
///
/// Any plugin failure fails the whole call.
pub async fn list_installed_packages(
    plugins: &PluginSnapshot,
    request: GetInstalledPackageSummariesRequest,
) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError> {
    let context = request.context.clone().unwrap_or_default();
    info!(
        cluster = %context.cluster,
        namespace = %context.namespace,
        plugins = plugins.len(),
        "listing installed packages"
    );

    let calls = plugins
        .iter()
        .map(|handle| fetch(handle, request.clone(), &context));
    let batches = try_join_all(calls).await?;

    let mut summaries: Vec<InstalledPackageSummary> = batches.into_iter().flatten().collect();
    summaries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| plugin_name(a).cmp(plugin_name(b)))
    });

    Ok(GetInstalledPackageSummariesResponse {
        installed_package_summaries: summaries,
        next_page_token: String::new(),
    })
}

async fn fetch(
    handle: &PluginHandle,
    request: GetInstalledPackageSummariesRequest,
    context: &Context,
) -> Result<Vec<InstalledPackageSummary>, PkgmuxError> {
    let response = handle
        .service
        .get_installed_package_summaries(request)
        .await
        .map_err(|e| PkgmuxError::Backend {
            operation: OPERATION,
            target: BackendTarget::Context {
                cluster: context.cluster.clone(),
                namespace: context.namespace.clone(),
            },
            plugin: handle.name().to_string(),
            source: Box::new(e),
        })?;

    Ok(response
        .installed_package_summaries
        .into_iter()
        .map(|mut summary| {
            summary
                .installed_package_ref
                .get_or_insert_with(InstalledPackageRef::default)
                .plugin = Some(handle.plugin.clone());
            summary
        })
        .collect())
}

fn plugin_name(summary: &InstalledPackageSummary) -> &str {
    summary
        .installed_package_ref
        .as_ref()
        .and_then(|r| r.plugin.as_ref())
        .map(|p| p.name.as_str())
        .unwrap_or_default()
}
