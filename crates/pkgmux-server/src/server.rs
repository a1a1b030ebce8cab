// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core service combining the router and the aggregator.

use async_trait::async_trait;
use pkgmux_config::AggregationConfig;
use pkgmux_core::types::*;
use pkgmux_core::{PackagesService, PkgmuxError};
use pkgmux_fanin::{list_available_packages, list_installed_packages, AggregationOptions};
use pkgmux_plugin::{PluginRegistry, PluginSnapshot};
use pkgmux_router::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The core service over one immutable set of plugins.
pub struct PackagesServer {
    plugins: PluginSnapshot,
    router: Router,
    options: AggregationOptions,
    shutdown: CancellationToken,
}

impl PackagesServer {
    pub fn new(plugins: PluginSnapshot, options: AggregationOptions) -> Self {
        Self {
            router: Router::new(plugins.clone()),
            plugins,
            options,
            shutdown: CancellationToken::new(),
        }
    }

    /// Serve the enabled plugins of `registry` with the configured aggregation.
    pub fn from_registry(registry: &PluginRegistry, config: &AggregationConfig) -> Self {
        for entry in registry.list_all() {
            info!(
                plugin = entry.handle.name(),
                version = %entry.handle.plugin.version,
                status = %entry.status,
                "serving plugin"
            );
        }
        Self::new(registry.snapshot(), AggregationOptions::from(config))
    }

    /// Cancel in-flight aggregations when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn plugins(&self) -> &PluginSnapshot {
        &self.plugins
    }
}

#[async_trait]
impl PackagesService for PackagesServer {
    async fn get_available_package_summaries(
        &self,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
        list_available_packages(&self.plugins, request, &self.options, &self.shutdown).await
    }

    async fn get_available_package_detail(
        &self,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, PkgmuxError> {
        self.router.get_available_package_detail(request).await
    }

    async fn get_available_package_versions(
        &self,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError> {
        self.router.get_available_package_versions(request).await
    }

    async fn get_installed_package_summaries(
        &self,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError> {
        list_installed_packages(&self.plugins, request).await
    }

    async fn get_installed_package_detail(
        &self,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, PkgmuxError> {
        self.router.get_installed_package_detail(request).await
    }

    async fn get_installed_package_resource_refs(
        &self,
        request: GetInstalledPackageResourceRefsRequest,
    ) -> Result<GetInstalledPackageResourceRefsResponse, PkgmuxError> {
        self.router.get_installed_package_resource_refs(request).await
    }

    async fn create_installed_package(
        &self,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, PkgmuxError> {
        self.router.create_installed_package(request).await
    }

    async fn update_installed_package(
        &self,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, PkgmuxError> {
        self.router.update_installed_package(request).await
    }

    async fn delete_installed_package(
        &self,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, PkgmuxError> {
        self.router.delete_installed_package(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgmux_core::ErrorCode;
    use pkgmux_test_utils::{MockPlugin, TestHarness};

    #[tokio::test]
    async fn shutdown_cancels_listings() {
        let harness = TestHarness::builder()
            .with_mock(MockPlugin::new("helm").with_packages(["apache"]))
            .build()
            .unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let server = PackagesServer::from_registry(&harness.registry, &AggregationConfig::default())
            .with_shutdown(shutdown);

        let err = server
            .get_available_package_summaries(GetAvailablePackageSummariesRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Cancelled);
    }

    #[tokio::test]
    async fn serves_only_enabled_plugins() {
        let mut harness = TestHarness::builder()
            .with_mock(MockPlugin::new("helm").with_packages(["apache"]))
            .with_mock(MockPlugin::new("flux").with_packages(["podinfo"]))
            .build()
            .unwrap();
        harness.registry.set_enabled("flux", false).unwrap();
        let server =
            PackagesServer::from_registry(&harness.registry, &AggregationConfig::default());
        assert_eq!(server.plugins().len(), 1);

        let resp = server
            .get_available_package_summaries(GetAvailablePackageSummariesRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.available_package_summaries.len(), 1);
        assert_eq!(harness.mock("flux").unwrap().calls(), 0);
    }
}
