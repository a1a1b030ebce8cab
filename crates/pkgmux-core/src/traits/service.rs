// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The package-query contract shared by every backend plugin and the core.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PkgmuxError;
use crate::types::{
    CreateInstalledPackageRequest, CreateInstalledPackageResponse, DeleteInstalledPackageRequest,
    DeleteInstalledPackageResponse, GetAvailablePackageDetailRequest,
    GetAvailablePackageDetailResponse, GetAvailablePackageSummariesRequest,
    GetAvailablePackageSummariesResponse, GetAvailablePackageVersionsRequest,
    GetAvailablePackageVersionsResponse, GetInstalledPackageDetailRequest,
    GetInstalledPackageDetailResponse, GetInstalledPackageResourceRefsRequest,
    GetInstalledPackageResourceRefsResponse, GetInstalledPackageSummariesRequest,
    GetInstalledPackageSummariesResponse, PluginRef, UpdateInstalledPackageRequest,
    UpdateInstalledPackageResponse,
};

/// Package-query contract.
///
/// Backends implement it per packaging technology; the core implements it
/// again on top of all registered backends.
///
/// `get_available_package_summaries` must return summaries sorted by name
/// and honour offset-based page tokens: the token of the next page is the
/// offset of its first item, and an empty token marks the last page.
#[async_trait]
pub trait PackagesService: Send + Sync + 'static {
    async fn get_available_package_summaries(
        &self,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError>;

    async fn get_available_package_detail(
        &self,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, PkgmuxError>;

    async fn get_available_package_versions(
        &self,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError>;

    async fn get_installed_package_summaries(
        &self,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError>;

    async fn get_installed_package_detail(
        &self,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, PkgmuxError>;

    async fn get_installed_package_resource_refs(
        &self,
        request: GetInstalledPackageResourceRefsRequest,
    ) -> Result<GetInstalledPackageResourceRefsResponse, PkgmuxError>;

    async fn create_installed_package(
        &self,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, PkgmuxError>;

    async fn update_installed_package(
        &self,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, PkgmuxError>;

    async fn delete_installed_package(
        &self,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, PkgmuxError>;
}

/// A registered plugin: its reference paired with its contract implementation.
#[derive(Clone)]
pub struct PluginHandle {
    pub plugin: PluginRef,
    pub service: Arc<dyn PackagesService>,
}

impl PluginHandle {
    pub fn new(plugin: PluginRef, service: Arc<dyn PackagesService>) -> Self {
        Self { plugin, service }
    }

    pub fn name(&self) -> &str {
        &self.plugin.name
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("plugin", &self.plugin)
            .finish_non_exhaustive()
    }
}
