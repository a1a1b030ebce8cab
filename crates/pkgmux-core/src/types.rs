// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package data model shared by plugins and the core.
//!
//! Apart from package names and plugin references, the fields here are
//! opaque to the core: they are forwarded between caller and plugin as-is.

use serde::{Deserialize, Serialize};

/// Identifies a registered backend plugin. `name` is the routing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginRef {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl PluginRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Target cluster and namespace of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub cluster: String,
    pub namespace: String,
}

impl Context {
    pub fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.into(),
        }
    }
}

/// Reference to a package available for installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailablePackageRef {
    pub context: Option<Context>,
    pub identifier: String,
    pub plugin: Option<PluginRef>,
}

/// Reference to an installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPackageRef {
    pub context: Option<Context>,
    pub identifier: String,
    pub plugin: Option<PluginRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageAppVersion {
    pub pkg_version: String,
    pub app_version: String,
}

/// Summary of an available package, as returned by list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailablePackageSummary {
    pub available_package_ref: Option<AvailablePackageRef>,
    /// Sort and merge key across plugins.
    pub name: String,
    pub latest_version: Option<PackageAppVersion>,
    pub icon_url: String,
    pub display_name: String,
    pub short_description: String,
    pub categories: Vec<String>,
}

impl AvailablePackageSummary {
    /// Name of the plugin this summary originates from, if it carries one.
    pub fn plugin_name(&self) -> Option<&str> {
        self.available_package_ref
            .as_ref()
            .and_then(|r| r.plugin.as_ref())
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailablePackageDetail {
    pub available_package_ref: Option<AvailablePackageRef>,
    pub name: String,
    pub version: Option<PackageAppVersion>,
    pub display_name: String,
    pub short_description: String,
    pub long_description: String,
    pub readme: String,
    pub default_values: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusReason {
    #[default]
    Unspecified,
    Installed,
    Uninstalled,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPackageStatus {
    pub ready: bool,
    pub reason: StatusReason,
    pub user_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPackageSummary {
    pub installed_package_ref: Option<InstalledPackageRef>,
    /// Sort key across plugins, together with the plugin name.
    pub name: String,
    pub pkg_display_name: String,
    pub short_description: String,
    pub current_version: Option<PackageAppVersion>,
    pub latest_version: Option<PackageAppVersion>,
    pub status: Option<InstalledPackageStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPackageDetail {
    pub installed_package_ref: Option<InstalledPackageRef>,
    pub name: String,
    pub pkg_version_reference: Option<VersionReference>,
    pub current_version: Option<PackageAppVersion>,
    pub values_applied: String,
    pub status: Option<InstalledPackageStatus>,
    pub available_package_ref: Option<AvailablePackageRef>,
}

/// Version constraint used when installing or updating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionReference {
    pub version: String,
}

/// A Kubernetes resource created for an installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// Filters forwarded verbatim to plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub query: String,
    pub categories: Vec<String>,
    pub repositories: Vec<String>,
    pub pkg_version: String,
    pub app_version: String,
}

/// Page request. A `page_size` of zero means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationOptions {
    pub page_token: String,
    pub page_size: u32,
}

// --- Available packages ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageSummariesRequest {
    pub context: Option<Context>,
    pub filter_options: Option<FilterOptions>,
    pub pagination_options: Option<PaginationOptions>,
}

impl GetAvailablePackageSummariesRequest {
    pub fn page_size(&self) -> u32 {
        self.pagination_options
            .as_ref()
            .map(|p| p.page_size)
            .unwrap_or(0)
    }

    pub fn page_token(&self) -> &str {
        self.pagination_options
            .as_ref()
            .map(|p| p.page_token.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageSummariesResponse {
    pub available_package_summaries: Vec<AvailablePackageSummary>,
    pub categories: Vec<String>,
    /// Empty when there are no further pages.
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageDetailRequest {
    pub available_package_ref: Option<AvailablePackageRef>,
    pub pkg_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageDetailResponse {
    pub available_package_detail: Option<AvailablePackageDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageVersionsRequest {
    pub available_package_ref: Option<AvailablePackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAvailablePackageVersionsResponse {
    pub package_app_versions: Option<Vec<PackageAppVersion>>,
}

// --- Installed packages ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageSummariesRequest {
    pub context: Option<Context>,
    pub pagination_options: Option<PaginationOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageSummariesResponse {
    pub installed_package_summaries: Vec<InstalledPackageSummary>,
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageDetailRequest {
    pub installed_package_ref: Option<InstalledPackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageDetailResponse {
    pub installed_package_detail: Option<InstalledPackageDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageResourceRefsRequest {
    pub installed_package_ref: Option<InstalledPackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetInstalledPackageResourceRefsResponse {
    pub context: Option<Context>,
    pub resource_refs: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateInstalledPackageRequest {
    pub available_package_ref: Option<AvailablePackageRef>,
    pub target_context: Option<Context>,
    pub name: String,
    pub pkg_version_reference: Option<VersionReference>,
    pub values: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateInstalledPackageResponse {
    pub installed_package_ref: Option<InstalledPackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateInstalledPackageRequest {
    pub installed_package_ref: Option<InstalledPackageRef>,
    pub pkg_version_reference: Option<VersionReference>,
    pub values: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateInstalledPackageResponse {
    pub installed_package_ref: Option<InstalledPackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteInstalledPackageRequest {
    pub installed_package_ref: Option<InstalledPackageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteInstalledPackageResponse {}
