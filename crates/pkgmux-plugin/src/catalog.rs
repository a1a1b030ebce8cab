// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A backend plugin that serves a catalog manifest from memory.
//!
//! Available packages are immutable once loaded; installs live in memory and
//! change through create/update/delete.

use std::path::Path;

use async_trait::async_trait;
use pkgmux_core::types::*;
use pkgmux_core::{ErrorCode, PackagesService, PkgmuxError, PluginRef};
use pkgmux_paginate::page_window;
use tokio::sync::RwLock;
use tracing::debug;

use crate::manifest::{load_catalog_manifest, CatalogInstall, CatalogManifest, CatalogPackage};

/// Static catalog plugin.
pub struct StaticCatalogPlugin {
    plugin: PluginRef,
    /// Sorted by name, then identifier.
    packages: Vec<CatalogPackage>,
    installed: RwLock<Vec<CatalogInstall>>,
}

impl StaticCatalogPlugin {
    pub fn new(plugin: PluginRef, manifest: CatalogManifest) -> Self {
        let mut packages = manifest.packages;
        packages.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.identifier.cmp(&b.identifier)));
        Self {
            plugin,
            packages,
            installed: RwLock::new(manifest.installed),
        }
    }

    /// Load the plugin from a catalog manifest file.
    pub fn from_path(plugin: PluginRef, path: &Path) -> Result<Self, PkgmuxError> {
        Ok(Self::new(plugin, load_catalog_manifest(path)?))
    }

    pub fn plugin(&self) -> &PluginRef {
        &self.plugin
    }

    fn package(&self, identifier: &str) -> Result<&CatalogPackage, PkgmuxError> {
        self.packages
            .iter()
            .find(|p| p.identifier == identifier)
            .ok_or_else(|| {
                PkgmuxError::not_found(format!("package {identifier:?} not found in catalog"))
            })
    }

    fn available_ref(&self, identifier: &str, context: Option<Context>) -> AvailablePackageRef {
        AvailablePackageRef {
            context,
            identifier: identifier.to_string(),
            plugin: Some(self.plugin.clone()),
        }
    }

    fn installed_ref(&self, install: &CatalogInstall) -> InstalledPackageRef {
        InstalledPackageRef {
            context: Some(Context::new(&install.cluster, &install.namespace)),
            identifier: install.name.clone(),
            plugin: Some(self.plugin.clone()),
        }
    }

    fn installed_version(&self, install: &CatalogInstall) -> Option<PackageAppVersion> {
        let package = self.package(&install.package).ok()?;
        if install.version.is_empty() {
            return package.versions.first().cloned();
        }
        package
            .versions
            .iter()
            .find(|v| v.pkg_version == install.version)
            .cloned()
            .or_else(|| {
                Some(PackageAppVersion {
                    pkg_version: install.version.clone(),
                    app_version: String::new(),
                })
            })
    }

    fn summary(
        &self,
        package: &CatalogPackage,
        context: Option<&Context>,
    ) -> AvailablePackageSummary {
        AvailablePackageSummary {
            available_package_ref: Some(self.available_ref(&package.identifier, context.cloned())),
            name: package.name.clone(),
            latest_version: package.versions.first().cloned(),
            icon_url: package.icon_url.clone(),
            display_name: package.display_name.clone(),
            short_description: package.short_description.clone(),
            categories: package.categories.clone(),
        }
    }

    fn installed_summary(&self, install: &CatalogInstall) -> InstalledPackageSummary {
        let package = self.package(&install.package).ok();
        InstalledPackageSummary {
            installed_package_ref: Some(self.installed_ref(install)),
            name: install.name.clone(),
            pkg_display_name: package.map(|p| p.display_name.clone()).unwrap_or_default(),
            short_description: package
                .map(|p| p.short_description.clone())
                .unwrap_or_default(),
            current_version: self.installed_version(install),
            latest_version: package.and_then(|p| p.versions.first().cloned()),
            status: Some(ready_status()),
        }
    }

    /// Resolve the version an install should pin, or fail if unknown.
    fn resolve_version(
        package: &CatalogPackage,
        reference: Option<&VersionReference>,
    ) -> Result<String, PkgmuxError> {
        match reference.map(|r| r.version.as_str()).filter(|v| !v.is_empty()) {
            Some(version) => package
                .versions
                .iter()
                .find(|v| v.pkg_version == version)
                .map(|v| v.pkg_version.clone())
                .ok_or_else(|| {
                    PkgmuxError::not_found(format!(
                        "version {version:?} of package {:?} not found",
                        package.identifier
                    ))
                }),
            None => Ok(package
                .versions
                .first()
                .map(|v| v.pkg_version.clone())
                .unwrap_or_default()),
        }
    }
}

fn ready_status() -> InstalledPackageStatus {
    InstalledPackageStatus {
        ready: true,
        reason: StatusReason::Installed,
        user_reason: "deployed".to_string(),
    }
}

fn matches_filter(package: &CatalogPackage, filter: Option<&FilterOptions>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let query = filter.query.to_lowercase();
    if !query.is_empty() && !package.name.to_lowercase().contains(&query) {
        return false;
    }
    filter.categories.is_empty() || package.categories.iter().any(|c| filter.categories.contains(c))
}

fn require_installed_ref(
    reference: Option<&InstalledPackageRef>,
) -> Result<&InstalledPackageRef, PkgmuxError> {
    reference.ok_or_else(|| PkgmuxError::invalid_argument("missing InstalledPackageRef"))
}

fn same_install(install: &CatalogInstall, reference: &InstalledPackageRef) -> bool {
    let context = reference.context.clone().unwrap_or_default();
    install.name == reference.identifier
        && (context.namespace.is_empty() || install.namespace == context.namespace)
        && (context.cluster.is_empty() || install.cluster == context.cluster)
}

#[async_trait]
impl PackagesService for StaticCatalogPlugin {
    async fn get_available_package_summaries(
        &self,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
        let matching: Vec<&CatalogPackage> = self
            .packages
            .iter()
            .filter(|p| matches_filter(p, request.filter_options.as_ref()))
            .collect();

        let (window, next_page_token) =
            page_window(matching.len(), request.page_token(), request.page_size())?;
        debug!(
            plugin = %self.plugin.name,
            start = window.start,
            end = window.end,
            total = matching.len(),
            "serving catalog page"
        );

        let mut categories: Vec<String> = matching
            .iter()
            .flat_map(|p| p.categories.iter().cloned())
            .collect();
        categories.sort();
        categories.dedup();

        Ok(GetAvailablePackageSummariesResponse {
            available_package_summaries: matching[window]
                .iter()
                .map(|p| self.summary(p, request.context.as_ref()))
                .collect(),
            categories,
            next_page_token,
        })
    }

    async fn get_available_package_detail(
        &self,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, PkgmuxError> {
        let reference = request
            .available_package_ref
            .ok_or_else(|| PkgmuxError::invalid_argument("missing AvailablePackageRef"))?;
        let package = self.package(&reference.identifier)?;

        let version = if request.pkg_version.is_empty() {
            package.versions.first().cloned()
        } else {
            Some(
                package
                    .versions
                    .iter()
                    .find(|v| v.pkg_version == request.pkg_version)
                    .cloned()
                    .ok_or_else(|| {
                        PkgmuxError::not_found(format!(
                            "version {:?} of package {:?} not found",
                            request.pkg_version, reference.identifier
                        ))
                    })?,
            )
        };

        Ok(GetAvailablePackageDetailResponse {
            available_package_detail: Some(AvailablePackageDetail {
                available_package_ref: Some(
                    self.available_ref(&package.identifier, reference.context),
                ),
                name: package.name.clone(),
                version,
                display_name: package.display_name.clone(),
                short_description: package.short_description.clone(),
                long_description: package.long_description.clone(),
                readme: package.readme.clone(),
                default_values: package.default_values.clone(),
                categories: package.categories.clone(),
            }),
        })
    }

    async fn get_available_package_versions(
        &self,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError> {
        let reference = request
            .available_package_ref
            .ok_or_else(|| PkgmuxError::invalid_argument("missing AvailablePackageRef"))?;
        let package = self.package(&reference.identifier)?;
        Ok(GetAvailablePackageVersionsResponse {
            package_app_versions: Some(package.versions.clone()),
        })
    }

    async fn get_installed_package_summaries(
        &self,
        request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError> {
        let context = request.context.unwrap_or_default();
        let installed = self.installed.read().await;
        let mut summaries: Vec<InstalledPackageSummary> = installed
            .iter()
            .filter(|i| context.namespace.is_empty() || i.namespace == context.namespace)
            .filter(|i| context.cluster.is_empty() || i.cluster == context.cluster)
            .map(|i| self.installed_summary(i))
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(GetInstalledPackageSummariesResponse {
            installed_package_summaries: summaries,
            next_page_token: String::new(),
        })
    }

    async fn get_installed_package_detail(
        &self,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, PkgmuxError> {
        let reference = require_installed_ref(request.installed_package_ref.as_ref())?;
        let installed = self.installed.read().await;
        let install = installed
            .iter()
            .find(|i| same_install(i, reference))
            .ok_or_else(|| {
                PkgmuxError::not_found(format!(
                    "installed package {:?} not found",
                    reference.identifier
                ))
            })?;

        Ok(GetInstalledPackageDetailResponse {
            installed_package_detail: Some(InstalledPackageDetail {
                installed_package_ref: Some(self.installed_ref(install)),
                name: install.name.clone(),
                pkg_version_reference: Some(VersionReference {
                    version: install.version.clone(),
                }),
                current_version: self.installed_version(install),
                values_applied: install.values.clone(),
                status: Some(ready_status()),
                available_package_ref: Some(self.available_ref(
                    &install.package,
                    Some(Context::new(&install.cluster, &install.namespace)),
                )),
            }),
        })
    }

    async fn get_installed_package_resource_refs(
        &self,
        request: GetInstalledPackageResourceRefsRequest,
    ) -> Result<GetInstalledPackageResourceRefsResponse, PkgmuxError> {
        let reference = require_installed_ref(request.installed_package_ref.as_ref())?;
        let installed = self.installed.read().await;
        let install = installed
            .iter()
            .find(|i| same_install(i, reference))
            .ok_or_else(|| {
                PkgmuxError::not_found(format!(
                    "installed package {:?} not found",
                    reference.identifier
                ))
            })?;

        let resource = |kind: &str, api_version: &str| ResourceRef {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: install.name.clone(),
            namespace: install.namespace.clone(),
        };
        Ok(GetInstalledPackageResourceRefsResponse {
            context: Some(Context::new(&install.cluster, &install.namespace)),
            resource_refs: vec![
                resource("Deployment", "apps/v1"),
                resource("Service", "v1"),
            ],
        })
    }

    async fn create_installed_package(
        &self,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, PkgmuxError> {
        let reference = request
            .available_package_ref
            .ok_or_else(|| PkgmuxError::invalid_argument("missing AvailablePackageRef"))?;
        if request.name.trim().is_empty() {
            return Err(PkgmuxError::invalid_argument("installed package name must not be empty"));
        }
        let target = request
            .target_context
            .ok_or_else(|| PkgmuxError::invalid_argument("missing TargetContext"))?;
        let package = self.package(&reference.identifier)?;
        let version = Self::resolve_version(package, request.pkg_version_reference.as_ref())?;

        let install = CatalogInstall {
            name: request.name,
            package: package.identifier.clone(),
            cluster: target.cluster,
            namespace: target.namespace,
            version,
            values: request.values,
        };

        let mut installed = self.installed.write().await;
        if installed
            .iter()
            .any(|i| {
                i.name == install.name
                    && i.namespace == install.namespace
                    && i.cluster == install.cluster
            })
        {
            return Err(PkgmuxError::status(
                ErrorCode::AlreadyExists,
                format!("installed package {:?} already exists", install.name),
            ));
        }
        let installed_ref = self.installed_ref(&install);
        installed.push(install);

        Ok(CreateInstalledPackageResponse {
            installed_package_ref: Some(installed_ref),
        })
    }

    async fn update_installed_package(
        &self,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, PkgmuxError> {
        let reference = require_installed_ref(request.installed_package_ref.as_ref())?;
        let mut installed = self.installed.write().await;
        let install = installed
            .iter_mut()
            .find(|i| same_install(i, reference))
            .ok_or_else(|| {
                PkgmuxError::not_found(format!(
                    "installed package {:?} not found",
                    reference.identifier
                ))
            })?;

        let package = self.package(&install.package)?;
        install.version = Self::resolve_version(package, request.pkg_version_reference.as_ref())?;
        install.values = request.values;

        Ok(UpdateInstalledPackageResponse {
            installed_package_ref: Some(self.installed_ref(install)),
        })
    }

    async fn delete_installed_package(
        &self,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, PkgmuxError> {
        let reference = require_installed_ref(request.installed_package_ref.as_ref())?;
        let mut installed = self.installed.write().await;
        let before = installed.len();
        installed.retain(|i| !same_install(i, reference));
        if installed.len() == before {
            return Err(PkgmuxError::not_found(format!(
                "installed package {:?} not found",
                reference.identifier
            )));
        }
        Ok(DeleteInstalledPackageResponse {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_catalog_manifest;

    const CATALOG: &str = r#"
[[packages]]
name = "redis"
identifier = "bitnami/redis"
categories = ["Database"]
versions = [{ pkg_version = "17.0.0", app_version = "7.0.5" }, { pkg_version = "16.0.0", app_version = "6.2.7" }]

[[packages]]
name = "apache"
identifier = "bitnami/apache"
categories = ["Infrastructure"]
versions = [{ pkg_version = "9.1.0", app_version = "2.4.57" }]

[[packages]]
name = "mariadb"
identifier = "bitnami/mariadb"
categories = ["Database"]

[[installed]]
name = "cache"
package = "bitnami/redis"
namespace = "prod"
version = "16.0.0"
"#;

    fn plugin() -> StaticCatalogPlugin {
        StaticCatalogPlugin::new(
            PluginRef::new("helm", "v1alpha1"),
            parse_catalog_manifest(CATALOG).unwrap(),
        )
    }

    fn page(token: &str, size: u32) -> GetAvailablePackageSummariesRequest {
        GetAvailablePackageSummariesRequest {
            pagination_options: Some(PaginationOptions {
                page_token: token.to_string(),
                page_size: size,
            }),
            ..Default::default()
        }
    }

    fn installed_ref(name: &str, namespace: &str) -> InstalledPackageRef {
        InstalledPackageRef {
            context: Some(Context::new("default", namespace)),
            identifier: name.to_string(),
            plugin: Some(PluginRef::new("helm", "v1alpha1")),
        }
    }

    #[tokio::test]
    async fn summaries_are_sorted_and_paginated() {
        let plugin = plugin();
        let first = plugin.get_available_package_summaries(page("", 2)).await.unwrap();
        let names: Vec<&str> = first
            .available_package_summaries
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["apache", "mariadb"]);
        assert_eq!(first.next_page_token, "2");
        assert_eq!(first.categories, vec!["Database", "Infrastructure"]);
        assert_eq!(first.available_package_summaries[0].plugin_name(), Some("helm"));

        let second = plugin
            .get_available_package_summaries(page(&first.next_page_token, 2))
            .await
            .unwrap();
        assert_eq!(second.available_package_summaries.len(), 1);
        assert_eq!(second.available_package_summaries[0].name, "redis");
        assert!(second.next_page_token.is_empty());
    }

    #[tokio::test]
    async fn summaries_honour_filters() {
        let plugin = plugin();
        let mut request = page("", 0);
        request.filter_options = Some(FilterOptions {
            categories: vec!["Database".to_string()],
            ..Default::default()
        });
        let resp = plugin.get_available_package_summaries(request).await.unwrap();
        assert_eq!(resp.available_package_summaries.len(), 2);

        let mut request = page("", 0);
        request.filter_options = Some(FilterOptions {
            query: "APA".to_string(),
            ..Default::default()
        });
        let resp = plugin.get_available_package_summaries(request).await.unwrap();
        assert_eq!(resp.available_package_summaries.len(), 1);
        assert_eq!(resp.available_package_summaries[0].name, "apache");
    }

    #[tokio::test]
    async fn detail_and_versions() {
        let plugin = plugin();
        let reference = AvailablePackageRef {
            identifier: "bitnami/redis".to_string(),
            ..Default::default()
        };
        let detail = plugin
            .get_available_package_detail(GetAvailablePackageDetailRequest {
                available_package_ref: Some(reference.clone()),
                pkg_version: "16.0.0".to_string(),
            })
            .await
            .unwrap()
            .available_package_detail
            .unwrap();
        assert_eq!(detail.version.unwrap().app_version, "6.2.7");
        assert!(detail.available_package_ref.is_some());

        let versions = plugin
            .get_available_package_versions(GetAvailablePackageVersionsRequest {
                available_package_ref: Some(reference),
            })
            .await
            .unwrap();
        assert_eq!(versions.package_app_versions.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_package_is_not_found() {
        let err = plugin()
            .get_available_package_detail(GetAvailablePackageDetailRequest {
                available_package_ref: Some(AvailablePackageRef {
                    identifier: "nope".to_string(),
                    ..Default::default()
                }),
                pkg_version: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn install_lifecycle() {
        let plugin = plugin();
        let created = plugin
            .create_installed_package(CreateInstalledPackageRequest {
                available_package_ref: Some(AvailablePackageRef {
                    identifier: "bitnami/apache".to_string(),
                    ..Default::default()
                }),
                target_context: Some(Context::new("default", "web")),
                name: "frontend".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.installed_package_ref.unwrap().identifier, "frontend");

        let listed = plugin
            .get_installed_package_summaries(GetInstalledPackageSummariesRequest::default())
            .await
            .unwrap();
        let names: Vec<&str> = listed.installed_package_summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cache", "frontend"]);

        let updated = plugin
            .update_installed_package(UpdateInstalledPackageRequest {
                installed_package_ref: Some(installed_ref("cache", "prod")),
                pkg_version_reference: Some(VersionReference {
                    version: "17.0.0".to_string(),
                }),
                values: "replicas: 2".to_string(),
            })
            .await
            .unwrap();
        assert!(updated.installed_package_ref.is_some());

        let detail = plugin
            .get_installed_package_detail(GetInstalledPackageDetailRequest {
                installed_package_ref: Some(installed_ref("cache", "prod")),
            })
            .await
            .unwrap()
            .installed_package_detail
            .unwrap();
        assert_eq!(detail.current_version.unwrap().pkg_version, "17.0.0");
        assert_eq!(detail.values_applied, "replicas: 2");

        let refs = plugin
            .get_installed_package_resource_refs(GetInstalledPackageResourceRefsRequest {
                installed_package_ref: Some(installed_ref("frontend", "web")),
            })
            .await
            .unwrap();
        assert_eq!(refs.resource_refs.len(), 2);
        assert_eq!(refs.resource_refs[0].namespace, "web");

        plugin
            .delete_installed_package(DeleteInstalledPackageRequest {
                installed_package_ref: Some(installed_ref("frontend", "web")),
            })
            .await
            .unwrap();
        let err = plugin
            .delete_installed_package(DeleteInstalledPackageRequest {
                installed_package_ref: Some(installed_ref("frontend", "web")),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn duplicate_install_already_exists() {
        let plugin = plugin();
        let request = CreateInstalledPackageRequest {
            available_package_ref: Some(AvailablePackageRef {
                identifier: "bitnami/redis".to_string(),
                ..Default::default()
            }),
            target_context: Some(Context::new("default", "prod")),
            name: "cache".to_string(),
            ..Default::default()
        };
        let err = plugin.create_installed_package(request).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn installed_summaries_filter_by_namespace() {
        let plugin = plugin();
        let resp = plugin
            .get_installed_package_summaries(GetInstalledPackageSummariesRequest {
                context: Some(Context::new("", "staging")),
                pagination_options: None,
            })
            .await
            .unwrap();
        assert!(resp.installed_package_summaries.is_empty());
    }
}
