// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query subcommands, each mapped onto one core service operation.

use clap::Args;
use pkgmux_core::types::*;
use pkgmux_core::{PackagesService, PkgmuxError, PluginRef};
use pkgmux_server::PackagesServer;

/// Target cluster and namespace.
#[derive(Args, Debug)]
pub struct ContextArgs {
    #[arg(long, default_value = "default")]
    pub cluster: String,
    /// Empty means every namespace.
    #[arg(long, default_value = "")]
    pub namespace: String,
}

impl ContextArgs {
    fn context(&self) -> Context {
        Context::new(&self.cluster, &self.namespace)
    }
}

#[derive(Args, Debug)]
pub struct ListAvailableArgs {
    #[command(flatten)]
    pub context: ContextArgs,
    /// Substring match on package names.
    #[arg(long, default_value = "")]
    pub query: String,
    /// Only packages in this category; repeat for several.
    #[arg(long)]
    pub category: Vec<String>,
    /// Items per page; 0 returns everything.
    #[arg(long, default_value_t = 0)]
    pub page_size: u32,
    /// Token from the previous page.
    #[arg(long, default_value = "")]
    pub page_token: String,
}

#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Plugin serving the package.
    #[arg(long)]
    pub plugin: String,
    /// Package identifier within the plugin.
    #[arg(long)]
    pub id: String,
    /// Package version; defaults to the latest.
    #[arg(long, default_value = "")]
    pub version: String,
    #[command(flatten)]
    pub context: ContextArgs,
}

impl PackageArgs {
    fn reference(&self) -> AvailablePackageRef {
        AvailablePackageRef {
            context: Some(self.context.context()),
            identifier: self.id.clone(),
            plugin: Some(PluginRef::new(&self.plugin, "")),
        }
    }
}

pub async fn list_available(
    server: &PackagesServer,
    args: ListAvailableArgs,
) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
    let filter_options = (!args.query.is_empty() || !args.category.is_empty()).then(|| {
        FilterOptions {
            query: args.query.clone(),
            categories: args.category.clone(),
            ..Default::default()
        }
    });
    server
        .get_available_package_summaries(GetAvailablePackageSummariesRequest {
            context: Some(args.context.context()),
            filter_options,
            pagination_options: Some(PaginationOptions {
                page_token: args.page_token,
                page_size: args.page_size,
            }),
        })
        .await
}

pub async fn list_installed(
    server: &PackagesServer,
    args: ContextArgs,
) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError> {
    server
        .get_installed_package_summaries(GetInstalledPackageSummariesRequest {
            context: Some(args.context()),
            pagination_options: None,
        })
        .await
}

pub async fn detail(
    server: &PackagesServer,
    args: PackageArgs,
) -> Result<GetAvailablePackageDetailResponse, PkgmuxError> {
    server
        .get_available_package_detail(GetAvailablePackageDetailRequest {
            available_package_ref: Some(args.reference()),
            pkg_version: args.version,
        })
        .await
}

pub async fn versions(
    server: &PackagesServer,
    args: PackageArgs,
) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError> {
    server
        .get_available_package_versions(GetAvailablePackageVersionsRequest {
            available_package_ref: Some(args.reference()),
        })
        .await
}
