// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The core service in front of two static catalog plugins.

use pkgmux_config::AggregationConfig;
use pkgmux_core::types::*;
use pkgmux_core::{ErrorCode, PackagesService, PluginRef};
use pkgmux_server::PackagesServer;
use pkgmux_test_utils::TestHarness;

const HELM: &str = r#"
[[packages]]
name = "apache"
identifier = "bitnami/apache"
categories = ["Infrastructure"]
versions = [{ pkg_version = "9.1.0", app_version = "2.4.57" }]

[[packages]]
name = "redis"
identifier = "bitnami/redis"
categories = ["Database"]
versions = [{ pkg_version = "17.0.0", app_version = "7.0.5" }]

[[installed]]
name = "cache"
package = "bitnami/redis"
namespace = "prod"
"#;

const FLUX: &str = r#"
[[packages]]
name = "podinfo"
categories = ["Demo"]
versions = [{ pkg_version = "6.3.0", app_version = "6.3.0" }]

[[packages]]
name = "grafana"
categories = ["Analytics"]
versions = [{ pkg_version = "6.50.0", app_version = "9.3.1" }]
"#;

fn server() -> PackagesServer {
    let harness = TestHarness::builder()
        .with_catalog("helm", HELM)
        .with_catalog("flux", FLUX)
        .build()
        .unwrap();
    PackagesServer::from_registry(&harness.registry, &AggregationConfig::default())
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

#[tokio::test]
async fn lists_across_catalogs_in_pages() {
    let server = server();

    let first = server.get_available_package_summaries(page("", 2)).await.unwrap();
    let names: Vec<&str> = first
        .available_package_summaries
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["apache", "grafana"]);
    // Catalogs report the categories of every matching package, not just the page.
    assert_eq!(
        first.categories,
        vec!["Analytics", "Database", "Demo", "Infrastructure"]
    );
    assert!(!first.next_page_token.is_empty());

    let second = server
        .get_available_package_summaries(page(&first.next_page_token, 2))
        .await
        .unwrap();
    let names: Vec<&str> = second
        .available_package_summaries
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["podinfo", "redis"]);
    assert!(second.next_page_token.is_empty());
}

#[tokio::test]
async fn routes_detail_by_plugin() {
    let server = server();
    let summaries = server
        .get_available_package_summaries(page("", 0))
        .await
        .unwrap();
    let grafana = summaries
        .available_package_summaries
        .into_iter()
        .find(|s| s.name == "grafana")
        .unwrap();
    assert_eq!(grafana.plugin_name(), Some("flux"));

    let detail = server
        .get_available_package_detail(GetAvailablePackageDetailRequest {
            available_package_ref: grafana.available_package_ref,
            pkg_version: String::new(),
        })
        .await
        .unwrap()
        .available_package_detail
        .unwrap();
    assert_eq!(detail.version.unwrap().app_version, "9.3.1");
}

#[tokio::test]
async fn missing_package_keeps_not_found() {
    let server = server();
    let err = server
        .get_available_package_versions(GetAvailablePackageVersionsRequest {
            available_package_ref: Some(AvailablePackageRef {
                context: None,
                identifier: "bitnami/kafka".to_string(),
                plugin: Some(PluginRef::new("helm", "v1alpha1")),
            }),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(err.to_string().contains("bitnami/kafka"));
}

#[tokio::test]
async fn install_then_list_installed() {
    let server = server();
    let created = server
        .create_installed_package(CreateInstalledPackageRequest {
            available_package_ref: Some(AvailablePackageRef {
                context: None,
                identifier: "podinfo".to_string(),
                plugin: Some(PluginRef::new("flux", "v1alpha1")),
            }),
            target_context: Some(Context::new("default", "demo")),
            name: "podinfo".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(created.installed_package_ref.is_some());

    let installed = server
        .get_installed_package_summaries(GetInstalledPackageSummariesRequest::default())
        .await
        .unwrap();
    let listed: Vec<(&str, &str)> = installed
        .installed_package_summaries
        .iter()
        .map(|s| {
            let plugin = s
                .installed_package_ref
                .as_ref()
                .and_then(|r| r.plugin.as_ref())
                .map(|p| p.name.as_str())
                .unwrap_or_default();
            (s.name.as_str(), plugin)
        })
        .collect();
    assert_eq!(listed, vec![("cache", "helm"), ("podinfo", "flux")]);

    let refs = server
        .get_installed_package_resource_refs(GetInstalledPackageResourceRefsRequest {
            installed_package_ref: created.installed_package_ref.clone(),
        })
        .await
        .unwrap();
    assert_eq!(refs.resource_refs.len(), 2);

    server
        .delete_installed_package(DeleteInstalledPackageRequest {
            installed_package_ref: created.installed_package_ref,
        })
        .await
        .unwrap();
}
