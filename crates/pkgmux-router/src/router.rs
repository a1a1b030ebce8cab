// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch of single-target operations to the named plugin.
//!
//! Every operation follows the same steps: log, validate the reference,
//! resolve the plugin, forward the request unchanged, wrap a backend failure,
//! then check the response shape. Nothing is retried.

use pkgmux_core::types::*;
use pkgmux_core::{BackendTarget, PkgmuxError, PluginHandle, PluginRef};
use pkgmux_plugin::PluginSnapshot;
use tracing::info;

const AVAILABLE_DETAIL: &str = "get the available package detail";
const AVAILABLE_VERSIONS: &str = "get the available package versions";
const INSTALLED_DETAIL: &str = "get the installed package detail";
const RESOURCE_REFS: &str = "get the resource refs for the installed package";
const CREATE: &str = "create the installed package";
const UPDATE: &str = "update the installed package";
const DELETE: &str = "delete the installed package";

/// Routes single-target requests over an immutable plugin snapshot.
#[derive(Debug, Clone)]
pub struct Router {
    plugins: PluginSnapshot,
}

impl Router {
    pub fn new(plugins: PluginSnapshot) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &PluginSnapshot {
        &self.plugins
    }

    /// Resolve the plugin named by a reference. `what` names the reference
    /// kind in the error message.
    fn resolve(
        &self,
        plugin: Option<&PluginRef>,
        what: &str,
    ) -> Result<&PluginHandle, PkgmuxError> {
        let plugin = plugin.ok_or_else(|| {
            PkgmuxError::invalid_argument(format!("no request {what}.Plugin provided"))
        })?;
        self.plugins
            .find(plugin)
            .ok_or_else(|| PkgmuxError::PluginNotFound {
                name: plugin.name.clone(),
            })
    }

    pub async fn get_available_package_detail(
        &self,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, PkgmuxError> {
        let reference = request.available_package_ref.as_ref();
        log_call(
            AVAILABLE_DETAIL,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request AvailablePackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "AvailablePackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        let response = handle
            .service
            .get_available_package_detail(request)
            .await
            .map_err(|e| backend(AVAILABLE_DETAIL, target, handle, e))?;

        if response
            .available_package_detail
            .as_ref()
            .and_then(|d| d.available_package_ref.as_ref())
            .is_none()
        {
            return Err(violation(
                AVAILABLE_DETAIL,
                handle,
                "missing available_package_detail.available_package_ref",
            ));
        }
        Ok(response)
    }

    pub async fn get_available_package_versions(
        &self,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError> {
        let reference = request.available_package_ref.as_ref();
        log_call(
            AVAILABLE_VERSIONS,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request AvailablePackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "AvailablePackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        let response = handle
            .service
            .get_available_package_versions(request)
            .await
            .map_err(|e| backend(AVAILABLE_VERSIONS, target, handle, e))?;

        if response.package_app_versions.is_none() {
            return Err(violation(AVAILABLE_VERSIONS, handle, "missing package_app_versions"));
        }
        Ok(response)
    }

    pub async fn get_installed_package_detail(
        &self,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, PkgmuxError> {
        let reference = request.installed_package_ref.as_ref();
        log_call(
            INSTALLED_DETAIL,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request InstalledPackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "InstalledPackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        let response = handle
            .service
            .get_installed_package_detail(request)
            .await
            .map_err(|e| backend(INSTALLED_DETAIL, target, handle, e))?;

        if response.installed_package_detail.is_none() {
            return Err(violation(INSTALLED_DETAIL, handle, "missing installed_package_detail"));
        }
        Ok(response)
    }

    pub async fn get_installed_package_resource_refs(
        &self,
        request: GetInstalledPackageResourceRefsRequest,
    ) -> Result<GetInstalledPackageResourceRefsResponse, PkgmuxError> {
        let reference = request.installed_package_ref.as_ref();
        log_call(
            RESOURCE_REFS,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request InstalledPackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "InstalledPackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        handle
            .service
            .get_installed_package_resource_refs(request)
            .await
            .map_err(|e| backend(RESOURCE_REFS, target, handle, e))
    }

    pub async fn create_installed_package(
        &self,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, PkgmuxError> {
        let reference = request.available_package_ref.as_ref();
        log_call(
            CREATE,
            request.target_context.as_ref(),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request AvailablePackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "AvailablePackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        let response = handle
            .service
            .create_installed_package(request)
            .await
            .map_err(|e| backend(CREATE, target, handle, e))?;

        if response.installed_package_ref.is_none() {
            return Err(violation(CREATE, handle, "missing installed_package_ref"));
        }
        Ok(response)
    }

    pub async fn update_installed_package(
        &self,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, PkgmuxError> {
        let reference = request.installed_package_ref.as_ref();
        log_call(
            UPDATE,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request InstalledPackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "InstalledPackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        let response = handle
            .service
            .update_installed_package(request)
            .await
            .map_err(|e| backend(UPDATE, target, handle, e))?;

        if response.installed_package_ref.is_none() {
            return Err(violation(UPDATE, handle, "missing installed_package_ref"));
        }
        Ok(response)
    }

    pub async fn delete_installed_package(
        &self,
        request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, PkgmuxError> {
        let reference = request.installed_package_ref.as_ref();
        log_call(
            DELETE,
            reference.and_then(|r| r.context.as_ref()),
            reference.map(|r| r.identifier.as_str()),
        );
        let reference = reference.ok_or_else(|| {
            PkgmuxError::invalid_argument("no request InstalledPackageRef provided")
        })?;
        let handle = self.resolve(reference.plugin.as_ref(), "InstalledPackageRef")?;
        let target = BackendTarget::Package(reference.identifier.clone());

        handle
            .service
            .delete_installed_package(request)
            .await
            .map_err(|e| backend(DELETE, target, handle, e))
    }
}

fn log_call(operation: &str, context: Option<&Context>, identifier: Option<&str>) {
    let context = context.cloned().unwrap_or_default();
    info!(
        operation,
        cluster = %context.cluster,
        namespace = %context.namespace,
        identifier = identifier.unwrap_or_default(),
        "routing request"
    );
}

fn backend(
    operation: &'static str,
    target: BackendTarget,
    handle: &PluginHandle,
    source: PkgmuxError,
) -> PkgmuxError {
    PkgmuxError::Backend {
        operation,
        target,
        plugin: handle.name().to_string(),
        source: Box::new(source),
    }
}

fn violation(operation: &'static str, handle: &PluginHandle, detail: &str) -> PkgmuxError {
    PkgmuxError::ContractViolation {
        operation,
        plugin: handle.name().to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgmux_core::ErrorCode;
    use pkgmux_test_utils::{MockPlugin, TestHarness};
    use tracing_test::traced_test;

    fn available(plugin: &str, identifier: &str) -> Option<AvailablePackageRef> {
        Some(AvailablePackageRef {
            context: Some(Context::new("default", "kubeapps")),
            identifier: identifier.to_string(),
            plugin: Some(PluginRef::new(plugin, "v1alpha1")),
        })
    }

    fn installed(plugin: &str, identifier: &str) -> Option<InstalledPackageRef> {
        Some(InstalledPackageRef {
            context: Some(Context::new("default", "kubeapps")),
            identifier: identifier.to_string(),
            plugin: Some(PluginRef::new(plugin, "v1alpha1")),
        })
    }

    fn harness(mocks: Vec<MockPlugin>) -> (TestHarness, Router) {
        let harness = mocks
            .into_iter()
            .fold(TestHarness::builder(), |b, m| b.with_mock(m))
            .build()
            .unwrap();
        let router = Router::new(harness.snapshot());
        (harness, router)
    }

    #[tokio::test]
    #[traced_test]
    async fn forwards_to_named_plugin() {
        let (harness, router) = harness(vec![
            MockPlugin::new("helm").with_packages(["apache"]),
            MockPlugin::new("flux").with_packages(["apache"]),
        ]);
        let resp = router
            .get_available_package_detail(GetAvailablePackageDetailRequest {
                available_package_ref: available("flux", "apache"),
                pkg_version: String::new(),
            })
            .await
            .unwrap();
        let detail = resp.available_package_detail.unwrap();
        assert_eq!(detail.available_package_ref.unwrap().plugin.unwrap().name, "flux");
        assert_eq!(harness.mock("flux").unwrap().calls(), 1);
        assert_eq!(harness.mock("helm").unwrap().calls(), 0);
        assert!(logs_contain("routing request"));
        assert!(logs_contain("kubeapps"));
    }

    #[tokio::test]
    async fn missing_plugin_is_invalid_argument_without_backend_call() {
        let (harness, router) = harness(vec![MockPlugin::new("helm").with_packages(["apache"])]);
        let mut reference = available("helm", "apache");
        if let Some(r) = reference.as_mut() {
            r.plugin = None;
        }
        let err = router
            .get_available_package_versions(GetAvailablePackageVersionsRequest {
                available_package_ref: reference,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(harness.mock("helm").unwrap().calls(), 0);

        let err = router
            .delete_installed_package(DeleteInstalledPackageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(harness.mock("helm").unwrap().calls(), 0);
    }

    #[tokio::test]
    async fn unknown_plugin_is_internal() {
        let (_harness, router) = harness(vec![MockPlugin::new("helm")]);
        let err = router
            .get_installed_package_detail(GetInstalledPackageDetailRequest {
                installed_package_ref: installed("carvel", "my-app"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PkgmuxError::PluginNotFound { ref name } if name == "carvel"));
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn backend_error_keeps_code_and_names_target() {
        let (_harness, router) = harness(vec![
            MockPlugin::new("helm").failing_with(ErrorCode::PermissionDenied, "forbidden"),
        ]);
        let err = router
            .update_installed_package(UpdateInstalledPackageRequest {
                installed_package_ref: installed("helm", "my-app"),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
        let msg = err.to_string();
        assert!(msg.contains("update the installed package"));
        assert!(msg.contains("my-app"));
        assert!(msg.contains("helm"));
    }

    #[tokio::test]
    async fn contract_violations_name_the_plugin() {
        let (_harness, router) = harness(vec![
            MockPlugin::new("helm").with_packages(["apache"]).malformed(),
        ]);

        let err = router
            .get_available_package_detail(GetAvailablePackageDetailRequest {
                available_package_ref: available("helm", "apache"),
                pkg_version: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PkgmuxError::ContractViolation { ref plugin, .. } if plugin == "helm"
        ));

        let err = router
            .get_available_package_versions(GetAvailablePackageVersionsRequest {
                available_package_ref: available("helm", "apache"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PkgmuxError::ContractViolation { .. }));

        let err = router
            .get_installed_package_detail(GetInstalledPackageDetailRequest {
                installed_package_ref: installed("helm", "my-app"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PkgmuxError::ContractViolation { .. }));

        let err = router
            .create_installed_package(CreateInstalledPackageRequest {
                available_package_ref: available("helm", "apache"),
                name: "my-app".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PkgmuxError::ContractViolation { .. }));

        let err = router
            .update_installed_package(UpdateInstalledPackageRequest {
                installed_package_ref: installed("helm", "my-app"),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PkgmuxError::ContractViolation { ref plugin, .. } if plugin == "helm"
        ));

        // No shape contract for resource refs and delete.
        router
            .get_installed_package_resource_refs(GetInstalledPackageResourceRefsRequest {
                installed_package_ref: installed("helm", "my-app"),
            })
            .await
            .unwrap();
        router
            .delete_installed_package(DeleteInstalledPackageRequest {
                installed_package_ref: installed("helm", "my-app"),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_and_update_return_references() {
        let (_harness, router) = harness(vec![MockPlugin::new("helm").with_packages(["apache"])]);
        let created = router
            .create_installed_package(CreateInstalledPackageRequest {
                available_package_ref: available("helm", "apache"),
                target_context: Some(Context::new("default", "web")),
                name: "my-apache".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let reference = created.installed_package_ref.unwrap();
        assert_eq!(reference.identifier, "my-apache");

        let updated = router
            .update_installed_package(UpdateInstalledPackageRequest {
                installed_package_ref: Some(reference.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.installed_package_ref, Some(reference));
    }
}
