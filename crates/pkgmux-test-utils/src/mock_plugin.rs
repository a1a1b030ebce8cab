// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend plugin for deterministic testing.
//!
//! `MockPlugin` serves a fixed, sorted list of package names with offset
//! pagination. Knobs inject failures, broken page tokens, slow responses and
//! responses that miss required fields; counters record every call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pkgmux_core::types::*;
use pkgmux_core::{ErrorCode, PackagesService, PkgmuxError, PluginHandle, PluginRef};
use pkgmux_paginate::page_window;

/// A scripted backend plugin.
pub struct MockPlugin {
    plugin: PluginRef,
    packages: Vec<String>,
    categories: Vec<String>,
    installed: Vec<String>,
    failure: Option<(ErrorCode, String)>,
    token_skew: i64,
    padded_tokens: bool,
    max_page_size: Option<u32>,
    delay: Option<Duration>,
    malformed: bool,
    calls: AtomicUsize,
    summary_calls: AtomicUsize,
    page_tokens: Mutex<Vec<String>>,
}

impl MockPlugin {
    /// Create a mock plugin with no packages.
    pub fn new(name: &str) -> Self {
        Self {
            plugin: PluginRef::new(name, "v1alpha1"),
            packages: Vec::new(),
            categories: Vec::new(),
            installed: Vec::new(),
            failure: None,
            token_skew: 0,
            padded_tokens: false,
            max_page_size: None,
            delay: None,
            malformed: false,
            calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            page_tokens: Mutex::new(Vec::new()),
        }
    }

    /// Available package names. They are served sorted.
    pub fn with_packages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = names.into_iter().map(Into::into).collect();
        self.packages.sort();
        self
    }

    /// Categories attached to every summaries response.
    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Names of installed packages, served without a plugin in their reference.
    pub fn with_installed(mut self, names: &[&str]) -> Self {
        self.installed = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Fail every call with the given code.
    pub fn failing_with(mut self, code: ErrorCode, message: &str) -> Self {
        self.failure = Some((code, message.to_string()));
        self
    }

    /// Shift every non-empty next page token by `skew`.
    pub fn with_token_skew(mut self, skew: i64) -> Self {
        self.token_skew = skew;
        self
    }

    /// Zero-pad every non-empty next page token to two digits (`"1"` becomes `"01"`).
    pub fn with_padded_tokens(mut self) -> Self {
        self.padded_tokens = true;
        self
    }

    /// Serve at most `size` items per page regardless of the request.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = Some(size);
        self
    }

    /// Sleep before answering a summaries request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer single-target calls with responses that miss required fields.
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Registry handle sharing this mock.
    pub fn handle(self: &Arc<Self>) -> PluginHandle {
        PluginHandle::new(self.plugin.clone(), self.clone())
    }

    pub fn plugin(&self) -> &PluginRef {
        &self.plugin
    }

    /// Total number of calls on any operation.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of available-summaries calls.
    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    /// Page tokens received by available-summaries calls, in order.
    pub async fn page_tokens(&self) -> Vec<String> {
        self.page_tokens.lock().await.clone()
    }

    fn enter(&self) -> Result<(), PkgmuxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((code, message)) => Err(PkgmuxError::status(*code, message.clone())),
            None => Ok(()),
        }
    }

    fn available_ref(&self, identifier: &str, context: Option<Context>) -> AvailablePackageRef {
        AvailablePackageRef {
            context,
            identifier: identifier.to_string(),
            plugin: Some(self.plugin.clone()),
        }
    }

    fn installed_ref(&self, reference: Option<InstalledPackageRef>) -> Option<InstalledPackageRef> {
        if self.malformed {
            return None;
        }
        reference.or_else(|| {
            Some(InstalledPackageRef {
                plugin: Some(self.plugin.clone()),
                ..Default::default()
            })
        })
    }

    fn find(&self, reference: Option<&AvailablePackageRef>) -> Result<String, PkgmuxError> {
        let identifier = reference.map(|r| r.identifier.as_str()).unwrap_or_default();
        self.packages
            .iter()
            .find(|p| p.as_str() == identifier)
            .cloned()
            .ok_or_else(|| PkgmuxError::not_found(format!("no package {identifier:?}")))
    }
}

#[async_trait]
impl PackagesService for MockPlugin {
    async fn get_available_package_summaries(
        &self,
        request: GetAvailablePackageSummariesRequest,
    ) -> Result<GetAvailablePackageSummariesResponse, PkgmuxError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.page_tokens
            .lock()
            .await
            .push(request.page_token().to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.enter()?;

        let mut size = request.page_size();
        if let Some(max) = self.max_page_size
            && (size == 0 || size > max)
        {
            size = max;
        }
        let (window, mut next_page_token) =
            page_window(self.packages.len(), request.page_token(), size)?;
        if self.token_skew != 0 && !next_page_token.is_empty() {
            let offset: i64 = next_page_token.parse().unwrap_or_default();
            next_page_token = (offset + self.token_skew).to_string();
        }
        if self.padded_tokens && !next_page_token.is_empty() {
            next_page_token = format!("{next_page_token:0>2}");
        }

        Ok(GetAvailablePackageSummariesResponse {
            available_package_summaries: self.packages[window]
                .iter()
                .map(|name| AvailablePackageSummary {
                    available_package_ref: Some(
                        self.available_ref(name, request.context.clone()),
                    ),
                    name: name.clone(),
                    display_name: name.clone(),
                    ..Default::default()
                })
                .collect(),
            categories: self.categories.clone(),
            next_page_token,
        })
    }

    async fn get_available_package_detail(
        &self,
        request: GetAvailablePackageDetailRequest,
    ) -> Result<GetAvailablePackageDetailResponse, PkgmuxError> {
        self.enter()?;
        if self.malformed {
            return Ok(GetAvailablePackageDetailResponse {
                available_package_detail: Some(AvailablePackageDetail::default()),
            });
        }
        let name = self.find(request.available_package_ref.as_ref())?;
        Ok(GetAvailablePackageDetailResponse {
            available_package_detail: Some(AvailablePackageDetail {
                available_package_ref: Some(self.available_ref(&name, None)),
                name,
                ..Default::default()
            }),
        })
    }

    async fn get_available_package_versions(
        &self,
        request: GetAvailablePackageVersionsRequest,
    ) -> Result<GetAvailablePackageVersionsResponse, PkgmuxError> {
        self.enter()?;
        if self.malformed {
            return Ok(GetAvailablePackageVersionsResponse::default());
        }
        self.find(request.available_package_ref.as_ref())?;
        Ok(GetAvailablePackageVersionsResponse {
            package_app_versions: Some(vec![PackageAppVersion {
                pkg_version: "1.0.0".to_string(),
                app_version: "1.0.0".to_string(),
            }]),
        })
    }

    async fn get_installed_package_summaries(
        &self,
        _request: GetInstalledPackageSummariesRequest,
    ) -> Result<GetInstalledPackageSummariesResponse, PkgmuxError> {
        self.enter()?;
        Ok(GetInstalledPackageSummariesResponse {
            installed_package_summaries: self
                .installed
                .iter()
                .map(|name| InstalledPackageSummary {
                    installed_package_ref: Some(InstalledPackageRef {
                        identifier: name.clone(),
                        ..Default::default()
                    }),
                    name: name.clone(),
                    ..Default::default()
                })
                .collect(),
            next_page_token: String::new(),
        })
    }

    async fn get_installed_package_detail(
        &self,
        request: GetInstalledPackageDetailRequest,
    ) -> Result<GetInstalledPackageDetailResponse, PkgmuxError> {
        self.enter()?;
        if self.malformed {
            return Ok(GetInstalledPackageDetailResponse::default());
        }
        Ok(GetInstalledPackageDetailResponse {
            installed_package_detail: Some(InstalledPackageDetail {
                installed_package_ref: request.installed_package_ref,
                ..Default::default()
            }),
        })
    }

    async fn get_installed_package_resource_refs(
        &self,
        request: GetInstalledPackageResourceRefsRequest,
    ) -> Result<GetInstalledPackageResourceRefsResponse, PkgmuxError> {
        self.enter()?;
        Ok(GetInstalledPackageResourceRefsResponse {
            context: request.installed_package_ref.and_then(|r| r.context),
            resource_refs: Vec::new(),
        })
    }

    async fn create_installed_package(
        &self,
        request: CreateInstalledPackageRequest,
    ) -> Result<CreateInstalledPackageResponse, PkgmuxError> {
        self.enter()?;
        Ok(CreateInstalledPackageResponse {
            installed_package_ref: self.installed_ref(Some(InstalledPackageRef {
                context: request.target_context,
                identifier: request.name,
                plugin: Some(self.plugin.clone()),
            })),
        })
    }

    async fn update_installed_package(
        &self,
        request: UpdateInstalledPackageRequest,
    ) -> Result<UpdateInstalledPackageResponse, PkgmuxError> {
        self.enter()?;
        Ok(UpdateInstalledPackageResponse {
            installed_package_ref: self.installed_ref(request.installed_package_ref),
        })
    }

    async fn delete_installed_package(
        &self,
        _request: DeleteInstalledPackageRequest,
    ) -> Result<DeleteInstalledPackageResponse, PkgmuxError> {
        self.enter()?;
        Ok(DeleteInstalledPackageResponse {})
    }
}
