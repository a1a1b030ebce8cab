// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a plugin registry from mock plugins and catalog
//! manifests, and keeps the mocks reachable so tests can inspect their call
//! counters after driving the core.

use std::sync::Arc;

use pkgmux_core::{PkgmuxError, PluginHandle, PluginRef};
use pkgmux_plugin::{parse_catalog_manifest, PluginRegistry, PluginSnapshot, StaticCatalogPlugin};

use crate::mock_plugin::MockPlugin;

enum PendingPlugin {
    Mock(MockPlugin),
    Catalog { name: String, manifest: String },
}

/// Builder for creating test environments, plugins kept in insertion order.
#[derive(Default)]
pub struct TestHarnessBuilder {
    plugins: Vec<PendingPlugin>,
}

impl TestHarnessBuilder {
    /// Register a mock plugin.
    pub fn with_mock(mut self, mock: MockPlugin) -> Self {
        self.plugins.push(PendingPlugin::Mock(mock));
        self
    }

    /// Register a static catalog plugin parsed from TOML content.
    pub fn with_catalog(mut self, name: &str, manifest: &str) -> Self {
        self.plugins.push(PendingPlugin::Catalog {
            name: name.to_string(),
            manifest: manifest.to_string(),
        });
        self
    }

    /// Build the registry.
    pub fn build(self) -> Result<TestHarness, PkgmuxError> {
        let mut registry = PluginRegistry::new();
        let mut mocks = Vec::new();

        for pending in self.plugins {
            let handle = match pending {
                PendingPlugin::Mock(mock) => {
                    let mock = Arc::new(mock);
                    let handle = mock.handle();
                    mocks.push(mock);
                    handle
                }
                PendingPlugin::Catalog { name, manifest } => {
                    let plugin = PluginRef::new(name, "v1alpha1");
                    let catalog = parse_catalog_manifest(&manifest)?;
                    PluginHandle::new(
                        plugin.clone(),
                        Arc::new(StaticCatalogPlugin::new(plugin, catalog)),
                    )
                }
            };
            registry.register(handle)?;
        }

        Ok(TestHarness { registry, mocks })
    }
}

/// A registry of test plugins.
pub struct TestHarness {
    pub registry: PluginRegistry,
    mocks: Vec<Arc<MockPlugin>>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Snapshot of the enabled plugins.
    pub fn snapshot(&self) -> PluginSnapshot {
        self.registry.snapshot()
    }

    /// Look up a registered mock by plugin name.
    pub fn mock(&self, name: &str) -> Option<&Arc<MockPlugin>> {
        self.mocks.iter().find(|m| m.plugin().name == name)
    }

    /// Total available-summaries calls across all mocks.
    pub fn summary_calls(&self) -> usize {
        self.mocks.iter().map(|m| m.summary_calls()).sum()
    }
}
