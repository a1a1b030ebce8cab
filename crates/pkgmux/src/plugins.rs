// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry construction from the `[[plugins]]` configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkgmux_config::{PkgmuxConfig, PluginConfig};
use pkgmux_core::{PkgmuxError, PluginHandle, PluginRef};
use pkgmux_plugin::{PluginRegistry, PluginStatus, StaticCatalogPlugin};
use serde::Serialize;
use tracing::debug;

/// A registered plugin as shown by `pkgmux plugins`.
#[derive(Debug, Serialize)]
pub struct PluginListing {
    pub name: String,
    pub version: String,
    pub status: String,
    pub catalog: String,
}

/// Resolve a catalog path. Relative paths are taken from `base`.
pub fn catalog_path(plugin: &PluginConfig, base: &Path) -> PathBuf {
    let path = Path::new(&plugin.catalog);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load every configured catalog and register it, keeping config order.
pub fn build_registry(
    config: &PkgmuxConfig,
    base: &Path,
) -> Result<PluginRegistry, PkgmuxError> {
    let mut registry = PluginRegistry::new();
    for plugin in &config.plugins {
        let path = catalog_path(plugin, base);
        debug!(plugin = %plugin.name, catalog = %path.display(), "loading catalog");

        let reference = PluginRef::new(&plugin.name, &plugin.version);
        let service = StaticCatalogPlugin::from_path(reference.clone(), &path)
            .map_err(|e| PkgmuxError::Config(format!("plugin {:?}: {e}", plugin.name)))?;
        let status = if plugin.enabled {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        registry.register_with_status(PluginHandle::new(reference, Arc::new(service)), status)?;
    }
    Ok(registry)
}

/// Describe the registry alongside the configured catalog paths.
pub fn list_plugins(
    config: &PkgmuxConfig,
    registry: &PluginRegistry,
    base: &Path,
) -> Vec<PluginListing> {
    registry
        .list_all()
        .iter()
        .map(|entry| PluginListing {
            name: entry.handle.name().to_string(),
            version: entry.handle.plugin.version.clone(),
            status: entry.status.to_string(),
            catalog: config
                .plugins
                .iter()
                .find(|p| p.name == entry.handle.name())
                .map(|p| catalog_path(p, base).display().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, catalog: &str, enabled: bool) -> PluginConfig {
        PluginConfig {
            name: name.to_string(),
            version: "v1alpha1".to_string(),
            catalog: catalog.to_string(),
            enabled,
        }
    }

    #[test]
    fn relative_catalogs_resolve_against_base() {
        let base = Path::new("/srv/pkgmux");
        assert_eq!(
            catalog_path(&plugin("helm", "helm.toml", true), base),
            PathBuf::from("/srv/pkgmux/helm.toml")
        );
        assert_eq!(
            catalog_path(&plugin("helm", "/etc/helm.toml", true), base),
            PathBuf::from("/etc/helm.toml")
        );
    }

    #[test]
    fn builds_registry_with_status() {
        let dir = tempfile::tempdir().unwrap();
        let helm = "[[packages]]\nname = \"apache\"\n";
        std::fs::write(dir.path().join("helm.toml"), helm).unwrap();
        std::fs::write(dir.path().join("flux.toml"), "").unwrap();

        let config = PkgmuxConfig {
            plugins: vec![
                plugin("helm", "helm.toml", true),
                plugin("flux", "flux.toml", false),
            ],
            ..Default::default()
        };
        let registry = build_registry(&config, dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot().len(), 1);

        let listing = list_plugins(&config, &registry, dir.path());
        assert_eq!(listing[1].name, "flux");
        assert_eq!(listing[1].status, "disabled");
    }

    #[test]
    fn missing_catalog_names_the_plugin() {
        let config = PkgmuxConfig {
            plugins: vec![plugin("helm", "missing.toml", true)],
            ..Default::default()
        };
        let err = build_registry(&config, Path::new("/nonexistent")).unwrap_err();
        assert!(err.to_string().contains("helm"));
    }
}
