// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog manifests: the TOML files a static catalog plugin serves from.
//!
//! ```toml
//! [[packages]]
//! name = "apache"
//! identifier = "bitnami/apache"
//! categories = ["Infrastructure"]
//! versions = [{ pkg_version = "9.1.0", app_version = "2.4.57" }]
//!
//! [[installed]]
//! name = "my-apache"
//! package = "bitnami/apache"
//! namespace = "web"
//! ```

use std::collections::HashSet;
use std::path::Path;

use pkgmux_core::types::PackageAppVersion;
use pkgmux_core::PkgmuxError;
use serde::{Deserialize, Serialize};

/// Parsed catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    #[serde(default)]
    pub packages: Vec<CatalogPackage>,
    #[serde(default)]
    pub installed: Vec<CatalogInstall>,
}

/// An available package. `versions` lists newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogPackage {
    pub name: String,
    /// Defaults to `name` when omitted.
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default)]
    pub default_values: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub versions: Vec<PackageAppVersion>,
}

/// A package already installed when the catalog is loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogInstall {
    pub name: String,
    /// Identifier of the available package it was installed from.
    pub package: String,
    #[serde(default = "default_cluster")]
    pub cluster: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Defaults to the package's latest version.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub values: String,
}

fn default_cluster() -> String {
    "default".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

/// Parse and normalise a catalog manifest from TOML content.
///
/// Fills in default identifiers and rejects empty names, duplicate
/// identifiers, and installs that point at unknown packages.
pub fn parse_catalog_manifest(toml_content: &str) -> Result<CatalogManifest, PkgmuxError> {
    let mut manifest: CatalogManifest = toml::from_str(toml_content)
        .map_err(|e| PkgmuxError::Config(format!("invalid catalog manifest: {e}")))?;

    let mut identifiers = HashSet::new();
    for package in &mut manifest.packages {
        if package.name.trim().is_empty() {
            return Err(PkgmuxError::Config(
                "catalog manifest: package name must not be empty".to_string(),
            ));
        }
        if package.identifier.is_empty() {
            package.identifier = package.name.clone();
        }
        if !identifiers.insert(package.identifier.clone()) {
            return Err(PkgmuxError::Config(format!(
                "catalog manifest: duplicate package identifier '{}'",
                package.identifier
            )));
        }
    }

    for install in &manifest.installed {
        if !identifiers.contains(&install.package) {
            return Err(PkgmuxError::Config(format!(
                "catalog manifest: installed package '{}' refers to unknown package '{}'",
                install.name, install.package
            )));
        }
    }

    Ok(manifest)
}

/// Read and parse a catalog manifest file.
pub fn load_catalog_manifest(path: &Path) -> Result<CatalogManifest, PkgmuxError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PkgmuxError::Config(format!("unable to read catalog {}: {e}", path.display()))
    })?;
    parse_catalog_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
[[packages]]
name = "apache"
identifier = "bitnami/apache"
categories = ["Infrastructure"]
versions = [{ pkg_version = "9.1.0", app_version = "2.4.57" }]

[[packages]]
name = "redis"

[[installed]]
name = "web"
package = "bitnami/apache"
namespace = "prod"
"#;

    #[test]
    fn parses_valid_manifest() {
        let manifest = parse_catalog_manifest(VALID).unwrap();
        assert_eq!(manifest.packages.len(), 2);
        assert_eq!(manifest.packages[0].identifier, "bitnami/apache");
        assert_eq!(manifest.packages[0].versions[0].app_version, "2.4.57");
        assert_eq!(manifest.packages[1].identifier, "redis");
        assert_eq!(manifest.installed[0].cluster, "default");
        assert_eq!(manifest.installed[0].namespace, "prod");
    }

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = parse_catalog_manifest("").unwrap();
        assert!(manifest.packages.is_empty());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(parse_catalog_manifest("[[packages]]\nname = \"\"\n").is_err());
    }

    #[test]
    fn rejects_duplicate_identifier() {
        let toml = "[[packages]]\nname = \"a\"\n[[packages]]\nname = \"a\"\n";
        let err = parse_catalog_manifest(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_install_of_unknown_package() {
        let toml = "[[installed]]\nname = \"x\"\npackage = \"missing\"\n";
        assert!(parse_catalog_manifest(toml).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(parse_catalog_manifest("[[packages]]\nname = \"a\"\ncolour = \"red\"\n").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let manifest = load_catalog_manifest(file.path()).unwrap();
        assert_eq!(manifest.packages.len(), 2);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = load_catalog_manifest(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(matches!(err, PkgmuxError::Config(_)));
    }
}
