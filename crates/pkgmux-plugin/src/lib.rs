// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry, catalog manifests, and the static catalog backend.
//!
//! The registry keeps backend plugins in registration order, which is
//! significant: it breaks ties in the fan-in merge and orders non-paginated
//! fan-out. Each call works on an immutable [`PluginSnapshot`].

pub mod catalog;
pub mod manifest;
pub mod registry;

pub use catalog::StaticCatalogPlugin;
pub use manifest::{load_catalog_manifest, parse_catalog_manifest, CatalogManifest};
pub use registry::{PluginEntry, PluginRegistry, PluginSnapshot, PluginStatus};
