// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for pkgmux.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level pkgmux configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PkgmuxConfig {
    /// Process-level settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fan-in aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Backend plugins, in registration order.
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Default tracing level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How the requested global page size is split into per-plugin page sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSplit {
    /// `ceil(page_size / plugins)`.
    #[default]
    Even,
    /// `page_size / (plugins - 1)` for more than one plugin.
    Legacy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    #[serde(default)]
    pub page_split: PageSplit,

    /// Deadline for one aggregated listing, in seconds. `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl AggregationConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// A backend plugin served from a catalog file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Plugin name; the routing key carried in package references.
    pub name: String,

    #[serde(default = "default_plugin_version")]
    pub version: String,

    /// Path to the plugin's catalog TOML file.
    pub catalog: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_plugin_version() -> String {
    "v1alpha1".to_string()
}

fn default_enabled() -> bool {
    true
}
