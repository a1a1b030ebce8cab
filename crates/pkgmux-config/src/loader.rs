// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./pkgmux.toml` > `~/.config/pkgmux/pkgmux.toml` > `/etc/pkgmux/pkgmux.toml`
//! with environment variable overrides via the `PKGMUX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PkgmuxConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/pkgmux/pkgmux.toml";
pub(crate) const USER_CONFIG: &str = "pkgmux/pkgmux.toml";
pub(crate) const LOCAL_CONFIG: &str = "pkgmux.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pkgmux/pkgmux.toml`
/// 3. `~/.config/pkgmux/pkgmux.toml`
/// 4. `./pkgmux.toml`
/// 5. `PKGMUX_*` environment variables
pub fn load_config() -> Result<PkgmuxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PkgmuxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PkgmuxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PkgmuxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PkgmuxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PkgmuxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join(USER_CONFIG))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map `PKGMUX_<SECTION>_<KEY>` to `section.key`. Keys arrive uppercase.
///
/// Only the first underscore after a known section name is a separator, so
/// `PKGMUX_AGGREGATION_REQUEST_TIMEOUT_SECS` maps to
/// `aggregation.request_timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("PKGMUX_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("aggregation_", "aggregation.", 1)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSplit;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pkgmux.toml", "[server]\nlog_level = \"warn\"\n")?;
            jail.set_env("PKGMUX_AGGREGATION_PAGE_SPLIT", "legacy");
            jail.set_env("PKGMUX_AGGREGATION_REQUEST_TIMEOUT_SECS", "7");

            let config = load_config_from_path(Path::new("pkgmux.toml"))?;
            assert_eq!(config.server.log_level, "warn");
            assert_eq!(config.aggregation.page_split, PageSplit::Legacy);
            assert_eq!(config.aggregation.request_timeout_secs, Some(7));
            Ok(())
        });
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pkgmux.toml", "[server]\nlog_level = \"warn\"\n")?;
            jail.set_env("PKGMUX_SERVER_LOG_LEVEL", "debug");

            let config = load_config_from_path(Path::new("pkgmux.toml"))?;
            assert_eq!(config.server.log_level, "debug");
            Ok(())
        });
    }
}
