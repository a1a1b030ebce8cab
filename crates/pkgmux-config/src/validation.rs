// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::PkgmuxConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &PkgmuxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.server.log_level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level `{}` must be one of {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.aggregation.request_timeout_secs == Some(0) {
        errors.push(ConfigError::Validation {
            message: "aggregation.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (i, plugin) in config.plugins.iter().enumerate() {
        if plugin.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugins[{i}].name must not be empty"),
            });
        } else if !seen.insert(plugin.name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate plugin name `{}` in [[plugins]]", plugin.name),
            });
        }

        if plugin.catalog.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugins[{i}].catalog must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
