// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered registry of backend plugins.

use std::sync::Arc;

use pkgmux_core::{PkgmuxError, PluginHandle, PluginRef};
use tracing::info;

/// Status of a plugin in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    /// Served by the core.
    Enabled,
    /// Registered but excluded from snapshots.
    Disabled,
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginStatus::Enabled => write!(f, "enabled"),
            PluginStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// A single entry in the plugin registry.
#[derive(Debug, Clone)]
pub struct PluginEntry {
    pub handle: PluginHandle,
    pub status: PluginStatus,
}

/// Registry of backend plugins, kept in registration order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin as `Enabled`.
    pub fn register(&mut self, handle: PluginHandle) -> Result<(), PkgmuxError> {
        self.register_with_status(handle, PluginStatus::Enabled)
    }

    /// Register a plugin with an explicit status. Names must be unique.
    pub fn register_with_status(
        &mut self,
        handle: PluginHandle,
        status: PluginStatus,
    ) -> Result<(), PkgmuxError> {
        if self.get(handle.name()).is_some() {
            return Err(PkgmuxError::Config(format!(
                "plugin {:?} is already registered",
                handle.name()
            )));
        }
        info!(
            plugin = handle.name(),
            version = %handle.plugin.version,
            %status,
            "registered plugin"
        );
        self.entries.push(PluginEntry { handle, status });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| e.handle.name() == name)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PkgmuxError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.handle.name() == name)
            .ok_or_else(|| PkgmuxError::PluginNotFound {
                name: name.to_string(),
            })?;
        entry.status = if enabled {
            PluginStatus::Enabled
        } else {
            PluginStatus::Disabled
        };
        Ok(())
    }

    /// All entries in registration order.
    pub fn list_all(&self) -> &[PluginEntry] {
        &self.entries
    }

    /// Immutable view of the enabled plugins, in registration order.
    pub fn snapshot(&self) -> PluginSnapshot {
        PluginSnapshot::new(
            self.entries
                .iter()
                .filter(|e| e.status == PluginStatus::Enabled)
                .map(|e| e.handle.clone())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only list of plugin handles held for the duration of a call.
#[derive(Debug, Clone, Default)]
pub struct PluginSnapshot {
    plugins: Arc<[PluginHandle]>,
}

impl PluginSnapshot {
    pub fn new(plugins: Vec<PluginHandle>) -> Self {
        Self {
            plugins: plugins.into(),
        }
    }

    /// Resolve a plugin by exact name. The first match wins.
    pub fn find(&self, plugin: &PluginRef) -> Option<&PluginHandle> {
        self.plugins.iter().find(|p| p.plugin.name == plugin.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginHandle> {
        self.plugins.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl From<Vec<PluginHandle>> for PluginSnapshot {
    fn from(plugins: Vec<PluginHandle>) -> Self {
        Self::new(plugins)
    }
}
