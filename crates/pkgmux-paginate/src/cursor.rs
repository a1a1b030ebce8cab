// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin and composite pagination cursors.

use std::collections::BTreeMap;
use std::fmt;

use pkgmux_core::PkgmuxError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire value of [`PluginCursor::Exhausted`].
const EXHAUSTED: i64 = -1;

/// Progress of one plugin within the aggregated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCursor {
    /// Offset of the next item to fetch from the plugin.
    Offset(u64),
    /// The plugin has no further results for this query; never query it again.
    Exhausted,
}

impl PluginCursor {
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl Default for PluginCursor {
    fn default() -> Self {
        Self::Offset(0)
    }
}

impl fmt::Display for PluginCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(offset) => write!(f, "{offset}"),
            Self::Exhausted => write!(f, "{EXHAUSTED}"),
        }
    }
}

impl Serialize for PluginCursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Offset(offset) => {
                serializer.serialize_i64(i64::try_from(*offset).unwrap_or(i64::MAX))
            }
            Self::Exhausted => serializer.serialize_i64(EXHAUSTED),
        }
    }
}

impl<'de> Deserialize<'de> for PluginCursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            EXHAUSTED => Ok(Self::Exhausted),
            n if n >= 0 => Ok(Self::Offset(n as u64)),
            n => Err(serde::de::Error::custom(format!(
                "offset must be non-negative or {EXHAUSTED}, got {n}"
            ))),
        }
    }
}

/// Mapping from plugin name to that plugin's progress.
///
/// Serialized as a JSON object with keys in sorted order, so a token produced
/// by [`CompositeCursor::encode`] survives a parse/encode cycle unchanged.
/// An entry that reached [`PluginCursor::Exhausted`] stays exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeCursor {
    plugins: BTreeMap<String, PluginCursor>,
}

impl CompositeCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a caller-supplied page token. The empty token is the first page.
    pub fn parse(token: &str) -> Result<Self, PkgmuxError> {
        if token.is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(token).map_err(|e| PkgmuxError::InvalidPageToken {
            token: token.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize into an opaque page token.
    pub fn encode(&self) -> Result<String, PkgmuxError> {
        serde_json::to_string(self).map_err(|e| {
            PkgmuxError::Internal(format!("unable to marshal next item offsets: {e}"))
        })
    }

    /// Progress of `plugin`; plugins without an entry start at offset zero.
    pub fn get(&self, plugin: &str) -> PluginCursor {
        self.plugins.get(plugin).copied().unwrap_or_default()
    }

    /// Record progress for `plugin`. An exhausted entry is never reopened.
    pub fn set(&mut self, plugin: &str, cursor: PluginCursor) {
        match self.plugins.get_mut(plugin) {
            Some(PluginCursor::Exhausted) => {}
            Some(existing) => *existing = cursor,
            None => {
                self.plugins.insert(plugin.to_string(), cursor);
            }
        }
    }

    /// Drop entries for plugins that are not in `names`.
    pub fn retain_plugins<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let keep: Vec<&str> = names.into_iter().collect();
        self.plugins.retain(|name, _| keep.contains(&name.as_str()));
    }

    /// True when every entry is exhausted (vacuously true when empty).
    pub fn all_exhausted(&self) -> bool {
        self.plugins.values().all(|c| c.is_exhausted())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PluginCursor)> {
        self.plugins.iter().map(|(name, c)| (name.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgmux_core::ErrorCode;
    use proptest::prelude::*;

    #[test]
    fn empty_token_is_first_page() {
        let cursor = CompositeCursor::parse("").unwrap();
        assert!(cursor.is_empty());
        assert_eq!(cursor.get("anything"), PluginCursor::Offset(0));
    }

    #[test]
    fn encodes_sentinel_as_minus_one_with_sorted_keys() {
        let mut cursor = CompositeCursor::new();
        cursor.set("beta", PluginCursor::Exhausted);
        cursor.set("alpha", PluginCursor::Offset(1));
        assert_eq!(cursor.encode().unwrap(), r#"{"alpha":1,"beta":-1}"#);
    }

    #[test]
    fn parse_encode_is_byte_stable() {
        let token = r#"{"alpha":12,"beta":-1,"gamma":0}"#;
        let cursor = CompositeCursor::parse(token).unwrap();
        assert_eq!(cursor.encode().unwrap(), token);
        assert_eq!(cursor.get("alpha"), PluginCursor::Offset(12));
        assert_eq!(cursor.get("beta"), PluginCursor::Exhausted);
    }

    #[test]
    fn exhausted_entry_is_never_reopened() {
        let mut cursor = CompositeCursor::new();
        cursor.set("beta", PluginCursor::Exhausted);
        cursor.set("beta", PluginCursor::Offset(7));
        assert_eq!(cursor.get("beta"), PluginCursor::Exhausted);
    }

    #[test]
    fn rejects_garbage_and_negative_offsets() {
        for token in ["not json", r#"{"alpha":-2}"#, r#"{"alpha":"3"}"#, "[1,2]"] {
            let err = CompositeCursor::parse(token).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidArgument, "token {token}");
        }
    }

    #[test]
    fn retain_plugins_drops_unregistered_entries() {
        let mut cursor = CompositeCursor::parse(r#"{"alpha":1,"gone":4}"#).unwrap();
        cursor.retain_plugins(["alpha", "beta"]);
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.get("gone"), PluginCursor::Offset(0));
    }

    #[test]
    fn all_exhausted_requires_every_entry() {
        let mut cursor = CompositeCursor::new();
        assert!(cursor.all_exhausted());
        cursor.set("alpha", PluginCursor::Exhausted);
        cursor.set("beta", PluginCursor::Offset(2));
        assert!(!cursor.all_exhausted());
        cursor.set("beta", PluginCursor::Exhausted);
        assert!(cursor.all_exhausted());
    }

    proptest! {
        #[test]
        fn encoded_tokens_reparse_to_the_same_cursor(
            entries in proptest::collection::btree_map("[a-z]{1,8}", proptest::option::of(0u64..10_000), 0..6)
        ) {
            let mut cursor = CompositeCursor::new();
            for (name, offset) in &entries {
                let c = offset.map(PluginCursor::Offset).unwrap_or(PluginCursor::Exhausted);
                cursor.set(name, c);
            }
            let token = cursor.encode().unwrap();
            let reparsed = CompositeCursor::parse(&token).unwrap();
            prop_assert_eq!(&reparsed, &cursor);
            prop_assert_eq!(reparsed.encode().unwrap(), token);
        }
    }
}
