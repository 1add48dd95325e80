//! Graph configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Punning policy the factory registry is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A named node may not carry disjoint entity types at once
    /// (class + datatype, or two different property kinds).
    #[default]
    Strict,
    /// Any combination of declarations is accepted.
    Lax,
}

/// Configuration for opening a `Graph`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub mode: Mode,
    /// Keep successful resolutions in the per-graph view cache.
    pub cache_views: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { mode: Mode::Strict, cache_views: true }
    }
}

impl GraphConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache(mut self, cache_views: bool) -> Self {
        self.cache_views = cache_views;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.mode, Mode::Strict);
        assert!(cfg.cache_views);
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = GraphConfig::from_json(r#"{"mode": "lax"}"#).unwrap();
        assert_eq!(cfg.mode, Mode::Lax);
        assert!(cfg.cache_views);
    }

    #[test]
    fn test_from_json_rejects_unknown_mode() {
        assert!(GraphConfig::from_json(r#"{"mode": "medium"}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = GraphConfig::default().with_mode(Mode::Lax).with_cache(false);
        assert_eq!(GraphConfig::from_json(&cfg.to_json().unwrap()).unwrap(), cfg);
    }
}
