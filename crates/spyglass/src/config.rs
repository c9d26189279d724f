//! Registry configuration.
//!
//! Loaded from YAML or JSON, e.g.
//!
//! ```yaml
//! reset_policy: stub
//! clear_mocks: true
//! restore_mocks: true
//! ```

use crate::result::{SpyError, SpyResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a reset falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// The implementation the mock was created with. For spies this is the
    /// original method.
    #[default]
    Initial,
    /// A stub returning `Null`
    Stub,
}

/// Configuration for a [`MockRegistry`](crate::MockRegistry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockConfig {
    /// Reset target for `reset_all_mocks` and `mock_reset`
    pub reset_policy: ResetPolicy,
    /// Clear call history at every test boundary
    pub clear_mocks: bool,
    /// Reset implementations at every test boundary
    pub mock_reset: bool,
    /// Restore spied methods at every test boundary
    pub restore_mocks: bool,
}

impl MockConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reset policy
    #[must_use]
    pub const fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Clear history at test boundaries
    #[must_use]
    pub const fn with_clear_mocks(mut self, enabled: bool) -> Self {
        self.clear_mocks = enabled;
        self
    }

    /// Reset implementations at test boundaries
    #[must_use]
    pub const fn with_mock_reset(mut self, enabled: bool) -> Self {
        self.mock_reset = enabled;
        self
    }

    /// Restore spies at test boundaries
    #[must_use]
    pub const fn with_restore_mocks(mut self, enabled: bool) -> Self {
        self.restore_mocks = enabled;
        self
    }

    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> SpyResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse JSON
    pub fn from_json_str(json: &str) -> SpyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> SpyResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SpyError::config(format!(
                "unsupported config file '{}': expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }
}
