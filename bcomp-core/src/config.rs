//! Circuit configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, Result};

/// Limits and checks applied by a [`Circuit`](crate::graph::Circuit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Deepest cascade allowed before propagation aborts.
    pub max_depth: usize,

    /// Reject wiring that would silently truncate bits.
    pub strict_widths: bool,
}

impl CircuitConfig {
    /// Default cascade depth limit.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CircuitError::Config(e.to_string()))
    }
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            strict_widths: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = CircuitConfig::from_json(r#"{ "max_depth": 8 }"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.strict_widths);

        assert_eq!(CircuitConfig::from_json("{}").unwrap(), CircuitConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = CircuitConfig::from_json(r#"{ "max_depth": "deep" }"#).unwrap_err();
        assert!(matches!(err, CircuitError::Config(_)));
    }
}
