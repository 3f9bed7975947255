use serde::{Deserialize, Serialize};

/// Configuration for the `security_override` module.
///
/// The override stage itself has no options; `enabled` only controls whether
/// the stage is contributed to the handler chain at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityOverrideConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SecurityOverrideConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_config_enables_the_stage() {
        let config: SecurityOverrideConfig = serde_json::from_str("{}").unwrap();
        assert!(config.enabled);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<SecurityOverrideConfig>(r#"{"enabld": false}"#).is_err());
    }
}
