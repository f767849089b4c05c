// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-level process configuration: log level, default response format,
//! and credential backend selection.
//!
//! Provides [`ClihostConfig`] together with helpers for loading from a TOML
//! file, applying `CLIHOST_*` environment overrides, validating the result,
//! and merging overlays.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or validating a [`ClihostConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// Two configs could not be merged because of conflicting constraints.
    #[error("merge conflict: {reason}")]
    MergeConflict {
        /// Description of the conflict.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A deprecated field was used in the configuration.
    DeprecatedField {
        /// Name of the deprecated field.
        field: String,
        /// Suggested replacement, if any.
        suggestion: Option<String>,
    },
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::DeprecatedField { field, suggestion } => {
                write!(f, "deprecated field '{field}'")?;
                if let Some(s) = suggestion {
                    write!(f, " — use '{s}' instead")?;
                }
                Ok(())
            }
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config type
// ---------------------------------------------------------------------------

/// Host-level process configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ClihostConfig {
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Default response format when a command doesn't request one
    /// explicitly (`"default"` or `"json"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Credential backend to construct at startup: `"inert"` for the
    /// in-memory reference backend, or a host-registered name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_backend: Option<String>,
}

impl Default for ClihostConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            default_format: Some("default".into()),
            credential_backend: Some("inert".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: &[&str] = &["default", "json"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`ClihostConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`ClihostConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<ClihostConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => ClihostConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`ClihostConfig`].
pub fn parse_toml(content: &str) -> Result<ClihostConfig, ConfigError> {
    toml::from_str::<ClihostConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `CLIHOST_LOG_LEVEL`
/// - `CLIHOST_DEFAULT_FORMAT`
/// - `CLIHOST_CREDENTIAL_BACKEND`
pub fn apply_env_overrides(config: &mut ClihostConfig) {
    if let Ok(val) = std::env::var("CLIHOST_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("CLIHOST_DEFAULT_FORMAT") {
        config.default_format = Some(val);
    }
    if let Ok(val) = std::env::var("CLIHOST_CREDENTIAL_BACKEND") {
        config.credential_backend = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (unrecognised log level or format) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &ClihostConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }

    if let Some(ref format) = config.default_format {
        if !VALID_FORMATS.contains(&format.as_str()) {
            errors.push(format!("invalid default_format '{format}'"));
        }
    }

    if config.credential_backend.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "credential_backend".into(),
            hint: "falling back to the inert, non-persistent credential backend".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over
/// `base`.
#[must_use]
pub fn merge_configs(base: ClihostConfig, overlay: ClihostConfig) -> ClihostConfig {
    ClihostConfig {
        log_level: overlay.log_level.or(base.log_level),
        default_format: overlay.default_format.or(base.default_format),
        credential_backend: overlay.credential_backend.or(base.credential_backend),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = ClihostConfig::default();
        validate_config(&cfg).expect("default config should be valid");
    }

    #[test]
    fn default_config_has_sensible_defaults() {
        let cfg = ClihostConfig::default();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
        assert_eq!(cfg.default_format.as_deref(), Some("default"));
        assert_eq!(cfg.credential_backend.as_deref(), Some("inert"));
    }

    #[test]
    fn parse_valid_toml_string() {
        let toml_str = r#"
            log_level = "debug"
            default_format = "json"
            credential_backend = "vault"
        "#;
        let cfg = parse_toml(toml_str).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.default_format.as_deref(), Some("json"));
        assert_eq!(cfg.credential_backend.as_deref(), Some("vault"));
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let bad = "this is [not valid toml =";
        let err = parse_toml(bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn parse_wrong_types_gives_parse_error() {
        let toml_str = r#"log_level = 42"#;
        let err = parse_toml(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn validation_catches_invalid_log_level() {
        let cfg = ClihostConfig {
            log_level: Some("verbose".into()),
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn validation_catches_invalid_default_format() {
        let cfg = ClihostConfig {
            default_format: Some("xml".into()),
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn missing_credential_backend_warns_not_errors() {
        let cfg = ClihostConfig {
            credential_backend: None,
            ..Default::default()
        };
        let warnings = validate_config(&cfg).unwrap();
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ConfigWarning::MissingOptionalField { field, .. } if field == "credential_backend"))
        );
    }

    #[test]
    fn merge_overlay_overrides_base() {
        let base = ClihostConfig {
            log_level: Some("info".into()),
            ..Default::default()
        };
        let overlay = ClihostConfig {
            log_level: Some("debug".into()),
            default_format: None,
            credential_backend: None,
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert_eq!(merged.default_format.as_deref(), Some("default"));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = ClihostConfig {
            log_level: Some("debug".into()),
            default_format: Some("json".into()),
            credential_backend: Some("vault".into()),
        };
        let serialized = toml::to_string(&cfg).unwrap();
        let deserialized: ClihostConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clihost.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "log_level = \"warn\"\ndefault_format = \"json\"").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("warn"));
        assert_eq!(cfg.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/clihost.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn load_none_returns_default() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError::FileNotFound {
            path: "/foo".into(),
        };
        assert!(e.to_string().contains("/foo"));
    }

    #[test]
    fn config_warning_display() {
        let w = ConfigWarning::DeprecatedField {
            field: "old_field".into(),
            suggestion: Some("new_field".into()),
        };
        let s = w.to_string();
        assert!(s.contains("old_field"));
        assert!(s.contains("new_field"));
    }
}
