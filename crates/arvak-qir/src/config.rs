//! Configuration for QIR generation.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `ARVAK_QIR_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QirError, QirResult};
use crate::generator::TranslateOptions;
use crate::profile::Profile;

/// Environment variable selecting the profile.
pub const ENV_PROFILE: &str = "ARVAK_QIR_PROFILE";
/// Environment variable naming the entry point.
pub const ENV_ENTRY_POINT: &str = "ARVAK_QIR_ENTRY_POINT";
/// Environment variable naming the module.
pub const ENV_MODULE_NAME: &str = "ARVAK_QIR_MODULE_NAME";
/// Environment variable toggling module flags.
pub const ENV_MODULE_FLAGS: &str = "ARVAK_QIR_MODULE_FLAGS";

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QirConfig {
    /// Profile name: "Base" or "AdaptiveProfileExecution"
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Entry-point function name
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Module identifier (defaults to the program name)
    #[serde(default)]
    pub module_name: Option<String>,

    /// Emit `!llvm.module.flags`
    #[serde(default = "default_true")]
    pub emit_module_flags: bool,
}

// Default value functions
fn default_profile() -> String {
    Profile::default().as_str().to_string()
}

fn default_entry_point() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for QirConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            entry_point: default_entry_point(),
            module_name: None,
            emit_module_flags: true,
        }
    }
}

impl QirConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QirResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QirError::Config(format!("{}: {e}", path.display())))?;
        let config: QirConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| QirError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        debug!("Loaded QIR configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> QirResult<Self> {
        Self::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> QirResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables that are set override existing values.
    pub fn merge_env(self) -> QirResult<Self> {
        self.merge_from(|key| std::env::var(key).ok())
    }

    fn merge_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> QirResult<Self> {
        if let Some(v) = lookup(ENV_PROFILE) {
            self.profile = v;
        }
        if let Some(v) = lookup(ENV_ENTRY_POINT) {
            self.entry_point = v;
        }
        if let Some(v) = lookup(ENV_MODULE_NAME) {
            self.module_name = Some(v);
        }
        if let Some(v) = lookup(ENV_MODULE_FLAGS) {
            self.emit_module_flags = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(QirError::Config(format!(
                        "{ENV_MODULE_FLAGS} must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> QirResult<()> {
        self.options().map(|_| ())
    }

    /// Convert to translation options.
    ///
    /// An unrecognized profile is [`QirError::InvalidProfile`]; a bad entry
    /// point name is [`QirError::Config`].
    pub fn options(&self) -> QirResult<TranslateOptions> {
        let profile: Profile = self.profile.parse()?;
        let options = TranslateOptions {
            profile,
            entry_point: self.entry_point.clone(),
            module_name: self.module_name.clone(),
            emit_module_flags: self.emit_module_flags,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = QirConfig::default();
        assert_eq!(config.profile, "AdaptiveProfileExecution");
        assert_eq!(config.entry_point, "main");
        assert!(config.emit_module_flags);

        let options = config.options().unwrap();
        assert_eq!(options, TranslateOptions::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile: Base\nentry_point: run\nemit_module_flags: false").unwrap();

        let config = QirConfig::from_file(file.path()).unwrap();
        assert_eq!(config.profile, "Base");
        assert_eq!(config.entry_point, "run");
        assert_eq!(config.module_name, None);

        let options = config.options().unwrap();
        assert_eq!(options.profile, Profile::Base);
        assert!(!options.emit_module_flags);
    }

    #[test]
    fn test_from_file_partial_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "module_name: teleport").unwrap();

        let config = QirConfig::from_file(file.path()).unwrap();
        assert_eq!(config.profile, "AdaptiveProfileExecution");
        assert_eq!(config.module_name.as_deref(), Some("teleport"));
    }

    #[test]
    fn test_from_file_invalid_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile: Full").unwrap();

        match QirConfig::from_file(file.path()) {
            Err(QirError::InvalidProfile(name)) => assert_eq!(name, "Full"),
            other => panic!("expected InvalidProfile, got {other:?}"),
        }
    }

    #[test]
    fn test_from_file_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            QirConfig::from_file(dir.path().join("absent.yaml")),
            Err(QirError::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "emit_module_flags: [not, a, bool]").unwrap();
        assert!(matches!(
            QirConfig::from_file(file.path()),
            Err(QirError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env = |key: &str| match key {
            ENV_PROFILE => Some("base_profile".to_string()),
            ENV_MODULE_FLAGS => Some("off".to_string()),
            _ => None,
        };
        let config = QirConfig::default().merge_from(env).unwrap();
        assert_eq!(config.profile, "base_profile");
        assert_eq!(config.entry_point, "main");
        assert!(!config.emit_module_flags);
        assert_eq!(config.options().unwrap().profile, Profile::Base);
    }

    #[test]
    fn test_env_bad_boolean() {
        let env = |key: &str| (key == ENV_MODULE_FLAGS).then(|| "maybe".to_string());
        assert!(matches!(
            QirConfig::default().merge_from(env),
            Err(QirError::Config(_))
        ));
    }

    #[test]
    fn test_validate_entry_point() {
        let config = QirConfig {
            entry_point: String::new(),
            ..QirConfig::default()
        };
        assert!(matches!(config.validate(), Err(QirError::Config(_))));
    }
}
