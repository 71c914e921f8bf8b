//! Application settings from `fincalc.toml`.
//!
//! Precedence: command-line flags, then the config file, then built-in
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fincalc.toml";

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Tax year used when `--year` is not given.
    pub default_year: Option<i32>,
    /// Directory holding `brackets.csv` and `rules.toml`; the embedded data
    /// is used when unset.
    pub data_dir: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// Print JSON instead of text.
    pub json: bool,
}

impl AppConfig {
    pub fn from_toml(
        source: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The file to read: `explicit` if given, otherwise
    /// [`DEFAULT_CONFIG_FILE`] when it exists in the working directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.is_file().then_some(path)
            }
        }
    }

    /// Reads `path`, or returns the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source, path)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Settings after applying command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub year: Option<i32>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
}

impl Settings {
    pub fn resolve(
        config: &AppConfig,
        year: Option<i32>,
        data_dir: Option<PathBuf>,
        json: bool,
    ) -> Self {
        Self {
            year: year.or(config.default_year),
            data_dir: data_dir.or_else(|| config.data_dir.clone()),
            json: json || config.json,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_toml_reads_every_key() {
        let source = r#"
default_year = 2024
data_dir = "/srv/fincalc"
log_level = "debug"
json = true
"#;

        let config = AppConfig::from_toml(source, Path::new("fincalc.toml")).unwrap();

        assert_eq!(
            config,
            AppConfig {
                default_year: Some(2024),
                data_dir: Some(PathBuf::from("/srv/fincalc")),
                log_level: Some("debug".to_string()),
                json: true,
            }
        );
    }

    #[test]
    fn from_toml_empty_is_default() {
        let config = AppConfig::from_toml("", Path::new("fincalc.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn from_toml_rejects_unknown_key() {
        let result = AppConfig::from_toml("colour = true", Path::new("fincalc.toml"));

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/fincalc.toml")));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn locate_prefers_explicit_path() {
        let explicit = Path::new("/etc/fincalc/custom.toml");

        assert_eq!(AppConfig::locate(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let config = AppConfig {
            default_year: Some(2024),
            data_dir: Some(PathBuf::from("/srv/fincalc")),
            log_level: None,
            json: false,
        };

        let settings = Settings::resolve(&config, Some(2026), None, true);

        assert_eq!(settings.year, Some(2026));
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/fincalc")));
        assert!(settings.json);
    }

    #[test]
    fn config_fills_missing_flags() {
        let config = AppConfig {
            default_year: Some(2024),
            ..AppConfig::default()
        };

        let settings = Settings::resolve(&config, None, None, false);

        assert_eq!(settings.year, Some(2024));
        assert_eq!(settings.data_dir, None);
    }
}
