use std::{env, path::PathBuf};

use color_eyre::Result;
use lazy_static::lazy_static;
use serde::Deserialize;

/// Defaults compiled into the binary; overridable by a user config file and
/// `DATAPILOT_`-prefixed environment variables.
const CONFIG: &str = include_str!("../.config/config.json5");

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Base URL of the analytics backend. Every operation resolves against
    /// this single endpoint.
    pub base_url: String,
    /// Row count requested by the preview action.
    pub preview_rows: u32,
}

impl Default for Config {
    fn default() -> Self {
        json5::from_str(CONFIG).expect("embedded default config must parse")
    }
}

impl Config {
    /// Load configuration in layers: embedded defaults, then an optional
    /// config file, then environment overrides.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let defaults = Config::default();
        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("preview_rows", defaults.preview_rows as i64)?;

        let selected_path = config_path.cloned().or_else(default_config_path);
        if let Some(path) = selected_path {
            if path.exists() {
                builder = builder.add_source(
                    config::File::from(path)
                        .format(config::FileFormat::Json5)
                        .required(false),
                );
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&PROJECT_NAME).separator("__"),
        );

        builder.build()?.try_deserialize()
    }
}

/// Default user config location: `$DATAPILOT_CONFIG/config.json5` when the
/// env var is set, else `~/.datapilot/config.json5`.
fn default_config_path() -> Option<PathBuf> {
    if let Some(folder) = CONFIG_FOLDER.clone() {
        return Some(folder.join("config.json5"));
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".datapilot").join("config.json5"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_from_path_without_file_yields_defaults() {
        let missing = PathBuf::from("/nonexistent/datapilot/config.json5");
        let config = Config::from_path(Some(&missing)).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
    }
}
