//! Layered settings: built-in defaults, an optional config file, then
//! `USDM_FHIR__*` environment variables (a `.env` file is read first).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub file_enabled: bool,

    #[serde(default = "default_file_directory")]
    pub file_directory: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// daily, hourly or never
    #[serde(default = "default_file_rotation")]
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            file_enabled: false,
            file_directory: default_file_directory(),
            file_prefix: default_file_prefix(),
            file_rotation: default_file_rotation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Profile used when the command line names none
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Extra mapping file (YAML or JSON) applied to every export
    #[serde(default)]
    pub extra: Option<PathBuf>,

    /// Sequential ids and a fixed timestamp
    #[serde(default)]
    pub deterministic: bool,

    #[serde(default = "default_true")]
    pub resolve_references: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            extra: None,
            deterministic: false,
            resolve_references: true,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_directory() -> String {
    "logs".to_string()
}

fn default_file_prefix() -> String {
    "usdm-fhir".to_string()
}

fn default_file_rotation() -> String {
    "daily".to_string()
}

fn default_profile() -> String {
    "madrid".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();

        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("USDM_FHIR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
