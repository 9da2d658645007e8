//! Configuration for cardiorisk.
//!
//! Layered with figment: built-in defaults, then the user config file, then
//! the workspace config file, then an explicit file, then `CARDIORISK_*`
//! environment variables, then command-line overrides.

use crate::error::ConfigError;
use crate::i18n::Locale;
use crate::model::DEFAULT_MODEL_FILE;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name for workspace-level configuration.
pub const WORKSPACE_CONFIG_DIR: &str = ".cardiorisk";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardioConfig {
    pub model: ModelConfig,
    pub ui: UiConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Artifact path. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub locale: Locale,
    /// ANSI colors in terminal output.
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            color: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
        }
    }
}

impl GatewayConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub model_path: Option<PathBuf>,
    pub locale: Option<Locale>,
    pub color: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl CardioConfig {
    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// User-level config file, e.g. `~/.config/cardiorisk/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "cardiorisk", "cardiorisk")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration by merging every layer.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<CardioConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(CardioConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(WORKSPACE_CONFIG_DIR).join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(file) = explicit {
        if !file.exists() {
            return Err(ConfigError::MissingFile {
                path: file.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(file));
    }

    // CARDIORISK_MODEL__PATH, CARDIORISK_UI__LOCALE, CARDIORISK_GATEWAY__PORT, ...
    figment = figment.merge(Env::prefixed("CARDIORISK_").split("__"));

    if let Some(path) = &overrides.model_path {
        figment = figment.merge(Serialized::default("model.path", path));
    }
    if let Some(locale) = overrides.locale {
        figment = figment.merge(Serialized::default("ui.locale", locale));
    }
    if let Some(color) = overrides.color {
        figment = figment.merge(Serialized::default("ui.color", color));
    }
    if let Some(host) = &overrides.host {
        figment = figment.merge(Serialized::default("gateway.host", host));
    }
    if let Some(port) = overrides.port {
        figment = figment.merge(Serialized::default("gateway.port", port));
    }

    figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
}
