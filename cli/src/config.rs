//! Configuration loader with multi-source merging.

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Script-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Directory holding the demo scripts.
    pub dir: PathBuf,
    /// Install the namespace lock before running the guarded phase.
    pub locked: bool,
    /// Names scripts may still write while the lock is armed.
    pub allow_globals: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("scripts"),
            locked: true,
            allow_globals: vec!["out_vec".to_string()],
        }
    }
}

/// Output-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored output.
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scripts: ScriptsConfig,
    pub output: OutputConfig,
}

/// Configuration loader that merges multiple sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./luagate.toml` or `./.luagate.toml`
    /// 3. `~/.config/luagate/config.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<AppConfig, figment::Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            figment = figment.merge(Toml::file(&global_path));
        }

        for filename in &["luagate.toml", ".luagate.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract()
    }

    /// Load only default configuration (for --no-config).
    pub fn load_defaults() -> AppConfig {
        AppConfig::default()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("luagate").join("config.toml"))
            .filter(|path| path.exists())
    }
}
