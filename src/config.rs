use serde::{Deserialize, Serialize};
use std::{env, fmt, path::PathBuf, str::FromStr};

const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_PORT: u16 = 8080;

/// How a tap on a footprint is handled.
///
/// `Editor` opens a per-slot editing context with a date field and explicit
/// colour choices, and shows the period as two year selectors under a fixed
/// caption. `Cycle` advances the colour on every tap and keeps the subtitle
/// and period as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Editor,
    Cycle,
}

impl FromStr for InteractionMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "editor" => Ok(Self::Editor),
            "cycle" => Ok(Self::Cycle),
            other => Err(ConfigError(format!(
                "TRACKER_MODE must be 'editor' or 'cycle', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub mode: InteractionMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match env::var("TRACKER_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => InteractionMode::default(),
        };

        Ok(Self {
            data_path: resolve_data_path(),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            mode,
        })
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}
