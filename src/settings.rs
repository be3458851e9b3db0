use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_result_file")]
    pub result_file: String,
    #[serde(default = "default_log_file")]
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_result_file() -> String {
    crate::pipeline::DEFAULT_RESULT_FILE.to_string()
}

fn default_log_file() -> Option<String> {
    Some(
        config_dir()
            .join("spendpivot.log")
            .to_string_lossy()
            .to_string(),
    )
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            result_file: default_result_file(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn delimiter_byte(&self) -> Result<u8> {
        parse_delimiter(&self.delimiter)
    }
}

/// A delimiter must be exactly one ASCII character.
pub fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(PivotError::Settings(format!(
            "delimiter must be a single ASCII character, got {raw:?}"
        ))),
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendpivot")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    settings.delimiter_byte()?;
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PivotError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}
