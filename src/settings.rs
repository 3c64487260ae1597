use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::fraud::{
    FraudConfig, DEFAULT_AMOUNT_THRESHOLD, DEFAULT_BURST_COUNT, DEFAULT_BURST_WINDOW_MINUTES,
};

pub const ENV_AMOUNT_THRESHOLD: &str = "FRAUD_AMOUNT_THRESHOLD";
pub const ENV_BURST_WINDOW_MINUTES: &str = "FRAUD_BURST_WINDOW_MINUTES";
pub const ENV_BURST_COUNT: &str = "FRAUD_BURST_TXN_COUNT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub fraud: FraudSettings,
}

/// Raw fraud rule values as stored on disk. Validated into a
/// [`FraudConfig`] by [`Settings::fraud_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudSettings {
    #[serde(default = "default_amount_threshold")]
    pub amount_threshold: Decimal,
    #[serde(default = "default_burst_window_minutes")]
    pub burst_window_minutes: i64,
    #[serde(default = "default_burst_count")]
    pub burst_count: usize,
}

fn default_amount_threshold() -> Decimal {
    Decimal::from(DEFAULT_AMOUNT_THRESHOLD)
}

fn default_burst_window_minutes() -> i64 {
    DEFAULT_BURST_WINDOW_MINUTES
}

fn default_burst_count() -> usize {
    DEFAULT_BURST_COUNT
}

impl Default for FraudSettings {
    fn default() -> Self {
        Self {
            amount_threshold: default_amount_threshold(),
            burst_window_minutes: default_burst_window_minutes(),
            burst_count: default_burst_count(),
        }
    }
}

impl FraudSettings {
    /// Apply `FRAUD_*` overrides from `lookup`. Unset variables leave the
    /// stored value alone; unparsable ones are an error.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_AMOUNT_THRESHOLD) {
            self.amount_threshold = parse_override(ENV_AMOUNT_THRESHOLD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BURST_WINDOW_MINUTES) {
            self.burst_window_minutes = parse_override(ENV_BURST_WINDOW_MINUTES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BURST_COUNT) {
            self.burst_count = parse_override(ENV_BURST_COUNT, &raw)?;
        }
        Ok(())
    }
}

fn parse_override<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| LedgerError::Settings(format!("{name}={raw:?}: {e}")))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            fraud: FraudSettings::default(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("fintrack.db")
    }

    pub fn exports_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("exports")
    }

    /// Resolve the fraud rules for this process: file values, then
    /// environment overrides, then validation.
    pub fn fraud_config(&self) -> Result<FraudConfig> {
        let mut fraud = self.fraud.clone();
        fraud.apply_overrides(|name| std::env::var(name).ok())?;
        FraudConfig::from_minutes(
            fraud.amount_threshold,
            fraud.burst_window_minutes,
            fraud.burst_count,
        )
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fintrack")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("fintrack")
}

/// Settings from `~/.config/fintrack/settings.json`, or the defaults when no
/// file has been written yet. A file that exists but cannot be read or parsed
/// is an error, never a silent fallback to the default rules.
pub fn load_settings() -> Result<Settings> {
    read_settings(&settings_path())
}

fn read_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| LedgerError::Settings(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| LedgerError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
