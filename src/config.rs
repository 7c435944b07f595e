use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{cluster, detector, recommendation, sink};
use crate::error::{AppError, AppResult};

/// Thresholds the detector classifies against.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_premium: f64,
    pub sweep_premium_threshold: f64,
    pub volume_oi_ratio: f64,
    pub min_dte: i64,
    pub max_dte: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_premium: detector::DEFAULT_MIN_PREMIUM,
            sweep_premium_threshold: detector::DEFAULT_SWEEP_PREMIUM_THRESHOLD,
            volume_oi_ratio: detector::DEFAULT_VOLUME_OI_RATIO,
            min_dte: detector::DEFAULT_MIN_DTE,
            max_dte: detector::DEFAULT_MAX_DTE,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.min_premium < 0.0 || !self.min_premium.is_finite() {
            return Err(AppError::Config(format!(
                "detector.min_premium must be a non-negative number (got {})",
                self.min_premium
            )));
        }
        if self.sweep_premium_threshold < 0.0 || !self.sweep_premium_threshold.is_finite() {
            return Err(AppError::Config(format!(
                "detector.sweep_premium_threshold must be a non-negative number (got {})",
                self.sweep_premium_threshold
            )));
        }
        if self.volume_oi_ratio <= 0.0 || !self.volume_oi_ratio.is_finite() {
            return Err(AppError::Config(format!(
                "detector.volume_oi_ratio must be positive (got {})",
                self.volume_oi_ratio
            )));
        }
        if self.min_dte < 0 || self.min_dte > self.max_dte {
            return Err(AppError::Config(format!(
                "detector DTE window [{}, {}] is invalid",
                self.min_dte, self.max_dte
            )));
        }
        Ok(())
    }
}

/// Cluster and report shaping.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// One side must outnumber the other by more than this factor to win consensus
    pub consensus_ratio: f64,
    pub max_top_strikes: usize,
    /// Tickers rendered in the report body
    pub max_report_tickers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            consensus_ratio: cluster::DEFAULT_CONSENSUS_RATIO,
            max_top_strikes: cluster::DEFAULT_MAX_TOP_STRIKES,
            max_report_tickers: recommendation::DEFAULT_MAX_REPORT_TICKERS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub signal_log_path: PathBuf,
    pub report_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            signal_log_path: PathBuf::from("data/flow_history.jsonl"),
            report_path: PathBuf::from("data/daily_analysis.txt"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub max_message_chars: usize,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            max_message_chars: sink::TELEGRAM_MAX_CHARS,
            timeout_secs: sink::TELEGRAM_TIMEOUT_SECS,
        }
    }
}

impl TelegramConfig {
    /// Both credentials present and non-empty
    pub fn is_enabled(&self) -> bool {
        matches!((&self.bot_token, &self.chat_id), (Some(t), Some(c)) if !t.is_empty() && !c.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub max_response_chars: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            max_response_chars: sink::API_MAX_CHARS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Six-field cron expression (sec min hour dom mon dow); unset disables the job
    pub analysis_cron: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
    pub telegram: TelegramConfig,
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    /// Environment overrides are applied afterwards.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_yaml(&content)?
        } else {
            tracing::warn!("⚠️ Config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.detector.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID take precedence over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty()) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty()) {
            self.telegram.chat_id = Some(chat_id);
        }
    }
}
