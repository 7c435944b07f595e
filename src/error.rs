//! Custom error types for the flow screener
//!
//! `FlowError` is the closed set of per-item failures a batch can hit. It never
//! aborts a run: callers collect it into the run summary and move on.
//! `AppError` covers run-level failures (config, disk, network setup).

use thiserror::Error;

/// Per-item failures surfaced alongside results
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Parse error{}: {reason}", ticker.as_ref().map(|t| format!(" for {}", t)).unwrap_or_default())]
    Parse {
        ticker: Option<String>,
        reason: String,
    },

    #[error("Threshold unmet for {ticker}: {reason}")]
    ThresholdUnmet { ticker: String, reason: String },

    #[error("Sink {sink} unavailable: {reason}")]
    SinkUnavailable { sink: String, reason: String },
}

impl FlowError {
    pub fn parse(ticker: Option<&str>, reason: impl Into<String>) -> Self {
        FlowError::Parse {
            ticker: ticker.map(|t| t.to_string()),
            reason: reason.into(),
        }
    }

    pub fn threshold(ticker: &str, reason: impl Into<String>) -> Self {
        FlowError::ThresholdUnmet {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    pub fn sink(sink: &str, reason: impl Into<String>) -> Self {
        FlowError::SinkUnavailable {
            sink: sink.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FlowError::Parse { .. })
    }
}

/// Run-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for AppError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        AppError::Scheduler(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
