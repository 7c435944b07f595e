//! Outbound report delivery.
//!
//! Sinks accept arbitrary UTF-8 text. Long reports are split into
//! line-aligned chunks that fit the sink's message budget. Delivery failures
//! are logged and returned as warnings; nothing here retries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::TelegramConfig;
use crate::constants::{events, sink};
use crate::error::FlowError;
use crate::flow::report::chunk;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Largest message the sink accepts, in characters
    fn max_message_chars(&self) -> usize;

    async fn send(&self, text: &str) -> Result<(), FlowError>;
}

/// Telegram Bot API `sendMessage`.
pub struct TelegramSink {
    client: Client,
    bot_token: String,
    chat_id: String,
    max_chars: usize,
    base_url: String,
}

impl TelegramSink {
    pub fn new(bot_token: String, chat_id: String, config: &TelegramConfig) -> Result<Self, FlowError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FlowError::sink("telegram", format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bot_token,
            chat_id,
            max_chars: config.max_message_chars,
            base_url: "https://api.telegram.org".to_string(),
        })
    }

    /// Point at a different API host (local bot API server, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url.trim_end_matches('/'), self.bot_token)
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn max_message_chars(&self) -> usize {
        self.max_chars
    }

    async fn send(&self, text: &str) -> Result<(), FlowError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| FlowError::sink(self.name(), format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FlowError::sink(self.name(), format!("HTTP {}: {}", status, body)));
        }
        Ok(())
    }
}

/// Writes to the log instead of a chat. Used when no credentials are configured.
pub struct ConsoleSink {
    max_chars: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            max_chars: sink::TELEGRAM_MAX_CHARS,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn max_message_chars(&self) -> usize {
        self.max_chars
    }

    async fn send(&self, text: &str) -> Result<(), FlowError> {
        info!("📨 [NOTIFY] (console)\n{}", text);
        Ok(())
    }
}

/// Pick the sink the config asks for.
pub fn build_sink(config: &TelegramConfig) -> Box<dyn NotificationSink> {
    match (&config.bot_token, &config.chat_id) {
        (Some(token), Some(chat)) if config.is_enabled() => {
            match TelegramSink::new(token.clone(), chat.clone(), config) {
                Ok(sink) => return Box::new(sink),
                Err(e) => warn!("⚠️ [NOTIFY] {}; falling back to console", e),
            }
        }
        _ => info!("ℹ️ [NOTIFY] Telegram not configured - reports go to the console"),
    }
    Box::new(ConsoleSink::new())
}

/// Send `text` in as many chunks as the sink needs. Returns one warning per
/// failed chunk; a failure does not stop later chunks.
pub async fn deliver(sink: &dyn NotificationSink, text: &str) -> Vec<FlowError> {
    let chunks = chunk(text, sink.max_message_chars());
    let total = chunks.len();
    let mut warnings = Vec::new();

    for (i, part) in chunks.iter().enumerate() {
        match sink.send(part).await {
            Ok(()) => info!(
                event = events::REPORT_DELIVERED,
                "✅ [NOTIFY] Sent part {}/{} via {}",
                i + 1,
                total,
                sink.name()
            ),
            Err(e) => {
                warn!(event = events::SINK_FAILED, "⚠️ [NOTIFY] Part {}/{}: {}", i + 1, total, e);
                warnings.push(e);
            }
        }
    }
    warnings
}
