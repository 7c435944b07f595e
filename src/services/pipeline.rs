//! Batch driver: feed in, signals logged, daily report out.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::constants::events;
use crate::data::feed::FeedRead;
use crate::data::store::SignalLog;
use crate::error::{AppResult, FlowError};
use crate::flow::report::{self, Report};
use crate::flow::scorer;
use crate::flow::types::Signal;
use crate::flow::{SignalDetector, TickerCluster};
use crate::services::notifier::{self, NotificationSink};

/// Counts and outputs of one scan.
#[derive(Clone, Debug, Default)]
pub struct ScanSummary {
    pub processed: usize,
    pub signals: Vec<Signal>,
    pub discarded: usize,
    pub errors: Vec<FlowError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoredSignal {
    pub score: f64,
    #[serde(flatten)]
    pub signal: Signal,
}

/// Outcome of a daily analysis.
#[derive(Clone, Debug)]
pub struct AnalysisRun {
    pub report: Report,
    pub saved_to: PathBuf,
    /// Log lines that could not be read
    pub skipped_lines: usize,
    /// Delivery failures; the report file is written regardless
    pub warnings: Vec<FlowError>,
}

pub struct FlowPipeline {
    config: AppConfig,
    detector: SignalDetector,
    log: SignalLog,
    sink: Arc<dyn NotificationSink>,
}

impl FlowPipeline {
    pub fn new(config: AppConfig) -> Self {
        let sink: Arc<dyn NotificationSink> = Arc::from(notifier::build_sink(&config.telegram));
        Self::with_sink(config, sink)
    }

    pub fn with_sink(config: AppConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            detector: SignalDetector::new(config.detector.clone()),
            log: SignalLog::new(config.storage.signal_log_path.clone()),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn log(&self) -> &SignalLog {
        &self.log
    }

    /// Detect over a feed and append every signal to the log.
    pub fn scan(&self, feed: FeedRead, as_of: NaiveDate, at: NaiveDateTime) -> AppResult<ScanSummary> {
        let feed_errors = feed.errors;
        let batch = self.detector.detect_batch(feed.records, as_of, at);

        self.log.append_all(&batch.signals)?;
        if !batch.signals.is_empty() {
            info!(
                event = events::SIGNAL_LOGGED,
                "📝 [DETECT] Logged {} signal(s) to {}",
                batch.signals.len(),
                self.log.path().display()
            );
        }

        let processed = batch.processed() + feed_errors.len();
        let mut errors = feed_errors;
        errors.extend(batch.errors);

        info!(
            "🔍 [DETECT] Scan complete: {} processed, {} signals, {} discarded, {} errors",
            processed,
            batch.signals.len(),
            batch.discarded,
            errors.len()
        );

        Ok(ScanSummary {
            processed,
            signals: batch.signals,
            discarded: batch.discarded,
            errors,
        })
    }

    /// Detect and score without touching the log. Highest score first.
    pub fn score_only(&self, feed: FeedRead, as_of: NaiveDate, at: NaiveDateTime) -> (Vec<ScoredSignal>, Vec<FlowError>) {
        let batch = self.detector.detect_batch(feed.records, as_of, at);
        let mut scored: Vec<ScoredSignal> = batch
            .signals
            .into_iter()
            .map(|signal| ScoredSignal {
                score: scorer::score(&signal),
                signal,
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut errors = feed.errors;
        errors.extend(batch.errors);
        (scored, errors)
    }

    /// Build the report for `date` from the log. Returns it with the count of unreadable lines.
    pub fn build_report(&self, date: NaiveDate) -> AppResult<(Report, usize)> {
        let read = self.log.read_for_day(date)?;
        let report = report::analyze(&read.signals, date, &self.config.analysis);
        Ok((report, read.skipped_lines.len()))
    }

    pub fn clusters_for(&self, date: NaiveDate) -> AppResult<Vec<TickerCluster>> {
        Ok(self.build_report(date)?.0.clusters)
    }

    /// Build, save and optionally deliver the report for `date`.
    pub async fn analyze_day(&self, date: NaiveDate, notify: bool) -> AppResult<AnalysisRun> {
        let (report, skipped_lines) = self.build_report(date)?;

        let saved_to = self.config.storage.report_path.clone();
        if let Some(parent) = saved_to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&saved_to, &report.text)?;
        info!(
            event = events::REPORT_SAVED,
            "📊 [ANALYZE] {} ticker(s), {} signal(s) for {} saved to {}",
            report.clusters.len(),
            report.total_signals,
            date,
            saved_to.display()
        );

        let warnings = if notify {
            notifier::deliver(self.sink.as_ref(), &report.text).await
        } else {
            Vec::new()
        };
        if !warnings.is_empty() {
            warn!("⚠️ [ANALYZE] Report saved but {} delivery failure(s)", warnings.len());
        }

        Ok(AnalysisRun {
            report,
            saved_to,
            skipped_lines,
            warnings,
        })
    }

    /// Text of the last saved report, if any.
    pub fn latest_report_text(&self) -> AppResult<Option<String>> {
        let path = &self.config.storage.report_path;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }
}
