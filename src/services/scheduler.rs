//! Cron-driven end-of-day analysis.

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::services::pipeline::FlowPipeline;

pub struct AnalysisScheduler {
    pipeline: Arc<FlowPipeline>,
    cron_expression: String,
}

impl AnalysisScheduler {
    /// # Arguments
    /// * `cron_expression` - six-field cron (e.g. "0 15 16 * * Mon-Fri" for 16:15 on weekdays)
    pub fn new(pipeline: Arc<FlowPipeline>, cron_expression: impl Into<String>) -> Self {
        Self {
            pipeline,
            cron_expression: cron_expression.into(),
        }
    }

    pub fn cron_expression(&self) -> &str {
        &self.cron_expression
    }

    /// Register the job and start the scheduler. The returned scheduler must
    /// be kept alive for the job to keep firing.
    pub async fn start(&self) -> AppResult<JobScheduler> {
        let scheduler = JobScheduler::new().await?;
        let pipeline = self.pipeline.clone();

        let job = Job::new_async(self.cron_expression.as_str(), move |_uuid, _l| {
            let pipeline = pipeline.clone();

            Box::pin(async move {
                let today = Local::now().date_naive();
                match pipeline.analyze_day(today, true).await {
                    Ok(run) if run.warnings.is_empty() => info!(
                        "✅ [SCHEDULE] Analysis for {} done ({} tickers)",
                        today,
                        run.report.clusters.len()
                    ),
                    Ok(run) => warn!(
                        "⚠️ [SCHEDULE] Analysis for {} saved with {} delivery warning(s)",
                        today,
                        run.warnings.len()
                    ),
                    Err(e) => error!("❌ [SCHEDULE] Analysis for {} failed: {}", today, e),
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("🔔 [SCHEDULE] Daily analysis scheduled: {}", self.cron_expression);
        Ok(scheduler)
    }
}

/// Start the scheduler when configured and park it on a background task.
pub async fn spawn_if_configured(pipeline: Arc<FlowPipeline>) -> AppResult<bool> {
    let Some(cron) = pipeline.config().schedule.analysis_cron.clone() else {
        info!("ℹ️ [SCHEDULE] schedule.analysis_cron not set - scheduled analysis disabled");
        return Ok(false);
    };

    let scheduler = AnalysisScheduler::new(pipeline, cron).start().await?;
    tokio::spawn(async move {
        let _scheduler = scheduler;
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    });
    Ok(true)
}
