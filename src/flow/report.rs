use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;

use crate::config::AnalysisConfig;
use crate::constants::sink::{NO_FLOW_MESSAGE, TRUNCATION_MARKER};
use crate::flow::aggregator::{Consensus, TickerAggregator, TickerCluster};
use crate::flow::recommendation::Recommendation;
use crate::flow::types::Signal;

const RULE_HEAVY: &str = "==================================================";
const RULE_LIGHT: &str = "--------------------------------------------------";

/// Ranked clusters for one analysis date plus the rendered text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub date: NaiveDate,
    pub clusters: Vec<TickerCluster>,
    pub recommendations: Vec<Recommendation>,
    pub total_signals: usize,
    pub total_premium: f64,
    pub text: String,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Aggregate, rank and render a day's signals. Pure: the same signals and
/// date always render the same text.
pub fn analyze(signals: &[Signal], date: NaiveDate, config: &AnalysisConfig) -> Report {
    let clusters = TickerAggregator::new(config).aggregate_all(signals);
    let recommendations: Vec<Recommendation> = clusters.iter().map(Recommendation::from_cluster).collect();
    let text = render(&clusters, &recommendations, date, config.max_report_tickers);

    Report {
        date,
        total_signals: clusters.iter().map(|c| c.signal_count).sum(),
        total_premium: clusters.iter().map(|c| c.total_premium).sum(),
        clusters,
        recommendations,
        text,
    }
}

fn render(
    clusters: &[TickerCluster],
    recommendations: &[Recommendation],
    date: NaiveDate,
    max_tickers: usize,
) -> String {
    if clusters.is_empty() {
        return NO_FLOW_MESSAGE.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "[OPTIONS FLOW] Daily Recommendation Report");
    let _ = writeln!(out, "Date: {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "Total tickers with flow: {}", clusters.len());
    let _ = writeln!(out, "{}", RULE_HEAVY);
    out.push('\n');

    for (i, (cluster, rec)) in clusters.iter().zip(recommendations).take(max_tickers).enumerate() {
        render_ticker(&mut out, i + 1, cluster, rec);
    }

    let total_premium: f64 = clusters.iter().map(|c| c.total_premium).sum();
    let total_signals: usize = clusters.iter().map(|c| c.signal_count).sum();
    let _ = writeln!(out, "SUMMARY:");
    let _ = writeln!(out, "Total Flow Premium: ${:.1}M", total_premium / 1_000_000.0);
    let _ = writeln!(out, "Total Signals: {}", total_signals);
    let _ = writeln!(out, "Top {} plays shown above", max_tickers.min(clusters.len()));
    out
}

fn render_ticker(out: &mut String, rank: usize, cluster: &TickerCluster, rec: &Recommendation) {
    let _ = writeln!(
        out,
        "#{} {} - {} ({} {})",
        rank,
        cluster.ticker,
        cluster.consensus,
        rec.tier,
        rec.tier.emoji()
    );
    let _ = writeln!(out, "Conviction Score: {:.1}/100", cluster.conviction_score);
    let _ = writeln!(out, "Stock Price: ${:.2}", cluster.underlying_price);
    let _ = writeln!(
        out,
        "Total Premium: ${:.0}K ({} signals)",
        cluster.total_premium / 1000.0,
        cluster.signal_count
    );

    if cluster.golden_sweeps > 0 {
        let _ = writeln!(out, "  • {} Golden Sweep(s)", cluster.golden_sweeps);
    }
    if cluster.unusual_volume > 0 {
        let _ = writeln!(out, "  • {} Unusual Volume", cluster.unusual_volume);
    }
    if cluster.large_blocks > 0 {
        let _ = writeln!(out, "  • {} Large Block(s)", cluster.large_blocks);
    }

    if cluster.consensus == Consensus::Mixed {
        let _ = writeln!(
            out,
            "Direction: Bullish {} | Bearish {}",
            cluster.bullish_count, cluster.bearish_count
        );
    }

    if !cluster.top_strikes.is_empty() {
        let strikes: Vec<String> = cluster
            .top_strikes
            .iter()
            .map(|s| format!("${:.0} {} ({}d)", s.strike, s.action, s.dte))
            .collect();
        let _ = writeln!(out, "Key Strikes: {}", strikes.join(", "));
    }

    let _ = writeln!(out, "{}", rec.render(cluster));
    let _ = writeln!(out, "{}", RULE_LIGHT);
    out.push('\n');
}

/// Cut `text` to at most `max_chars` characters, marking the cut. Lossy.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    let byte_at = |n: usize| text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(text.len());
    if max_chars <= marker_len {
        return text[..byte_at(max_chars)].to_string();
    }
    format!("{}{}", &text[..byte_at(max_chars - marker_len)], TRUNCATION_MARKER)
}

/// Split into line-aligned chunks of at most `max_chars` characters. A single
/// line longer than the budget is truncated into its own chunk.
pub fn chunk(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line = if line.chars().count() + 1 > max_chars {
            truncate(line, max_chars.saturating_sub(1))
        } else {
            line.to_string()
        };
        let line_len = line.chars().count() + 1;

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&line);
        current.push('\n');
        current_len += line_len;
    }

    let trimmed = current.trim_end();
    if !trimmed.is_empty() {
        chunks.push(current);
    }
    chunks
}
