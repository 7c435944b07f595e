//! Per-ticker clustering of the day's signals into a conviction score.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::config::AnalysisConfig;
use crate::constants::cluster::{BASE_MULTIPLIER, MIXED_CONVICTION, MULTIPLIER_TIERS};
use crate::flow::scorer;
use crate::flow::types::{Direction, OptionType, Signal, SignalType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Consensus {
    Bullish,
    Bearish,
    Mixed,
}

impl fmt::Display for Consensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consensus::Bullish => write!(f, "BULLISH"),
            Consensus::Bearish => write!(f, "BEARISH"),
            Consensus::Mixed => write!(f, "MIXED"),
        }
    }
}

/// Trade implied by a (direction, option type) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StrikeAction {
    BuyCall,
    SellPut,
    SellCall,
    BuyPut,
}

impl StrikeAction {
    pub fn from_pair(direction: Direction, option_type: OptionType) -> Self {
        match (direction, option_type) {
            (Direction::Bullish, OptionType::Call) => StrikeAction::BuyCall,
            (Direction::Bullish, OptionType::Put) => StrikeAction::SellPut,
            (Direction::Bearish, OptionType::Call) => StrikeAction::SellCall,
            (Direction::Bearish, OptionType::Put) => StrikeAction::BuyPut,
        }
    }
}

impl fmt::Display for StrikeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrikeAction::BuyCall => "Buy Call",
            StrikeAction::SellPut => "Sell Put",
            StrikeAction::SellCall => "Sell Call",
            StrikeAction::BuyPut => "Buy Put",
        };
        f.write_str(label)
    }
}

/// One of the most-traded strikes in a cluster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrikeFocus {
    pub strike: f64,
    pub count: usize,
    pub action: StrikeAction,
    /// Most common DTE at this strike
    pub dte: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickerCluster {
    pub ticker: String,
    pub consensus: Consensus,
    pub conviction: f64,
    pub avg_score: f64,
    pub cluster_multiplier: f64,
    pub conviction_score: f64,
    pub total_premium: f64,
    pub signal_count: usize,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub golden_sweeps: usize,
    pub unusual_volume: usize,
    pub large_blocks: usize,
    pub top_strikes: Vec<StrikeFocus>,
    pub underlying_price: f64,
    pub avg_dte: Option<i64>,
}

/// Multiple signals on one name compound conviction
pub fn cluster_multiplier(signal_count: usize) -> f64 {
    MULTIPLIER_TIERS
        .iter()
        .find(|(min, _)| signal_count >= *min)
        .map(|(_, m)| *m)
        .unwrap_or(BASE_MULTIPLIER)
}

/// Consensus and conviction fraction for a direction split.
pub fn consensus_for(bullish: usize, bearish: usize, ratio: f64) -> (Consensus, f64) {
    let total = bullish + bearish;
    let fraction = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };

    if bullish as f64 > bearish as f64 * ratio {
        (Consensus::Bullish, fraction(bullish))
    } else if bearish as f64 > bullish as f64 * ratio {
        (Consensus::Bearish, fraction(bearish))
    } else {
        (Consensus::Mixed, MIXED_CONVICTION)
    }
}

#[derive(Clone, Debug)]
pub struct TickerAggregator {
    consensus_ratio: f64,
    max_top_strikes: usize,
}

impl TickerAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            consensus_ratio: config.consensus_ratio,
            max_top_strikes: config.max_top_strikes,
        }
    }

    /// Cluster every signal for one ticker.
    pub fn aggregate(&self, ticker: &str, signals: &[&Signal]) -> TickerCluster {
        let signal_count = signals.len();
        let avg_score = if signal_count == 0 {
            0.0
        } else {
            signals.iter().map(|s| scorer::score(s)).sum::<f64>() / signal_count as f64
        };

        let bullish_count = signals.iter().filter(|s| s.direction == Direction::Bullish).count();
        let bearish_count = signal_count - bullish_count;
        let (consensus, conviction) = consensus_for(bullish_count, bearish_count, self.consensus_ratio);

        let multiplier = cluster_multiplier(signal_count);
        let count_of = |t: SignalType| signals.iter().filter(|s| s.signal_type == t).count();

        let avg_dte = if signal_count == 0 {
            None
        } else {
            Some(signals.iter().map(|s| s.dte).sum::<i64>() / signal_count as i64)
        };

        TickerCluster {
            ticker: ticker.to_string(),
            consensus,
            conviction,
            avg_score,
            cluster_multiplier: multiplier,
            conviction_score: avg_score * conviction * multiplier,
            total_premium: signals.iter().map(|s| s.premium).sum(),
            signal_count,
            bullish_count,
            bearish_count,
            golden_sweeps: count_of(SignalType::GoldenSweep),
            unusual_volume: count_of(SignalType::UnusualVolume),
            large_blocks: count_of(SignalType::LargeBlock),
            top_strikes: self.top_strikes(signals),
            underlying_price: signals.first().map(|s| s.underlying_price).unwrap_or(0.0),
            avg_dte,
        }
    }

    /// Group by ticker (first-seen order), aggregate, and rank by
    /// conviction score. The sort is stable so equal scores keep
    /// first-seen order and reruns are byte-identical.
    pub fn aggregate_all(&self, signals: &[Signal]) -> Vec<TickerCluster> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&Signal>> = HashMap::new();

        for signal in signals {
            let group = groups.entry(signal.ticker.as_str()).or_insert_with(|| {
                order.push(signal.ticker.as_str());
                Vec::new()
            });
            group.push(signal);
        }

        let mut clusters: Vec<TickerCluster> = order
            .into_iter()
            .map(|ticker| self.aggregate(ticker, &groups[ticker]))
            .collect();

        clusters.sort_by(|a, b| b.conviction_score.total_cmp(&a.conviction_score));
        clusters
    }

    fn top_strikes(&self, signals: &[&Signal]) -> Vec<StrikeFocus> {
        // (strike, signals at strike) in first-seen order
        let mut by_strike: Vec<(f64, Vec<&Signal>)> = Vec::new();
        for signal in signals {
            match by_strike.iter_mut().find(|(strike, _)| *strike == signal.strike) {
                Some((_, group)) => group.push(*signal),
                None => by_strike.push((signal.strike, vec![*signal])),
            }
        }

        by_strike.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        by_strike
            .into_iter()
            .take(self.max_top_strikes)
            .map(|(strike, group)| StrikeFocus {
                strike,
                count: group.len(),
                action: dominant_action(&group),
                dte: modal_dte(&group),
            })
            .collect()
    }
}

/// Majority action at a strike; ties go to the action seen first.
fn dominant_action(group: &[&Signal]) -> StrikeAction {
    let mut counts: Vec<(StrikeAction, usize)> = Vec::new();
    for signal in group {
        let action = StrikeAction::from_pair(signal.direction, signal.option_type);
        match counts.iter_mut().find(|(a, _)| *a == action) {
            Some((_, n)) => *n += 1,
            None => counts.push((action, 1)),
        }
    }

    let mut best: Option<(StrikeAction, usize)> = None;
    for (action, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((action, n));
        }
    }
    best.map(|(a, _)| a).unwrap_or(StrikeAction::BuyCall)
}

/// Most frequent DTE; ties go to the shortest.
fn modal_dte(group: &[&Signal]) -> i64 {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for signal in group {
        *counts.entry(signal.dte).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(dte_a, n_a), (dte_b, n_b)| n_a.cmp(n_b).then(dte_b.cmp(dte_a)))
        .map(|(dte, _)| dte)
        .unwrap_or(0)
}
