//! Tiered trade recommendations rendered from a ticker cluster.

use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;

use crate::constants::recommendation::*;
use crate::flow::aggregator::{Consensus, TickerCluster};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Tier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score >= VERY_HIGH_MIN_SCORE {
            Tier::VeryHigh
        } else if score >= HIGH_MIN_SCORE {
            Tier::High
        } else if score >= MODERATE_MIN_SCORE {
            Tier::Moderate
        } else {
            Tier::Low
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Tier::VeryHigh => "🔥",
            Tier::High => "💪",
            Tier::Moderate => "👀",
            Tier::Low => "⚠️",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::VeryHigh => "VERY HIGH",
            Tier::High => "HIGH",
            Tier::Moderate => "MODERATE",
            Tier::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// Price targets and stop for a directional call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceLevels {
    pub entry: f64,
    pub target_1: f64,
    pub target_2: f64,
    pub stop: f64,
}

impl PriceLevels {
    /// None for MIXED: no directional levels exist
    pub fn for_consensus(consensus: Consensus, price: f64) -> Option<Self> {
        let pct = |p: f64| p / 100.0;
        match consensus {
            Consensus::Bullish => Some(Self {
                entry: price,
                target_1: price * (1.0 + pct(TARGET_1_PCT)),
                target_2: price * (1.0 + pct(TARGET_2_PCT)),
                stop: price * (1.0 - pct(STOP_PCT)),
            }),
            Consensus::Bearish => Some(Self {
                entry: price,
                target_1: price * (1.0 - pct(TARGET_1_PCT)),
                target_2: price * (1.0 - pct(TARGET_2_PCT)),
                stop: price * (1.0 + pct(STOP_PCT)),
            }),
            Consensus::Mixed => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Action {
    StrongBuy,
    StrongSell,
    Buy,
    Sell,
    Watch,
    Caution,
    Informational,
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::StrongBuy => "STRONG BUY",
            Action::StrongSell => "STRONG SELL/HEDGE",
            Action::Buy => "BUY SIGNAL",
            Action::Sell => "BEARISH SIGNAL",
            Action::Watch => "WATCHLIST",
            Action::Caution => "CAUTION",
            Action::Informational => "INFORMATIONAL",
            Action::Wait => "WAIT",
        };
        f.write_str(label)
    }
}

/// A cluster rendered into a tier, an action and price levels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub ticker: String,
    pub tier: Tier,
    pub consensus: Consensus,
    pub action: Action,
    pub levels: Option<PriceLevels>,
    /// Strike the option legs reference: top strike, else the underlying
    pub strike: f64,
    pub dte: i64,
}

impl Recommendation {
    pub fn from_cluster(cluster: &TickerCluster) -> Self {
        let tier = Tier::from_score(cluster.conviction_score);
        let bullish = cluster.consensus == Consensus::Bullish;

        let action = match (cluster.consensus, tier) {
            (Consensus::Mixed, _) => Action::Wait,
            (_, Tier::VeryHigh) if bullish => Action::StrongBuy,
            (_, Tier::VeryHigh) => Action::StrongSell,
            (_, Tier::High) if bullish => Action::Buy,
            (_, Tier::High) => Action::Sell,
            (_, Tier::Moderate) if bullish => Action::Watch,
            (_, Tier::Moderate) => Action::Caution,
            (_, Tier::Low) => Action::Informational,
        };

        Self {
            ticker: cluster.ticker.clone(),
            tier,
            consensus: cluster.consensus,
            action,
            levels: PriceLevels::for_consensus(cluster.consensus, cluster.underlying_price),
            strike: cluster
                .top_strikes
                .first()
                .map(|s| s.strike)
                .unwrap_or(cluster.underlying_price),
            dte: cluster.avg_dte.unwrap_or(FALLBACK_DTE),
        }
    }

    /// Action block for the report. MIXED always renders WAIT.
    pub fn render(&self, cluster: &TickerCluster) -> String {
        let mut out = String::new();
        let price = cluster.underlying_price;

        let levels = match (self.action, self.levels) {
            (Action::Wait, _) | (_, None) => {
                return "Action: WAIT - Mixed bullish/bearish signals. \
                        Monitor for directional clarity before entering."
                    .to_string();
            }
            (_, Some(levels)) => levels,
        };

        match self.action {
            Action::StrongBuy => {
                let _ = writeln!(out, "💰 STRONG BUY - Institutional accumulation detected.");
                self.whale_line(&mut out, cluster, "Major positioning!");
                let _ = writeln!(out, "   📍 Entry: ${:.2} (current price)", levels.entry);
                let _ = writeln!(
                    out,
                    "   🎯 Targets: ${:.2} (T1), ${:.2} (T2)",
                    levels.target_1, levels.target_2
                );
                let _ = writeln!(out, "   🛑 Stop: ${:.2} (-{:.0}%)", levels.stop, STOP_PCT);
                out.push('\n');
                let _ = writeln!(out, "   Strategy Options:");
                let _ = writeln!(
                    out,
                    "   • AGGRESSIVE: Buy ${:.0} calls ({}d expiry)",
                    self.strike, self.dte
                );
                let _ = writeln!(
                    out,
                    "   • MODERATE: Buy stock, set {:.0}% profit target",
                    TARGET_1_PCT
                );
                let _ = writeln!(
                    out,
                    "   • CONSERVATIVE: Sell ${:.0} puts, collect premium",
                    (price * (1.0 - HEDGE_STRIKE_PCT / 100.0)).trunc()
                );
                self.context_line(&mut out, cluster, "Urgent institutional buying", "High consensus conviction");
            }
            Action::StrongSell => {
                let _ = writeln!(out, "🔴 STRONG SELL/HEDGE - Heavy bearish institutional flow.");
                self.whale_line(&mut out, cluster, "Major hedging!");
                let _ = writeln!(out, "   📍 Current: ${:.2}", levels.entry);
                let _ = writeln!(
                    out,
                    "   🎯 Downside Targets: ${:.2} (T1), ${:.2} (T2)",
                    levels.target_1, levels.target_2
                );
                let _ = writeln!(out, "   🛑 Risk Limit: ${:.2} (+{:.0}%)", levels.stop, STOP_PCT);
                out.push('\n');
                let _ = writeln!(out, "   Strategy Options:");
                let _ = writeln!(
                    out,
                    "   • AGGRESSIVE: Buy ${:.0} puts ({}d expiry)",
                    self.strike, self.dte
                );
                let _ = writeln!(
                    out,
                    "   • MODERATE: Trim/exit longs, raise stops to ${:.2}",
                    price * (1.0 + STOP_RAISE_PCT / 100.0)
                );
                let _ = writeln!(out, "   • CONSERVATIVE: Avoid new longs, monitor for reversal");
                self.context_line(&mut out, cluster, "Urgent institutional hedging", "Strong bearish consensus");
            }
            Action::Buy => {
                let _ = writeln!(out, "📈 BUY SIGNAL - Solid institutional interest.");
                let _ = writeln!(out, "   📍 Entry: ${:.2} area", levels.entry);
                let _ = writeln!(out, "   🎯 Target: ${:.2} (+{:.0}%)", levels.target_1, TARGET_1_PCT);
                let _ = writeln!(out, "   🛑 Stop: ${:.2}", levels.stop);
                out.push('\n');
                let _ = write!(out, "   Recommended: Buy ${:.0} calls or shares on dips", self.strike);
            }
            Action::Sell => {
                let _ = writeln!(out, "⚠️ BEARISH SIGNAL - Notable institutional selling.");
                let _ = writeln!(out, "   📍 Current: ${:.2}", levels.entry);
                let _ = writeln!(out, "   🎯 Downside: ${:.2} (-{:.0}%)", levels.target_1, TARGET_1_PCT);
                let _ = writeln!(out, "   🛑 Avoid: ${:.2}", levels.stop);
                out.push('\n');
                let _ = write!(
                    out,
                    "   Recommended: Reduce longs or buy ${:.0} puts for hedge",
                    self.strike
                );
            }
            Action::Watch => {
                let _ = writeln!(out, "👀 WATCHLIST - Moderate bullish flow detected.");
                let _ = writeln!(
                    out,
                    "   Monitor for entry near ${:.2} (pullback)",
                    price * (1.0 - PULLBACK_PCT / 100.0)
                );
                let _ = writeln!(out, "   Confirm with price action before entering");
                let _ = write!(out, "   Consider: ${:.0} calls if trend confirms", self.strike);
            }
            Action::Caution => {
                let _ = writeln!(out, "⚠️ CAUTION - Moderate bearish activity.");
                let _ = writeln!(
                    out,
                    "   Monitor for weakness below ${:.2}",
                    price * (1.0 - PULLBACK_PCT / 100.0)
                );
                let _ = writeln!(out, "   Tighten stops on existing longs");
                let _ = write!(out, "   Wait for clearer direction before shorting");
            }
            Action::Informational | Action::Wait => {
                let _ = writeln!(out, "ℹ️ INFORMATIONAL - Low conviction signal.");
                let _ = write!(
                    out,
                    "   Track for pattern development, no immediate action recommended"
                );
            }
        }

        out.trim_end().to_string()
    }

    fn whale_line(&self, out: &mut String, cluster: &TickerCluster, note: &str) {
        if cluster.total_premium >= WHALE_PREMIUM {
            let _ = writeln!(
                out,
                "   🐋 WHALE ALERT: ${:.1}M premium - {}",
                cluster.total_premium / 1_000_000.0,
                note
            );
        }
    }

    fn context_line(&self, out: &mut String, cluster: &TickerCluster, sweep_note: &str, cluster_note: &str) {
        out.push('\n');
        if cluster.golden_sweeps >= SWEEP_HEAVY_COUNT {
            let _ = write!(out, "   ⚡ {} Golden Sweeps = {}", cluster.golden_sweeps, sweep_note);
        } else if cluster.signal_count >= CLUSTERED_COUNT {
            let _ = write!(out, "   📊 {} signals = {}", cluster.signal_count, cluster_note);
        }
    }
}
