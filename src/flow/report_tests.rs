//! Unit tests for report rendering, tiers and sink budgets.

#[cfg(test)]
mod report_tests {
    use chrono::NaiveDate;

    use crate::config::AnalysisConfig;
    use crate::constants::sink::{NO_FLOW_MESSAGE, TRUNCATION_MARKER};
    use crate::flow::aggregator::{Consensus, TickerAggregator, TickerCluster};
    use crate::flow::recommendation::*;
    use crate::flow::report::{analyze, chunk, truncate};
    use crate::flow::types::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn signal(ticker: &str, signal_type: SignalType, direction: Direction, premium: f64) -> Signal {
        Signal {
            timestamp: date().and_hms_opt(15, 45, 0).unwrap(),
            ticker: ticker.to_string(),
            signal_type,
            direction,
            option_type: OptionType::Call,
            strike: 105.0,
            dte: 30,
            volume: 2500,
            open_interest: 1000,
            premium,
            last_price: premium / 250_000.0,
            underlying_price: 100.0,
            strike_distance_pct: 5.0,
        }
    }

    /// Score 100 each (sweep, >=1M, <=5%, 14-45d)
    fn strong(ticker: &str, direction: Direction) -> Signal {
        signal(ticker, SignalType::GoldenSweep, direction, 1_200_000.0)
    }

    fn cluster_with_score(consensus: Consensus, score: f64) -> TickerCluster {
        let signals = vec![strong("TEST", Direction::Bullish)];
        let refs: Vec<&Signal> = signals.iter().collect();
        let mut cluster = TickerAggregator::new(&AnalysisConfig::default()).aggregate("TEST", &refs);
        cluster.consensus = consensus;
        cluster.conviction_score = score;
        cluster
    }

    // ============= Tier Tests =============

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_score(70.0), Tier::VeryHigh);
        assert_eq!(Tier::from_score(69.99), Tier::High);
        assert_eq!(Tier::from_score(60.0), Tier::High);
        assert_eq!(Tier::from_score(59.9), Tier::Moderate);
        assert_eq!(Tier::from_score(50.0), Tier::Moderate);
        assert_eq!(Tier::from_score(49.9), Tier::Low);
        assert_eq!(Tier::from_score(0.0), Tier::Low);
    }

    #[test]
    fn test_price_levels_bullish_and_bearish() {
        let bull = PriceLevels::for_consensus(Consensus::Bullish, 200.0).unwrap();
        assert!((bull.target_1 - 210.0).abs() < 1e-9);
        assert!((bull.target_2 - 220.0).abs() < 1e-9);
        assert!((bull.stop - 194.0).abs() < 1e-9);

        let bear = PriceLevels::for_consensus(Consensus::Bearish, 200.0).unwrap();
        assert!((bear.target_1 - 190.0).abs() < 1e-9);
        assert!((bear.target_2 - 180.0).abs() < 1e-9);
        assert!((bear.stop - 206.0).abs() < 1e-9);

        assert!(PriceLevels::for_consensus(Consensus::Mixed, 200.0).is_none());
    }

    #[test]
    fn test_mixed_overrides_every_tier() {
        for score in [95.0, 65.0, 55.0, 10.0] {
            let cluster = cluster_with_score(Consensus::Mixed, score);
            let rec = Recommendation::from_cluster(&cluster);
            assert_eq!(rec.action, Action::Wait);
            assert!(rec.render(&cluster).starts_with("Action: WAIT"));
        }
    }

    #[test]
    fn test_actions_per_tier() {
        let cases = [
            (Consensus::Bullish, 75.0, Action::StrongBuy),
            (Consensus::Bearish, 75.0, Action::StrongSell),
            (Consensus::Bullish, 65.0, Action::Buy),
            (Consensus::Bearish, 65.0, Action::Sell),
            (Consensus::Bullish, 55.0, Action::Watch),
            (Consensus::Bearish, 55.0, Action::Caution),
            (Consensus::Bullish, 20.0, Action::Informational),
            (Consensus::Bearish, 20.0, Action::Informational),
        ];
        for (consensus, score, expected) in cases {
            let rec = Recommendation::from_cluster(&cluster_with_score(consensus, score));
            assert_eq!(rec.action, expected, "{:?} {}", consensus, score);
        }
    }

    #[test]
    fn test_very_high_bullish_block_has_three_strategies() {
        let cluster = cluster_with_score(Consensus::Bullish, 80.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("STRONG BUY"));
        assert!(text.contains("AGGRESSIVE: Buy $105 calls (30d expiry)"));
        assert!(text.contains("MODERATE: Buy stock, set 5% profit target"));
        assert!(text.contains("CONSERVATIVE: Sell $95 puts"));
        assert!(text.contains("$105.00 (T1), $110.00 (T2)"));
        assert!(text.contains("Stop: $97.00"));
    }

    #[test]
    fn test_high_bearish_single_line_target() {
        let cluster = cluster_with_score(Consensus::Bearish, 62.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("BEARISH SIGNAL"));
        assert!(text.contains("Downside: $95.00 (-5%)"));
        assert!(text.contains("Avoid: $103.00"));
        assert!(!text.contains("Strategy Options"));
    }

    #[test]
    fn test_very_high_bearish_block_hedges() {
        let cluster = cluster_with_score(Consensus::Bearish, 85.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("STRONG SELL/HEDGE"));
        assert!(text.contains("Downside Targets: $95.00 (T1), $90.00 (T2)"));
        assert!(text.contains("Risk Limit: $103.00 (+3%)"));
        assert!(text.contains("AGGRESSIVE: Buy $105 puts (30d expiry)"));
        assert!(text.contains("raise stops to $102.00"));
        assert!(text.contains("CONSERVATIVE: Avoid new longs"));
    }

    #[test]
    fn test_sweep_heavy_note_wins_over_clustered() {
        let mut cluster = cluster_with_score(Consensus::Bullish, 80.0);
        cluster.golden_sweeps = 6;
        cluster.signal_count = 12;
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("⚡ 6 Golden Sweeps = Urgent institutional buying"));
        assert!(!text.contains("📊"));
    }

    #[test]
    fn test_clustered_note_without_sweeps() {
        let mut cluster = cluster_with_score(Consensus::Bearish, 80.0);
        cluster.golden_sweeps = 4;
        cluster.signal_count = 10;
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("📊 10 signals = Strong bearish consensus"));
        assert!(!text.contains("⚡"));
    }

    #[test]
    fn test_no_context_note_below_thresholds() {
        let mut cluster = cluster_with_score(Consensus::Bullish, 80.0);
        cluster.golden_sweeps = 4;
        cluster.signal_count = 9;
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(!text.contains("⚡"));
        assert!(!text.contains("📊"));
    }

    #[test]
    fn test_moderate_bullish_watchlist() {
        let cluster = cluster_with_score(Consensus::Bullish, 55.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("WATCHLIST - Moderate bullish flow"));
        assert!(text.contains("entry near $98.00 (pullback)"));
        assert!(text.contains("Consider: $105 calls if trend confirms"));
    }

    #[test]
    fn test_moderate_bearish_caution() {
        let cluster = cluster_with_score(Consensus::Bearish, 55.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);

        assert!(text.contains("CAUTION - Moderate bearish activity"));
        assert!(text.contains("weakness below $98.00"));
        assert!(text.contains("Tighten stops on existing longs"));
    }

    #[test]
    fn test_low_tier_says_no_action() {
        let cluster = cluster_with_score(Consensus::Bullish, 30.0);
        let text = Recommendation::from_cluster(&cluster).render(&cluster);
        assert!(text.contains("no immediate action"));
    }

    #[test]
    fn test_whale_alert_on_massive_premium() {
        let mut cluster = cluster_with_score(Consensus::Bullish, 90.0);
        cluster.total_premium = 6_500_000.0;
        let text = Recommendation::from_cluster(&cluster).render(&cluster);
        assert!(text.contains("WHALE ALERT: $6.5M premium"));
    }

    // ============= Report Tests =============

    #[test]
    fn test_empty_day_reports_no_flow() {
        let report = analyze(&[], date(), &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.text, NO_FLOW_MESSAGE);
        assert!(report.text.contains("No significant flow"));
    }

    #[test]
    fn test_report_layout() {
        let signals = vec![
            strong("NVDA", Direction::Bullish),
            strong("NVDA", Direction::Bullish),
            strong("NVDA", Direction::Bullish),
            strong("TSLA", Direction::Bullish),
            strong("TSLA", Direction::Bearish),
        ];
        let report = analyze(&signals, date(), &AnalysisConfig::default());

        assert_eq!(report.clusters.len(), 2);
        assert_eq!(report.total_signals, 5);
        assert!(report.text.starts_with("[OPTIONS FLOW] Daily Recommendation Report\nDate: 2025-03-03\n"));
        assert!(report.text.contains("Total tickers with flow: 2"));
        // NVDA: 100 x 1.0 x 1.15
        assert!(report.text.contains("#1 NVDA - BULLISH (VERY HIGH 🔥)"));
        assert!(report.text.contains("Conviction Score: 115.0/100"));
        assert!(report.text.contains("  • 3 Golden Sweep(s)"));
        assert!(report.text.contains("Key Strikes: $105 Buy Call (30d)"));
        // TSLA: 1 vs 1 => MIXED
        assert!(report.text.contains("#2 TSLA - MIXED"));
        assert!(report.text.contains("Direction: Bullish 1 | Bearish 1"));
        assert!(report.text.contains("Action: WAIT"));
        assert!(report.text.contains("Total Flow Premium: $6.0M"));
        assert!(report.text.contains("Total Signals: 5"));
    }

    #[test]
    fn test_report_limits_rendered_tickers() {
        let signals: Vec<Signal> = (0..15)
            .map(|i| strong(&format!("T{:02}", i), Direction::Bullish))
            .collect();
        let config = AnalysisConfig {
            max_report_tickers: 10,
            ..AnalysisConfig::default()
        };
        let report = analyze(&signals, date(), &config);

        assert_eq!(report.clusters.len(), 15);
        assert!(report.text.contains("#10 T09"));
        assert!(!report.text.contains("#11 "));
        assert!(report.text.contains("Top 10 plays shown above"));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let signals = vec![
            strong("AAPL", Direction::Bullish),
            signal("MSFT", SignalType::LargeBlock, Direction::Bearish, 150_000.0),
            signal("MSFT", SignalType::UnusualVolume, Direction::Bearish, 90_000.0),
            strong("AAPL", Direction::Bearish),
        ];
        let first = analyze(&signals, date(), &AnalysisConfig::default());
        let second = analyze(&signals, date(), &AnalysisConfig::default());
        assert_eq!(first.text.as_bytes(), second.text.as_bytes());
    }

    // ============= Truncation & Chunking =============

    #[test]
    fn test_truncate_within_budget_is_untouched() {
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn test_truncate_respects_budget_and_char_boundaries() {
        let text = "🔥".repeat(50);
        let cut = truncate(&text, 30);
        assert!(cut.ends_with(TRUNCATION_MARKER));
        assert_eq!(cut.chars().count(), 30);
    }

    #[test]
    fn test_truncate_tiny_budget() {
        assert_eq!(truncate("abcdefghijklmnopqrstuvwxyz", 3), "abc");
    }

    #[test]
    fn test_chunk_splits_on_lines() {
        let text = (0..100).map(|i| format!("line {:03}", i)).collect::<Vec<_>>().join("\n");
        let chunks = chunk(&text, 100);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 100);
        }
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined.trim_end(), text);
    }

    #[test]
    fn test_chunk_short_text_is_single_chunk() {
        let chunks = chunk("hello\nworld", 4000);
        assert_eq!(chunks, vec!["hello\nworld\n".to_string()]);
    }
}
