//! Application-wide constants and scoring thresholds
//!
//! The scoring tables live here so the detector, scorer, aggregator and
//! formatter all read from one place.

/// Options contract sizing
pub mod contract {
    /// Shares per options contract
    pub const SHARES_PER_CONTRACT: f64 = 100.0;
}

/// Detector defaults (overridable from config.yaml)
pub mod detector {
    pub const DEFAULT_MIN_PREMIUM: f64 = 50_000.0;
    pub const DEFAULT_SWEEP_PREMIUM_THRESHOLD: f64 = 100_000.0;
    pub const DEFAULT_VOLUME_OI_RATIO: f64 = 5.0;
    pub const DEFAULT_MIN_DTE: i64 = 7;
    pub const DEFAULT_MAX_DTE: i64 = 45;

    /// A golden sweep needs volume of at least this multiple of open interest
    pub const SWEEP_VOLUME_OI_MULTIPLE: f64 = 2.0;

    /// A large block needs premium of at least this multiple of `min_premium`
    pub const BLOCK_PREMIUM_MULTIPLE: f64 = 2.0;
}

/// Per-signal score table (0-100)
pub mod scoring {
    pub const WEIGHT_GOLDEN_SWEEP: f64 = 40.0;
    pub const WEIGHT_UNUSUAL_VOLUME: f64 = 25.0;
    pub const WEIGHT_LARGE_BLOCK: f64 = 15.0;

    /// (minimum premium, points), checked top-down
    pub const PREMIUM_TIERS: [(f64, f64); 4] = [
        (1_000_000.0, 30.0),
        (500_000.0, 25.0),
        (250_000.0, 20.0),
        (100_000.0, 15.0),
    ];
    pub const PREMIUM_FLOOR_POINTS: f64 = 10.0;

    /// (maximum strike distance %, points), checked top-down
    pub const STRIKE_TIERS: [(f64, f64); 3] = [(5.0, 20.0), (10.0, 15.0), (20.0, 10.0)];
    pub const STRIKE_FLOOR_POINTS: f64 = 5.0;

    pub const DTE_SWEET_SPOT: (i64, i64) = (14, 45);
    pub const DTE_SWEET_SPOT_POINTS: f64 = 10.0;
    pub const DTE_SHOULDER_POINTS: f64 = 7.0;
    pub const DTE_SHOULDER_MIN: i64 = 7;
    pub const DTE_SHOULDER_MAX: i64 = 60;
    pub const DTE_SHORT_POINTS: f64 = 3.0;
    pub const DTE_FAR_POINTS: f64 = 5.0;

    pub const MAX_SCORE: f64 = 100.0;
}

/// Ticker aggregation
pub mod cluster {
    pub const DEFAULT_CONSENSUS_RATIO: f64 = 1.5;
    pub const DEFAULT_MAX_TOP_STRIKES: usize = 3;

    /// Conviction fraction used when neither side dominates
    pub const MIXED_CONVICTION: f64 = 0.5;

    /// (minimum signal count, multiplier), checked top-down
    pub const MULTIPLIER_TIERS: [(usize, f64); 3] = [(10, 1.5), (5, 1.3), (3, 1.15)];
    pub const BASE_MULTIPLIER: f64 = 1.0;
}

/// Recommendation tiers and price levels
pub mod recommendation {
    pub const VERY_HIGH_MIN_SCORE: f64 = 70.0;
    pub const HIGH_MIN_SCORE: f64 = 60.0;
    pub const MODERATE_MIN_SCORE: f64 = 50.0;

    pub const TARGET_1_PCT: f64 = 5.0;
    pub const TARGET_2_PCT: f64 = 10.0;
    pub const STOP_PCT: f64 = 3.0;

    /// Pullback level used in watchlist guidance
    pub const PULLBACK_PCT: f64 = 2.0;

    /// Stop raise above price for longs facing heavy bearish flow
    pub const STOP_RAISE_PCT: f64 = 2.0;

    /// Strike offset for the conservative put-selling leg
    pub const HEDGE_STRIKE_PCT: f64 = 5.0;

    /// Total premium that earns the whale callout
    pub const WHALE_PREMIUM: f64 = 5_000_000.0;
    pub const SWEEP_HEAVY_COUNT: usize = 5;
    pub const CLUSTERED_COUNT: usize = 10;

    /// DTE quoted for the aggressive leg when a cluster carries none
    pub const FALLBACK_DTE: i64 = 30;

    pub const DEFAULT_MAX_REPORT_TICKERS: usize = 10;
}

/// Sink output budgets
pub mod sink {
    pub const TELEGRAM_MAX_CHARS: usize = 4000;
    pub const API_MAX_CHARS: usize = 25_000;
    pub const TRUNCATION_MARKER: &str = "\n... [truncated]";
    pub const NO_FLOW_MESSAGE: &str = "[OPTIONS] No significant flow detected today";
    pub const TELEGRAM_TIMEOUT_SECS: u64 = 10;
}

/// Logging event names for structured logging
pub mod events {
    pub const OBSERVATION_REJECTED: &str = "observation_rejected";
    pub const SIGNAL_DETECTED: &str = "signal_detected";
    pub const SIGNAL_LOGGED: &str = "signal_logged";
    pub const LOG_LINE_SKIPPED: &str = "log_line_skipped";
    pub const REPORT_SAVED: &str = "report_saved";
    pub const REPORT_DELIVERED: &str = "report_delivered";
    pub const SINK_FAILED: &str = "sink_failed";
}
