use serde::Serialize;

use crate::constants::scoring::*;
use crate::flow::types::{Signal, SignalType};

/// Per-term contributions to a signal's quality score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub signal_type: f64,
    pub premium: f64,
    pub strike_proximity: f64,
    pub dte: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.signal_type + self.premium + self.strike_proximity + self.dte
    }
}

/// Quality score in [0, 100]. Pure and deterministic.
pub fn score(signal: &Signal) -> f64 {
    breakdown(signal).total()
}

pub fn breakdown(signal: &Signal) -> ScoreBreakdown {
    ScoreBreakdown {
        signal_type: type_points(signal.signal_type),
        premium: premium_points(signal.premium),
        strike_proximity: strike_points(signal.strike_distance_pct),
        dte: dte_points(signal.dte),
    }
}

pub fn type_points(signal_type: SignalType) -> f64 {
    match signal_type {
        SignalType::GoldenSweep => WEIGHT_GOLDEN_SWEEP,
        SignalType::UnusualVolume => WEIGHT_UNUSUAL_VOLUME,
        SignalType::LargeBlock => WEIGHT_LARGE_BLOCK,
    }
}

pub fn premium_points(premium: f64) -> f64 {
    PREMIUM_TIERS
        .iter()
        .find(|(min, _)| premium >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(PREMIUM_FLOOR_POINTS)
}

/// Closer strikes are likelier to pay out
pub fn strike_points(distance_pct: f64) -> f64 {
    let distance = distance_pct.abs();
    STRIKE_TIERS
        .iter()
        .find(|(max, _)| distance <= *max)
        .map(|(_, points)| *points)
        .unwrap_or(STRIKE_FLOOR_POINTS)
}

pub fn dte_points(dte: i64) -> f64 {
    let (sweet_min, sweet_max) = DTE_SWEET_SPOT;
    if (sweet_min..=sweet_max).contains(&dte) {
        DTE_SWEET_SPOT_POINTS
    } else if (DTE_SHOULDER_MIN..sweet_min).contains(&dte) || (dte > sweet_max && dte <= DTE_SHOULDER_MAX) {
        DTE_SHOULDER_POINTS
    } else if dte < DTE_SHOULDER_MIN {
        DTE_SHORT_POINTS
    } else {
        DTE_FAR_POINTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::types::{Direction, OptionType};
    use chrono::NaiveDate;

    fn signal(signal_type: SignalType, premium: f64, distance: f64, dte: i64) -> Signal {
        Signal {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 3)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            ticker: "SPY".to_string(),
            signal_type,
            direction: Direction::Bullish,
            option_type: OptionType::Call,
            strike: 500.0,
            dte,
            volume: 1000,
            open_interest: 100,
            premium,
            last_price: premium / 100_000.0,
            underlying_price: 500.0,
            strike_distance_pct: distance,
        }
    }

    #[test]
    fn test_perfect_golden_sweep_scores_100() {
        let s = signal(SignalType::GoldenSweep, 1_200_000.0, 2.9, 30);
        let b = breakdown(&s);
        assert_eq!(b.signal_type, 40.0);
        assert_eq!(b.premium, 30.0);
        assert_eq!(b.strike_proximity, 20.0);
        assert_eq!(b.dte, 10.0);
        assert_eq!(score(&s), MAX_SCORE);
    }

    #[test]
    fn test_floor_scores() {
        let s = signal(SignalType::LargeBlock, 60_000.0, 35.0, 90);
        assert_eq!(score(&s), 15.0 + 10.0 + 5.0 + 5.0);
    }

    #[test]
    fn test_premium_tier_boundaries() {
        assert_eq!(premium_points(1_000_000.0), 30.0);
        assert_eq!(premium_points(999_999.0), 25.0);
        assert_eq!(premium_points(500_000.0), 25.0);
        assert_eq!(premium_points(250_000.0), 20.0);
        assert_eq!(premium_points(100_000.0), 15.0);
        assert_eq!(premium_points(99_999.0), 10.0);
    }

    #[test]
    fn test_strike_tier_boundaries() {
        assert_eq!(strike_points(5.0), 20.0);
        assert_eq!(strike_points(5.01), 15.0);
        assert_eq!(strike_points(10.0), 15.0);
        assert_eq!(strike_points(20.0), 10.0);
        assert_eq!(strike_points(20.5), 5.0);
        assert_eq!(strike_points(-4.0), 20.0);
    }

    #[test]
    fn test_dte_tiers() {
        assert_eq!(dte_points(14), 10.0);
        assert_eq!(dte_points(45), 10.0);
        assert_eq!(dte_points(7), 7.0);
        assert_eq!(dte_points(13), 7.0);
        assert_eq!(dte_points(46), 7.0);
        assert_eq!(dte_points(60), 7.0);
        assert_eq!(dte_points(6), 3.0);
        assert_eq!(dte_points(0), 3.0);
        assert_eq!(dte_points(61), 5.0);
    }

    #[test]
    fn test_score_always_within_bounds() {
        let types = [SignalType::GoldenSweep, SignalType::UnusualVolume, SignalType::LargeBlock];
        for t in types {
            for premium in [50_000.0, 150_000.0, 300_000.0, 750_000.0, 5_000_000.0] {
                for distance in [0.0, 7.5, 15.0, 80.0] {
                    for dte in [0, 5, 10, 30, 50, 120] {
                        let s = score(&signal(t, premium, distance, dte));
                        assert!((0.0..=MAX_SCORE).contains(&s), "score {} out of range", s);
                    }
                }
            }
        }
    }
}
