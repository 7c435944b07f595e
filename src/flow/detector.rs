//! Per-contract classification of unusual options activity.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::constants::{detector::*, events};
use crate::error::FlowError;
use crate::flow::types::{
    Direction, ObservationRecord, OptionType, RawOptionObservation, Signal, SignalType,
};

/// Outcome of running the detector over a batch of raw records.
#[derive(Clone, Debug, Default)]
pub struct DetectionBatch {
    pub signals: Vec<Signal>,
    /// Well-formed observations that matched no rule
    pub discarded: usize,
    /// Malformed records, in input order
    pub errors: Vec<FlowError>,
}

impl DetectionBatch {
    pub fn processed(&self) -> usize {
        self.signals.len() + self.discarded + self.errors.len()
    }
}

#[derive(Clone, Debug)]
pub struct SignalDetector {
    config: DetectorConfig,
}

impl SignalDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify one observation, discarding anything that matches no rule.
    pub fn detect(&self, obs: &RawOptionObservation, at: NaiveDateTime) -> Option<Signal> {
        self.classify(obs, at).ok()
    }

    /// Same as [`detect`](Self::detect) but reports why an observation was discarded.
    pub fn classify(&self, obs: &RawOptionObservation, at: NaiveDateTime) -> Result<Signal, FlowError> {
        let cfg = &self.config;

        if obs.dte < cfg.min_dte || obs.dte > cfg.max_dte {
            return Err(FlowError::threshold(
                &obs.ticker,
                format!("dte {} outside [{}, {}]", obs.dte, cfg.min_dte, cfg.max_dte),
            ));
        }
        if obs.volume == 0 {
            return Err(FlowError::threshold(&obs.ticker, "no volume"));
        }
        if obs.last_price <= 0.0 {
            return Err(FlowError::threshold(&obs.ticker, "no last price"));
        }

        let premium = obs.premium();
        if premium < cfg.min_premium {
            return Err(FlowError::threshold(
                &obs.ticker,
                format!("premium {:.0} below minimum {:.0}", premium, cfg.min_premium),
            ));
        }

        let volume = obs.volume as f64;
        let open_interest = obs.open_interest as f64;

        let (signal_type, direction) = if premium >= cfg.sweep_premium_threshold
            && obs.open_interest > 0
            && volume >= SWEEP_VOLUME_OI_MULTIPLE * open_interest
        {
            (SignalType::GoldenSweep, midpoint_direction(obs))
        } else if obs.open_interest > 0 && volume >= cfg.volume_oi_ratio * open_interest {
            // No midpoint check here: unusual volume is read at face value
            (SignalType::UnusualVolume, naive_direction(obs.option_type))
        } else if premium >= BLOCK_PREMIUM_MULTIPLE * cfg.min_premium {
            (SignalType::LargeBlock, midpoint_direction(obs))
        } else {
            return Err(FlowError::threshold(
                &obs.ticker,
                format!(
                    "no rule matched (premium {:.0}, volume {}, oi {})",
                    premium, obs.volume, obs.open_interest
                ),
            ));
        };

        Ok(Signal {
            timestamp: at,
            ticker: obs.ticker.clone(),
            signal_type,
            direction,
            option_type: obs.option_type,
            strike: obs.strike,
            dte: obs.dte,
            volume: obs.volume,
            open_interest: obs.open_interest,
            premium,
            last_price: obs.last_price,
            underlying_price: obs.underlying_price,
            strike_distance_pct: obs.strike_distance_pct(),
        })
    }

    /// Convert and classify a batch of feed records. Never fails: malformed
    /// records are collected into `errors` and the batch continues.
    pub fn detect_batch<I>(&self, records: I, as_of: NaiveDate, at: NaiveDateTime) -> DetectionBatch
    where
        I: IntoIterator<Item = ObservationRecord>,
    {
        let mut batch = DetectionBatch::default();

        for record in records {
            let obs = match record.into_observation(as_of) {
                Ok(obs) => obs,
                Err(e) => {
                    warn!(event = events::OBSERVATION_REJECTED, "⚠️ [DETECT] {}", e);
                    batch.errors.push(e);
                    continue;
                }
            };

            match self.classify(&obs, at) {
                Ok(signal) => {
                    debug!(
                        event = events::SIGNAL_DETECTED,
                        "🐋 [DETECT] {} {} {} ${} ({:.0}K)",
                        signal.ticker,
                        signal.signal_type,
                        signal.option_type,
                        signal.strike,
                        signal.premium / 1000.0
                    );
                    batch.signals.push(signal);
                }
                Err(_) => batch.discarded += 1,
            }
        }

        batch
    }
}

/// Trade at or above the bid-ask midpoint reads as aggressive buying.
fn midpoint_direction(obs: &RawOptionObservation) -> Direction {
    let aggressive_buy = obs.ask > 0.0 && obs.last_price >= obs.midpoint();
    match (aggressive_buy, obs.option_type) {
        (true, OptionType::Call) | (false, OptionType::Put) => Direction::Bullish,
        (true, OptionType::Put) | (false, OptionType::Call) => Direction::Bearish,
    }
}

fn naive_direction(option_type: OptionType) -> Direction {
    match option_type {
        OptionType::Call => Direction::Bullish,
        OptionType::Put => Direction::Bearish,
    }
}
