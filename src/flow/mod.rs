//! Options-flow scoring core: detect, score, aggregate, recommend.
//!
//! Nothing in here touches the network or the filesystem.

pub mod aggregator;
pub mod detector;
pub mod recommendation;
pub mod report;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod report_tests;

use chrono::NaiveDateTime;

use crate::config::DetectorConfig;

pub use aggregator::{Consensus, StrikeAction, StrikeFocus, TickerAggregator, TickerCluster};
pub use detector::{DetectionBatch, SignalDetector};
pub use recommendation::{Action, PriceLevels, Recommendation, Tier};
pub use report::{analyze, Report};
pub use types::{Direction, ObservationRecord, OptionType, RawOptionObservation, Signal, SignalType};

/// One-shot classification without building a detector.
pub fn detect(observation: &RawOptionObservation, config: &DetectorConfig, at: NaiveDateTime) -> Option<Signal> {
    SignalDetector::new(config.clone()).detect(observation, at)
}
