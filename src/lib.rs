//! Flow Screener - options-flow signal scoring and recommendation engine
//!
//! Classifies option-chain observations into unusual-activity signals,
//! logs them, and turns a day's log into ranked per-ticker recommendations.

pub mod api;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod flow;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, FlowError};
pub use flow::{
    analyze, detect, Consensus, Direction, ObservationRecord, OptionType, RawOptionObservation, Recommendation,
    Report, Signal, SignalType, TickerCluster, Tier,
};
pub use services::pipeline::FlowPipeline;
