use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::contract::SHARES_PER_CONTRACT;
use crate::error::FlowError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CALL" | "C" => Some(OptionType::Call),
            "PUT" | "P" => Some(OptionType::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "BULLISH"),
            Direction::Bearish => write!(f, "BEARISH"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    GoldenSweep,
    UnusualVolume,
    LargeBlock,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::GoldenSweep => write!(f, "Golden Sweep"),
            SignalType::UnusualVolume => write!(f, "Unusual Volume"),
            SignalType::LargeBlock => write!(f, "Large Block"),
        }
    }
}

/// One contract snapshot from the market-data feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawOptionObservation {
    pub ticker: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub dte: i64,
    pub volume: u64,
    pub open_interest: u64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub underlying_price: f64,
}

impl RawOptionObservation {
    /// Dollar notional: volume x last price x 100 shares
    pub fn premium(&self) -> f64 {
        self.volume as f64 * self.last_price * SHARES_PER_CONTRACT
    }

    pub fn midpoint(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    pub fn strike_distance_pct(&self) -> f64 {
        (self.strike - self.underlying_price).abs() / self.underlying_price * 100.0
    }
}

/// Wire form of an observation. Every field is optional so a single bad row
/// fails its own conversion instead of the whole file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationRecord {
    pub ticker: Option<String>,
    #[serde(alias = "type")]
    pub option_type: Option<String>,
    pub strike: Option<f64>,
    #[serde(alias = "expiration_dte")]
    pub dte: Option<i64>,
    pub expiration: Option<NaiveDate>,
    pub volume: Option<f64>,
    #[serde(alias = "openInterest")]
    pub open_interest: Option<f64>,
    #[serde(alias = "lastPrice")]
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    #[serde(alias = "stock_price")]
    pub underlying_price: Option<f64>,
}

impl ObservationRecord {
    /// Validate and convert. `as_of` resolves `expiration` into a DTE when
    /// the feed did not supply one.
    pub fn into_observation(self, as_of: NaiveDate) -> Result<RawOptionObservation, FlowError> {
        let ticker = self
            .ticker
            .map(|t| t.trim().to_ascii_uppercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FlowError::parse(None, "missing field `ticker`"))?;
        let t = Some(ticker.as_str());

        let option_type = match self.option_type.as_deref() {
            Some(raw) => OptionType::parse(raw)
                .ok_or_else(|| FlowError::parse(t, format!("unknown option type `{}`", raw)))?,
            None => return Err(FlowError::parse(t, "missing field `option_type`")),
        };

        let strike = required(t, "strike", self.strike)?;
        let last_price = required(t, "last_price", self.last_price)?;
        let underlying_price = required(t, "underlying_price", self.underlying_price)?;
        if underlying_price <= 0.0 {
            return Err(FlowError::parse(
                t,
                format!("underlying_price must be positive (got {})", underlying_price),
            ));
        }

        let dte = match (self.dte, self.expiration) {
            (Some(dte), _) => dte,
            (None, Some(expiration)) => (expiration - as_of).num_days(),
            (None, None) => return Err(FlowError::parse(t, "missing field `dte` or `expiration`")),
        };
        if dte < 0 {
            return Err(FlowError::parse(t, format!("contract already expired (dte {})", dte)));
        }

        let volume = contract_count(t, "volume", self.volume)?;
        let open_interest = contract_count(t, "open_interest", self.open_interest)?;
        let bid = optional(t, "bid", self.bid)?;
        let ask = optional(t, "ask", self.ask)?;

        Ok(RawOptionObservation {
            ticker,
            option_type,
            strike,
            dte,
            volume,
            open_interest,
            last_price,
            bid,
            ask,
            underlying_price,
        })
    }
}

fn required(ticker: Option<&str>, field: &str, value: Option<f64>) -> Result<f64, FlowError> {
    let value = value.ok_or_else(|| FlowError::parse(ticker, format!("missing field `{}`", field)))?;
    check_numeric(ticker, field, value)
}

/// Absent cells mean "nothing traded" and read as zero
fn optional(ticker: Option<&str>, field: &str, value: Option<f64>) -> Result<f64, FlowError> {
    check_numeric(ticker, field, value.unwrap_or(0.0))
}

/// Contract counts are whole numbers; absent reads as zero
fn contract_count(ticker: Option<&str>, field: &str, value: Option<f64>) -> Result<u64, FlowError> {
    let value = optional(ticker, field, value)?;
    if value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(FlowError::parse(
            ticker,
            format!("field `{}` must be a whole contract count (got {})", field, value),
        ));
    }
    Ok(value as u64)
}

fn check_numeric(ticker: Option<&str>, field: &str, value: f64) -> Result<f64, FlowError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FlowError::parse(
            ticker,
            format!("field `{}` must be a non-negative number (got {})", field, value),
        ));
    }
    Ok(value)
}

/// A classified anomaly. Appended once to the signal log and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub ticker: String,
    pub signal_type: SignalType,
    pub direction: Direction,
    pub option_type: OptionType,
    pub strike: f64,
    pub dte: i64,
    pub volume: u64,
    pub open_interest: u64,
    pub premium: f64,
    pub last_price: f64,
    pub underlying_price: f64,
    pub strike_distance_pct: f64,
}

impl Signal {
    pub fn trade_date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
