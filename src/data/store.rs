use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::events;
use crate::error::AppResult;
use crate::flow::types::Signal;

/// What came back from reading the log.
#[derive(Clone, Debug, Default)]
pub struct LogRead {
    pub signals: Vec<Signal>,
    /// Lines that failed to parse (1-based line numbers)
    pub skipped_lines: Vec<usize>,
}

/// Append-only JSON-lines log of detected signals. One line per detection;
/// nothing is ever rewritten.
#[derive(Clone, Debug)]
pub struct SignalLog {
    path: PathBuf,
}

impl SignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, signal: &Signal) -> AppResult<()> {
        self.append_all(std::slice::from_ref(signal))
    }

    pub fn append_all(&self, signals: &[Signal]) -> AppResult<()> {
        if signals.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut buf = String::new();
        for signal in signals {
            buf.push_str(&serde_json::to_string(signal)?);
            buf.push('\n');
        }
        f.write_all(buf.as_bytes())?;
        Ok(())
    }

    /// Every signal in file order. A missing log reads as empty.
    pub fn read_all(&self) -> AppResult<LogRead> {
        self.read_filtered(|_| true)
    }

    /// Signals whose timestamp falls on `date`, in file order.
    pub fn read_for_day(&self, date: NaiveDate) -> AppResult<LogRead> {
        self.read_filtered(|s| s.trade_date() == date)
    }

    fn read_filtered<F>(&self, keep: F) -> AppResult<LogRead>
    where
        F: Fn(&Signal) -> bool,
    {
        let mut out = LogRead::default();
        if !self.path.exists() {
            return Ok(out);
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        for (idx, raw) in reader.split(b'\n').enumerate() {
            let line_no = idx + 1;
            let line = match String::from_utf8(raw?) {
                Ok(line) => line,
                Err(e) => {
                    self.skip(&mut out, line_no, e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Signal>(&line) {
                Ok(signal) if keep(&signal) => out.signals.push(signal),
                Ok(_) => {}
                Err(e) => self.skip(&mut out, line_no, e),
            }
        }
        Ok(out)
    }

    fn skip(&self, out: &mut LogRead, line_no: usize, reason: impl std::fmt::Display) {
        warn!(
            event = events::LOG_LINE_SKIPPED,
            "⚠️ [LOG] Skipping {} line {}: {}",
            self.path.display(),
            line_no,
            reason
        );
        out.skipped_lines.push(line_no);
    }
}
