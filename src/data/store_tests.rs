//! Unit tests for SignalLog - the append-only JSON-lines signal store.

#[cfg(test)]
mod store_tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Write;

    use crate::data::store::SignalLog;
    use crate::flow::types::*;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn signal(ticker: &str, at: NaiveDateTime) -> Signal {
        Signal {
            timestamp: at,
            ticker: ticker.to_string(),
            signal_type: SignalType::UnusualVolume,
            direction: Direction::Bullish,
            option_type: OptionType::Call,
            strike: 50.0,
            dte: 21,
            volume: 800,
            open_interest: 100,
            premium: 96_000.0,
            last_price: 1.2,
            underlying_price: 48.5,
            strike_distance_pct: 3.09,
        }
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("none.jsonl"));
        let read = log.read_all().unwrap();
        assert!(read.signals.is_empty());
        assert!(read.skipped_lines.is_empty());
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("nested/data/flow.jsonl"));
        log.append(&signal("AMD", ts(3, 10))).unwrap();
        assert!(log.path().exists());
        assert_eq!(log.read_all().unwrap().signals.len(), 1);
    }

    #[test]
    fn test_append_only_keeps_duplicates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("flow.jsonl"));

        let s = signal("AMD", ts(3, 10));
        log.append(&s).unwrap();
        log.append_all(&[signal("NVDA", ts(3, 11)), s.clone()]).unwrap();

        let all = log.read_all().unwrap().signals;
        let tickers: Vec<&str> = all.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AMD", "NVDA", "AMD"]);
        assert_eq!(all[0], s);
    }

    #[test]
    fn test_read_for_day_filters_by_calendar_date() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("flow.jsonl"));
        log.append_all(&[
            signal("OLD", ts(2, 23)),
            signal("NEW1", ts(3, 0)),
            signal("NEW2", ts(3, 23)),
            signal("NEXT", ts(4, 9)),
        ])
        .unwrap();

        let day = log.read_for_day(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()).unwrap();
        let tickers: Vec<&str> = day.signals.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["NEW1", "NEW2"]);
    }

    #[test]
    fn test_corrupt_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.jsonl");
        let log = SignalLog::new(&path);
        log.append(&signal("AMD", ts(3, 10))).unwrap();
        {
            let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(f, "{{not json").unwrap();
            writeln!(f).unwrap();
        }
        log.append(&signal("NVDA", ts(3, 11))).unwrap();

        let read = log.read_all().unwrap();
        assert_eq!(read.signals.len(), 2);
        assert_eq!(read.skipped_lines, vec![2]);
    }

    #[test]
    fn test_non_utf8_line_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.jsonl");
        let log = SignalLog::new(&path);
        log.append(&signal("AMD", ts(3, 10))).unwrap();
        {
            let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(b"\xff\xfe garbage\n").unwrap();
        }
        log.append(&signal("NVDA", ts(3, 11))).unwrap();

        let day = log.read_for_day(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()).unwrap();
        let tickers: Vec<&str> = day.signals.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AMD", "NVDA"]);
        assert_eq!(day.skipped_lines, vec![2]);
    }

    #[test]
    fn test_append_empty_slice_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let log = SignalLog::new(dir.path().join("flow.jsonl"));
        log.append_all(&[]).unwrap();
        assert!(!log.path().exists());
    }
}
