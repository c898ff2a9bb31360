// src/engine/clock.rs
//
// Wall-clock time windows. Times cross the API as zero-padded "HH:MM"
// strings and are parsed exactly once into chrono::NaiveTime; every
// comparison after that is on the parsed value.

use chrono::NaiveTime;

use super::EngineError;

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, EngineError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| EngineError::InvalidTime(s.to_string()))
}

pub fn fmt_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter keeping the wire format at "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveTime::parse_from_str(&s, "%H:%M")
            .map_err(|_| serde::de::Error::custom(format!("invalid time '{s}': expected HH:MM")))
    }
}

/// A half-open `[start, end)` time-of-day interval. Invariant: start < end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, EngineError> {
        if start >= end {
            return Err(EngineError::EmptyWindow(fmt_hhmm(start), fmt_hhmm(end)));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, EngineError> {
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    /// Half-open semantics: a window ending exactly when another begins does
    /// not overlap it.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let pairs = [
            (w("09:00", "10:00"), w("09:30", "11:00")),
            (w("09:00", "10:00"), w("10:00", "11:00")),
            (w("08:00", "12:00"), w("09:00", "10:00")),
            (w("14:00", "15:00"), w("15:30", "16:00")),
        ];
        for (a, b) in pairs {
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        assert!(!w("09:00", "10:00").overlaps(&w("10:00", "11:00")));
        assert!(w("09:00", "10:01").overlaps(&w("10:00", "11:00")));
    }

    #[test]
    fn containment_and_identity_overlap() {
        assert!(w("08:00", "12:00").overlaps(&w("09:00", "10:00")));
        assert!(w("09:00", "10:00").overlaps(&w("09:00", "10:00")));
    }

    #[test]
    fn disjoint_windows_do_not_overlap() {
        assert!(!w("09:00", "10:00").overlaps(&w("13:00", "14:00")));
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(matches!(parse_hhmm("25:00"), Err(EngineError::InvalidTime(_))));
        assert!(matches!(parse_hhmm("nope"), Err(EngineError::InvalidTime(_))));
        assert!(matches!(parse_hhmm("12:61"), Err(EngineError::InvalidTime(_))));
    }

    #[test]
    fn rejects_empty_or_inverted_window() {
        assert!(matches!(
            TimeWindow::parse("10:00", "10:00"),
            Err(EngineError::EmptyWindow(_, _))
        ));
        assert!(matches!(
            TimeWindow::parse("11:00", "10:00"),
            Err(EngineError::EmptyWindow(_, _))
        ));
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(fmt_hhmm(parse_hhmm("09:05").unwrap()), "09:05");
    }
}
