//! Schedule configuration, loaded by the driver and handed to the engine
//! one block at a time (spec.md §6 "Configuration (consumed by the
//! driver, not the engine)").
//!
//! Grounded on the teacher's use of `serde_yaml` being declared but never
//! exercised in `Cargo.toml` — this module is its first actual caller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A full schedule file: one place plus an ordered list of blocks, each
/// run through the engine independently.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Schedule {
    pub place: String,
    pub schedule: Vec<ScheduleBlock>,
}

/// One schedule block — spec.md §6: `{ days, time_window: (HH:MM, HH:MM),
/// road_types: [string] }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScheduleBlock {
    pub days: Vec<String>,
    pub time_window: (String, String),
    pub road_types: Vec<String>,
}

impl ScheduleBlock {
    /// The allowed-highway-type set S1 needs, per spec.md §4.1.
    pub fn allowed_types(&self) -> HashSet<String> {
        self.road_types.iter().cloned().collect()
    }

    /// `T_max` in hours, from `time_window`: `hours_between(start, end)`
    /// (spec.md §6). Wraps past midnight (end earlier than start means the
    /// window runs into the next day).
    pub fn route_time_hours(&self) -> Result<f64, crate::error::EngineError> {
        let start = parse_hhmm(&self.time_window.0)?;
        let end = parse_hhmm(&self.time_window.1)?;
        let mut hours = end - start;
        if hours <= 0.0 {
            hours += 24.0;
        }
        Ok(hours)
    }
}

fn parse_hhmm(s: &str) -> Result<f64, crate::error::EngineError> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| crate::error::EngineError::Configuration(format!("not an HH:MM time: {s:?}")))?;
    let h: f64 = h
        .parse()
        .map_err(|_| crate::error::EngineError::Configuration(format!("bad hour in {s:?}")))?;
    let m: f64 = m
        .parse()
        .map_err(|_| crate::error::EngineError::Configuration(format!("bad minute in {s:?}")))?;
    Ok(h + m / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_yaml_schedule() {
        let yaml = r#"
place: some-city
schedule:
  - days: [mon, wed, fri]
    time_window: ["06:00", "09:30"]
    road_types: [residential, tertiary]
"#;
        let s: Schedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.place, "some-city");
        assert_eq!(s.schedule.len(), 1);
        assert_eq!(s.schedule[0].allowed_types(), ["residential".to_string(), "tertiary".to_string()].into_iter().collect());
    }

    #[test]
    fn converts_time_window_to_hours() {
        let block = ScheduleBlock {
            days: vec!["mon".into()],
            time_window: ("06:00".into(), "09:30".into()),
            road_types: vec!["residential".into()],
        };
        assert!((block.route_time_hours().unwrap() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn wraps_past_midnight() {
        let block = ScheduleBlock {
            days: vec!["mon".into()],
            time_window: ("22:00".into(), "02:00".into()),
            road_types: vec!["residential".into()],
        };
        assert!((block.route_time_hours().unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_time() {
        let block = ScheduleBlock {
            days: vec!["mon".into()],
            time_window: ("not-a-time".into(), "02:00".into()),
            road_types: vec!["residential".into()],
        };
        assert!(block.route_time_hours().is_err());
    }
}
