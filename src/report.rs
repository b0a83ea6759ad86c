//! Anomaly reporting for structural keywords heard outside their
//! expected region of the book.
//!
//! The resolver records each suspicious placement here; the CLI renders the
//! result for the operator to review before any audio is cut.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::keywords::SectionKeyword;

/// Structural keywords grouped with the start times at which they were heard
/// in a place their placement policy does not allow.
///
/// Keywords iterate in a fixed order; timestamps within a keyword keep the
/// order they were recorded in (chronological, since markers arrive sorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyReport {
    by_keyword: BTreeMap<SectionKeyword, Vec<f32>>,
}

impl AnomalyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one anomalous placement of `keyword` at `start_seconds`.
    pub fn record(&mut self, keyword: SectionKeyword, start_seconds: f32) {
        self.by_keyword.entry(keyword).or_default().push(start_seconds);
    }

    /// True when no placement was flagged.
    pub fn is_empty(&self) -> bool {
        self.by_keyword.is_empty()
    }

    /// Total number of flagged placements across all keywords.
    pub fn total(&self) -> usize {
        self.by_keyword.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKeyword, &[f32])> {
        self.by_keyword.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl fmt::Display for AnomalyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (keyword, starts) in &self.by_keyword {
            let stamps: Vec<String> = starts
                .iter()
                .map(|s| format_timestamp_mmss(*s))
                .collect();
            writeln!(f, "- '{}':\t{}", keyword.display_name(), stamps.join(", "))?;
        }
        Ok(())
    }
}

impl Serialize for AnomalyReport {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.by_keyword.len()))?;
        for (keyword, starts) in &self.by_keyword {
            map.serialize_entry(keyword.display_name(), starts)?;
        }
        map.end()
    }
}

/// Render seconds as `MM:SS` for operator-facing output.
///
/// Minutes are total minutes, not wrapped at the hour, so long books read as
/// e.g. `90:05` rather than silently losing an hour.
pub fn format_timestamp_mmss(seconds: f32) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_timestamps_without_wrapping_at_the_hour() {
        assert_eq!(format_timestamp_mmss(0.0), "00:00");
        assert_eq!(format_timestamp_mmss(5.9), "00:05");
        assert_eq!(format_timestamp_mmss(65.0), "01:05");
        assert_eq!(format_timestamp_mmss(5405.0), "90:05");
        assert_eq!(format_timestamp_mmss(-3.0), "00:00");
    }

    #[test]
    fn records_group_by_keyword_in_recorded_order() {
        let mut report = AnomalyReport::new();
        report.record(SectionKeyword::Epilogue, 120.0);
        report.record(SectionKeyword::Epilogue, 360.0);
        report.record(SectionKeyword::Dedication, 15.0);

        assert!(!report.is_empty());
        assert_eq!(report.total(), 3);

        let entries: Vec<_> = report.iter().collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|(k, starts)| {
            *k == SectionKeyword::Epilogue && *starts == [120.0, 360.0]
        }));
    }

    #[test]
    fn renders_one_line_per_keyword() {
        let mut report = AnomalyReport::new();
        report.record(SectionKeyword::Prologue, 1505.0);
        report.record(SectionKeyword::Prologue, 5405.0);

        assert_eq!(report.to_string(), "- 'Prologue':\t25:05, 90:05\n");
    }

    #[test]
    fn serializes_with_display_name_keys() -> anyhow::Result<()> {
        let mut report = AnomalyReport::new();
        report.record(SectionKeyword::Index, 42.0);

        let json = serde_json::to_string(&report)?;
        assert_eq!(json, r#"{"Index":[42.0]}"#);
        Ok(())
    }

    #[test]
    fn empty_report_renders_and_serializes_empty() -> anyhow::Result<()> {
        let report = AnomalyReport::new();
        assert!(report.is_empty());
        assert_eq!(report.total(), 0);
        assert_eq!(report.to_string(), "");
        assert_eq!(serde_json::to_string(&report)?, "{}");
        Ok(())
    }
}
