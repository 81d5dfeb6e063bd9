//! Field-membership filters for `--filter` and `--exclude`.
//!
//! A filter argument is a comma-separated list of `field=value` pairs. Pairs
//! naming the same field form a value set (OR); distinct fields are ANDed.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{PlotError, Result};
use crate::record::ParsedRecord;

/// Whether matching records are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep records whose every constrained field is in its value set.
    Include,
    /// Keep records whose every constrained field is outside its value set.
    Exclude,
}

/// Parsed `field=value[,field=value...]` constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    constraints: Vec<(String, BTreeSet<String>)>,
}

impl FieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the accepted set of `field`.
    pub fn allow(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.constraints.iter_mut().find(|(f, _)| *f == field) {
            Some((_, values)) => {
                values.insert(value);
            }
            None => self.constraints.push((field, BTreeSet::from([value]))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constrained field names, in the order they first appeared.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|(f, _)| f.as_str())
    }

    pub fn values(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.constraints
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    /// Test one record. Every constrained field must be present (see
    /// [`require_fields`]); an absent field yields `MissingField`.
    pub fn accepts(&self, record: &ParsedRecord, mode: FilterMode) -> Result<bool> {
        for (field, values) in &self.constraints {
            let hit = values.contains(record.require(field)?);
            let keep = match mode {
                FilterMode::Include => hit,
                FilterMode::Exclude => !hit,
            };
            if !keep {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Keep the records accepted under `mode`, preserving their order.
    /// An empty filter returns `records` unchanged.
    pub fn apply(&self, records: Vec<ParsedRecord>, mode: FilterMode) -> Result<Vec<ParsedRecord>> {
        if self.is_empty() {
            return Ok(records);
        }
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if self.accepts(&record, mode)? {
                kept.push(record);
            }
        }
        Ok(kept)
    }
}

impl FromStr for FieldFilter {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let mut filter = FieldFilter::new();
        for pair in s.trim().split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(field), Some(value), None) if !field.is_empty() => {
                    filter.allow(field, value)
                }
                _ => return Err(PlotError::MalformedFilter(pair.to_string())),
            }
        }
        Ok(filter)
    }
}

/// Check that every record carries every field in `fields`.
///
/// Run before filtering or grouping so a missing field is reported once, up
/// front, naming the first offending file.
pub fn require_fields<'a>(
    records: &[ParsedRecord],
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let fields: Vec<&str> = fields.into_iter().collect();
    for record in records {
        for field in &fields {
            record.require(field)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<ParsedRecord> {
        names
            .iter()
            .map(|n| ParsedRecord::from_path(*n).unwrap())
            .collect()
    }

    fn names(records: &[ParsedRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.path().display().to_string())
            .collect()
    }

    #[test]
    fn parse_repeated_field_builds_value_set() {
        let f: FieldFilter = "msgsize=32,msgsize=288,scenario=c-ats".parse().unwrap();
        assert_eq!(f.fields().collect::<Vec<_>>(), ["msgsize", "scenario"]);
        assert_eq!(
            f.values("msgsize").unwrap(),
            &BTreeSet::from(["32".to_string(), "288".to_string()])
        );
    }

    #[test]
    fn parse_trims_and_skips_empty_segments() {
        let f: FieldFilter = "  rate=1, ,batch=2,".parse().unwrap();
        assert_eq!(f.fields().collect::<Vec<_>>(), ["rate", "batch"]);
        assert!("".parse::<FieldFilter>().unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_malformed_pairs() {
        for bad in ["rate", "rate=1=2", "=1", "rate=1,batch"] {
            assert!(
                matches!(bad.parse::<FieldFilter>(), Err(PlotError::MalformedFilter(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn include_keeps_only_listed_scenarios() {
        let input = records(&[
            "echo_python_rate=1-report.hgrm",
            "echo_java_rate=1-report.hgrm",
        ]);
        let f: FieldFilter = "scenario=java,scenario=c".parse().unwrap();
        let kept = f.apply(input, FilterMode::Include).unwrap();
        assert_eq!(names(&kept), ["echo_java_rate=1-report.hgrm"]);
    }

    #[test]
    fn include_ands_distinct_fields() {
        let input = records(&[
            "echo_java_rate=1_batch=1-report.hgrm",
            "echo_java_rate=1_batch=2-report.hgrm",
            "echo_c_rate=1_batch=1-report.hgrm",
        ]);
        let f: FieldFilter = "scenario=java,batch=1".parse().unwrap();
        let kept = f.apply(input, FilterMode::Include).unwrap();
        assert_eq!(names(&kept), ["echo_java_rate=1_batch=1-report.hgrm"]);
    }

    #[test]
    fn exclude_drops_matching_values() {
        let input = records(&[
            "echo_java_msgsize=32-report.hgrm",
            "echo_java_msgsize=1344-report.hgrm",
            "echo_c_msgsize=1344-report.hgrm",
            "echo_c_msgsize=288-report.hgrm",
        ]);
        let f: FieldFilter = "msgsize=1344".parse().unwrap();
        let kept = f.apply(input, FilterMode::Exclude).unwrap();
        assert_eq!(
            names(&kept),
            [
                "echo_java_msgsize=32-report.hgrm",
                "echo_c_msgsize=288-report.hgrm"
            ]
        );
    }

    #[test]
    fn exclude_requires_every_field_to_miss() {
        let input = records(&[
            "echo_java_msgsize=32-report.hgrm",
            "echo_c_msgsize=32-report.hgrm",
            "echo_c_msgsize=288-report.hgrm",
        ]);
        let f: FieldFilter = "msgsize=32,scenario=java".parse().unwrap();
        let kept = f.apply(input, FilterMode::Exclude).unwrap();
        assert_eq!(names(&kept), ["echo_c_msgsize=288-report.hgrm"]);
    }

    #[test]
    fn empty_filter_is_identity() {
        let input = records(&["echo_java_rate=1-report.hgrm", "echo_c_rate=2-report.hgrm"]);
        let f = FieldFilter::new();
        assert_eq!(f.apply(input.clone(), FilterMode::Include).unwrap(), input);
        assert_eq!(f.apply(input.clone(), FilterMode::Exclude).unwrap(), input);
    }

    #[test]
    fn missing_field_is_an_error() {
        let input = records(&["echo_java_rate=1-report.hgrm"]);
        let f: FieldFilter = "msgsize=32".parse().unwrap();
        assert!(matches!(
            f.apply(input.clone(), FilterMode::Include),
            Err(PlotError::MissingField { .. })
        ));
        assert!(matches!(
            require_fields(&input, f.fields()),
            Err(PlotError::MissingField { field, .. }) if field == "msgsize"
        ));
        assert!(require_fields(&input, ["type", "scenario", "rate"]).is_ok());
    }
}
