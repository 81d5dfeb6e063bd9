//! Report file name grammar: `<type>_<scenario>_<params>-report.hgrm`.
//!
//! ```text
//! echo_java_rate=100000_batch=1_length=1344-report.hgrm
//! ^^^^ ^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! type scenario          params
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PlotError, Result};

static REPORT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-z-]+)_(?P<scenario>[^=_]+)_(?P<params>(?:[^=_]+=[^_]+_?)+)-report\.hgrm$",
    )
    .expect("report name pattern is valid")
});

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^=_]+)=([^_]+)").expect("param pattern is valid"));

pub const TYPE_FIELD: &str = "type";
pub const SCENARIO_FIELD: &str = "scenario";

/// Returns true if `name` follows the report grammar.
pub fn is_report_name(name: &str) -> bool {
    REPORT_NAME.is_match(name)
}

/// Insertion-ordered `field → value` map with unique keys.
///
/// Re-inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

impl FromIterator<(String, String)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// One histogram report, described by the fields embedded in its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    kind: String,
    scenario: String,
    params: Fields,
    fields: Fields,
    path: PathBuf,
}

impl ParsedRecord {
    /// Parse the file name of `path`. The file itself is never opened.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PlotError::MalformedFilename(path.display().to_string()))?;
        let (kind, scenario, params) = parse_file_name(name)?;

        let mut fields = Fields::new();
        fields.insert(TYPE_FIELD, kind.as_str());
        fields.insert(SCENARIO_FIELD, scenario.as_str());
        for (k, v) in params.iter() {
            fields.insert(k, v);
        }

        Ok(ParsedRecord {
            kind,
            scenario,
            params,
            fields,
            path,
        })
    }

    /// Benchmark category (the `type` field).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn params(&self) -> &Fields {
        &self.params
    }

    /// `type`, `scenario` and every parameter, in file-name order.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a field, failing with `MissingField` when absent.
    pub fn require(&self, field: &str) -> Result<&str> {
        self.fields
            .get(field)
            .ok_or_else(|| PlotError::MissingField {
                field: field.to_string(),
                origin: self.path.display().to_string(),
            })
    }
}

/// Split a report file name into `(type, scenario, params)`.
pub fn parse_file_name(name: &str) -> Result<(String, String, Fields)> {
    let caps = REPORT_NAME
        .captures(name)
        .ok_or_else(|| PlotError::MalformedFilename(name.to_string()))?;

    // Later duplicates overwrite earlier ones.
    let params: Fields = PARAM
        .captures_iter(&caps["params"])
        .map(|p| (p[1].to_string(), p[2].to_string()))
        .collect();

    Ok((caps["type"].to_string(), caps["scenario"].to_string(), params))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "echo_java_instance=c5n.9xlarge_window=2m_mtu=8192_sndbuf=2m_\
                        rcvbuf=2m_rate=100000_batch=1_length=1344-report.hgrm";

    #[test]
    fn parse_simple_name() {
        let (kind, scenario, params) =
            parse_file_name("echo_java_rate=100000_batch=1-report.hgrm").unwrap();
        assert_eq!(kind, "echo");
        assert_eq!(scenario, "java");
        assert_eq!(
            params.into_vec(),
            vec![
                ("rate".to_string(), "100000".to_string()),
                ("batch".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn parse_hyphenated_type_and_dotted_values() {
        let (kind, scenario, params) =
            parse_file_name("live-replay_c-ats_instance=c5n.9xlarge-report.hgrm").unwrap();
        assert_eq!(kind, "live-replay");
        assert_eq!(scenario, "c-ats");
        assert_eq!(params.get("instance"), Some("c5n.9xlarge"));
    }

    #[test]
    fn long_name_keeps_param_order() {
        let record = ParsedRecord::from_path(LONG).unwrap();
        let keys: Vec<&str> = record.fields().keys().collect();
        assert_eq!(
            keys,
            [
                "type", "scenario", "instance", "window", "mtu", "sndbuf", "rcvbuf", "rate",
                "batch", "length"
            ]
        );
        assert_eq!(record.fields().get("length"), Some("1344"));
        assert_eq!(record.path(), Path::new(LONG));
    }

    #[test]
    fn underscore_in_key_is_rejected() {
        // Keys and values never contain `_`, so `so_sndbuf=2m` cannot be parsed.
        assert!(!is_report_name(
            "echo_java_mtu=8192_so_sndbuf=2m_rate=100000-report.hgrm"
        ));
    }

    #[test]
    fn duplicate_keys_last_wins_first_position() {
        let (_, _, params) = parse_file_name("echo_java_a=1_b=2_a=3-report.hgrm").unwrap();
        assert_eq!(
            params.into_vec(),
            vec![
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn param_named_scenario_overrides_header() {
        let record = ParsedRecord::from_path("echo_java_scenario=c-report.hgrm").unwrap();
        assert_eq!(record.kind(), "echo");
        assert_eq!(record.scenario(), "java");
        assert_eq!(record.params().get("scenario"), Some("c"));
        assert_eq!(record.fields().get("scenario"), Some("c"));
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "echo_java-report.hgrm",
            "Echo_java_rate=1-report.hgrm",
            "echo_java_rate=1.hgrm",
            "echo_java_rate=1-report.hgrm.bak",
            "echo_ja=va_rate=1-report.hgrm",
            "echo__rate=1-report.hgrm",
            "echo_java_rate=1-reportXhgrm",
            "notes.txt",
        ] {
            assert!(!is_report_name(name), "{name} should not match");
            assert!(
                matches!(parse_file_name(name), Err(PlotError::MalformedFilename(_))),
                "{name} should be malformed"
            );
        }
    }

    #[test]
    fn require_reports_missing_field() {
        let record = ParsedRecord::from_path("/r/echo_java_rate=1-report.hgrm").unwrap();
        assert_eq!(record.require("rate").unwrap(), "1");
        let err = record.require("msgsize").unwrap_err();
        match err {
            PlotError::MissingField { field, origin } => {
                assert_eq!(field, "msgsize");
                assert!(origin.ends_with("echo_java_rate=1-report.hgrm"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fields_remove_keeps_order() {
        let mut fields: Fields = [("a", "1"), ("b", "2"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(fields.remove("b"), Some("2".to_string()));
        assert_eq!(fields.remove("b"), None);
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["a", "c"]);
    }
}
