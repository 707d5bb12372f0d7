// ABOUTME: PipelineOptions: where case numbers come from, when jobs run, and where output goes.
// ABOUTME: Loaded from a JSON file with every field defaulted; builds the portal client from its settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use nyaya_portal::{
    Client, Options, DEFAULT_BASE_URL, DEFAULT_CASE_DETAILS_PATH, DEFAULT_STATUS_URL,
    DETAIL_LINK_TEXT,
};
use nyaya_records::{is_valid_case_number, read_case_column};
use serde::{Deserialize, Serialize};

/// Cases tracked when no configuration names any.
pub const DEFAULT_CASES: [&str; 9] = [
    "080-CR-0096",
    "080-CR-0126",
    "080-CR-0199",
    "080-CR-0187",
    "080-CR-0190",
    "080-CR-0202",
    "080-CR-0212",
    "081-CR-0001",
    "081-CR-0002",
];

pub const DEFAULT_SCHEDULE: [&str; 2] = ["10:30", "17:30"];

/// Where the case numbers for a run come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSource {
    List(Vec<String>),
    /// A named column of a CSV file.
    File { path: PathBuf, column: String },
}

impl Default for CaseSource {
    fn default() -> Self {
        CaseSource::List(DEFAULT_CASES.iter().map(|c| c.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalSettings {
    pub base_url: String,
    pub case_details_path: String,
    pub status_url: String,
    pub records_marker: String,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            case_details_path: DEFAULT_CASE_DETAILS_PATH.to_string(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            records_marker: DETAIL_LINK_TEXT.to_string(),
            user_agent: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    pub case_source: CaseSource,
    /// `HH:MM` trigger times, local clock.
    pub schedule_times: Vec<String>,
    pub store_path: PathBuf,
    pub status_path: PathBuf,
    pub log_path: PathBuf,
    pub tls_verification: bool,
    pub portal: PortalSettings,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            case_source: CaseSource::default(),
            schedule_times: DEFAULT_SCHEDULE.iter().map(|t| t.to_string()).collect(),
            store_path: PathBuf::from("case_details.json"),
            status_path: PathBuf::from("daily_case_status.csv"),
            log_path: PathBuf::from("nyaya.log"),
            tls_verification: false,
            portal: PortalSettings::default(),
        }
    }
}

impl PipelineOptions {
    /// Reads options from a JSON file and validates them.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let opts: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        self.trigger_times()?;
        if self.portal.timeout_secs == 0 {
            bail!("portal.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Parsed schedule times, sorted, without duplicates.
    pub fn trigger_times(&self) -> Result<Vec<NaiveTime>> {
        let mut times = self
            .schedule_times
            .iter()
            .map(|s| parse_trigger_time(s))
            .collect::<Result<Vec<_>>>()?;
        if times.is_empty() {
            bail!("schedule_times must name at least one time");
        }
        times.sort();
        times.dedup();
        Ok(times)
    }

    /// Resolves the case source into well-formed case numbers. Malformed entries are
    /// logged and skipped.
    pub fn case_numbers(&self) -> Result<Vec<String>> {
        match &self.case_source {
            CaseSource::List(cases) => Ok(cases
                .iter()
                .map(|c| c.trim())
                .filter(|c| {
                    let ok = is_valid_case_number(c);
                    if !ok {
                        tracing::warn!(case_number = %c, "skipping malformed case number");
                    }
                    ok
                })
                .map(str::to_string)
                .collect()),
            CaseSource::File { path, column } => Ok(read_case_column(path, column)?),
        }
    }

    /// Portal client configured from these options.
    pub fn client(&self) -> Client {
        let defaults = Options::default();
        let portal = &self.portal;
        Client::builder()
            .base_url(&portal.base_url)
            .case_details_path(&portal.case_details_path)
            .status_url(&portal.status_url)
            .records_marker(&portal.records_marker)
            .user_agent(portal.user_agent.clone().unwrap_or(defaults.user_agent))
            .timeout(Duration::from_secs(portal.timeout_secs))
            .tls_verification(self.tls_verification)
            .build()
    }
}

/// Parses an `HH:MM` trigger time.
pub fn parse_trigger_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    let valid_shape = s.len() == 5
        && s.as_bytes()[2] == b':'
        && s.bytes().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !valid_shape {
        bail!("invalid schedule time {:?}, expected HH:MM", s);
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("invalid schedule time {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let opts = PipelineOptions::default();
        assert_eq!(opts.case_numbers().unwrap().len(), 9);
        assert_eq!(
            opts.trigger_times().unwrap(),
            vec![
                NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 30, 0).unwrap()
            ]
        );
        assert!(!opts.tls_verification);
        assert_eq!(opts.portal.records_marker, DETAIL_LINK_TEXT);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"case_source": {{"list": ["080-CR-0096", "bad", " 081-CR-0001 "]}},
                "schedule_times": ["09:00"],
                "portal": {{"timeout_secs": 5}}}}"#
        )
        .unwrap();

        let opts = PipelineOptions::load(file.path()).unwrap();
        assert_eq!(
            opts.case_numbers().unwrap(),
            vec!["080-CR-0096".to_string(), "081-CR-0001".to_string()]
        );
        assert_eq!(opts.portal.timeout_secs, 5);
        assert_eq!(opts.portal.base_url, DEFAULT_BASE_URL);
        assert_eq!(opts.store_path, PathBuf::from("case_details.json"));
    }

    #[test]
    fn test_file_case_source() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("cases.csv");
        fs::write(&csv, "id,Case Number\n1,080-CR-0199\n2,\n3,080-CR-0187\n").unwrap();

        let opts = PipelineOptions {
            case_source: CaseSource::File {
                path: csv,
                column: "Case Number".to_string(),
            },
            ..Default::default()
        };
        assert_eq!(
            opts.case_numbers().unwrap(),
            vec!["080-CR-0199".to_string(), "080-CR-0187".to_string()]
        );
    }

    #[test]
    fn test_case_source_json_shape() {
        let source: CaseSource =
            serde_json::from_str(r#"{"file": {"path": "cases.csv", "column": "regno"}}"#).unwrap();
        assert_eq!(
            source,
            CaseSource::File {
                path: PathBuf::from("cases.csv"),
                column: "regno".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_bad_times_and_unknown_fields() {
        assert!(parse_trigger_time("10:30").is_ok());
        assert!(parse_trigger_time("9:30").is_err());
        assert!(parse_trigger_time("24:00").is_err());
        assert!(parse_trigger_time("10-30").is_err());

        let opts = PipelineOptions {
            schedule_times: vec![],
            ..Default::default()
        };
        assert!(opts.validate().is_err());

        assert!(serde_json::from_str::<PipelineOptions>(r#"{"store": "x.json"}"#).is_err());
    }
}
