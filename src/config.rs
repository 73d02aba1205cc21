//! Analysis configuration
//!
//! Every tunable of the pipeline lives in one immutable [`AnalysisConfig`]:
//! the keyword rules that recognise the canonical columns, the header
//! detection thresholds, the delimiter sniff sample size, the markers treated
//! as missing values and the weekly cutoff. A YAML file may override any
//! subset of keys.

use crate::error::{LagError, LagResult};
use crate::types::CanonicalField;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_MIN_HEADER_SCORE: usize = 2;
pub const DEFAULT_MAX_HEADER_SCAN_ROWS: usize = 20;
pub const DEFAULT_SNIFF_SAMPLE_BYTES: usize = 4096;
pub const DEFAULT_WEEKLY_CUTOFF_DAYS: i64 = 7;

/// Keywords that must all appear in a header for it to map to `field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub keywords: Vec<String>,
}

impl FieldRule {
    pub fn new(field: CanonicalField, keywords: &[&str]) -> Self {
        Self {
            field,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// `text` must already be lowercase
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().all(|kw| text.contains(kw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ordered rule table; the first matching rule claims a header
    pub field_rules: Vec<FieldRule>,
    /// Minimum number of matched fields for a row to count as the header
    pub min_header_score: usize,
    /// Rows scanned from the top of the input when looking for the header
    pub max_header_scan_rows: usize,
    /// Bytes of a delimited file handed to the delimiter sniffer
    pub sniff_sample_bytes: usize,
    /// Largest lag (inclusive) kept in the weekly summary
    pub weekly_cutoff_days: i64,
    /// Cell texts treated as missing values
    pub missing_markers: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            field_rules: vec![
                FieldRule::new(CanonicalField::SchedulingLag, &["scheduling", "lag"]),
                FieldRule::new(CanonicalField::EvenflowFlag, &["evenflow", "flag"]),
                FieldRule::new(
                    CanonicalField::ActiveAppointmentCount,
                    &["count", "appointment"],
                ),
            ],
            min_header_score: DEFAULT_MIN_HEADER_SCORE,
            max_header_scan_rows: DEFAULT_MAX_HEADER_SCAN_ROWS,
            sniff_sample_bytes: DEFAULT_SNIFF_SAMPLE_BYTES,
            weekly_cutoff_days: DEFAULT_WEEKLY_CUTOFF_DAYS,
            missing_markers: ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Load overrides from a YAML file
    pub fn from_yaml_file(path: &Path) -> LagResult<Self> {
        if !path.exists() {
            return Err(LagError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse overrides from YAML text; absent keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> LagResult<Self> {
        let mut config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        for rule in &mut config.field_rules {
            for kw in &mut rule.keywords {
                *kw = kw.trim().to_lowercase();
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> LagResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations the locator and loader cannot work with
    pub fn validate(&self) -> LagResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.field_rules {
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.is_empty()) {
                return Err(LagError::Config(format!(
                    "rule for '{}' needs at least one non-empty keyword",
                    rule.field
                )));
            }
            if !seen.insert(rule.field) {
                return Err(LagError::Config(format!(
                    "field '{}' has more than one rule",
                    rule.field
                )));
            }
        }

        for field in CanonicalField::ALL {
            if !seen.contains(&field) {
                return Err(LagError::Config(format!("no rule for field '{}'", field)));
            }
        }

        if self.min_header_score == 0 || self.min_header_score > self.field_rules.len() {
            return Err(LagError::Config(format!(
                "min_header_score must be between 1 and {}",
                self.field_rules.len()
            )));
        }

        if self.max_header_scan_rows == 0 {
            return Err(LagError::Config(
                "max_header_scan_rows must be at least 1".to_string(),
            ));
        }

        if self.sniff_sample_bytes == 0 {
            return Err(LagError::Config(
                "sniff_sample_bytes must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Canonical field claimed by a lowercase header, if any
    pub fn field_for(&self, text: &str) -> Option<CanonicalField> {
        self.field_rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.field)
    }

    pub fn is_missing_marker(&self, text: &str) -> bool {
        let trimmed = text.trim();
        self.missing_markers.iter().any(|m| m == trimmed)
    }
}
