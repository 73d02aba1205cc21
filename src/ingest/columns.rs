//! Column name normalization and canonical field mapping

use crate::config::AnalysisConfig;
use crate::error::{LagError, LagResult};
use crate::types::CanonicalField;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Result of mapping a header row onto the canonical fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    /// Normalized names, with mapped columns renamed to their canonical name
    pub columns: Vec<String>,
    /// Column index claimed by each canonical field
    pub positions: BTreeMap<CanonicalField, usize>,
}

impl ColumnMapping {
    pub fn position(&self, field: CanonicalField) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    /// Canonical fields no column could be mapped to
    pub fn missing(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.positions.contains_key(field))
            .collect()
    }
}

pub struct ColumnMapper<'a> {
    config: &'a AnalysisConfig,
    whitespace: Regex,
}

impl<'a> ColumnMapper<'a> {
    pub fn new(config: &'a AnalysisConfig) -> LagResult<Self> {
        let whitespace = Regex::new(r"\s+")
            .map_err(|e| LagError::Config(format!("Invalid whitespace pattern: {}", e)))?;
        Ok(Self { config, whitespace })
    }

    /// Lowercase, trim, turn whitespace runs into `_`, strip parentheses
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        self.whitespace
            .replace_all(lowered.trim(), "_")
            .chars()
            .filter(|c| *c != '(' && *c != ')')
            .collect()
    }

    /// Normalize every header and rename the first column claiming each
    /// canonical field; everything else passes through
    pub fn map_columns(&self, raw_columns: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::default();

        for (idx, raw) in raw_columns.iter().enumerate() {
            let normalized = self.normalize(raw);
            let claimed = self
                .config
                .field_for(&normalized)
                .filter(|field| !mapping.positions.contains_key(field));

            match claimed {
                Some(field) => {
                    debug!(column = %raw, field = %field, "mapped column");
                    mapping.positions.insert(field, idx);
                    mapping.columns.push(field.as_str().to_string());
                }
                None => mapping.columns.push(normalized),
            }
        }

        mapping
    }
}
