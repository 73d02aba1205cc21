//! Heuristic header row detection
//!
//! Exports from the scheduling tool often start with a title block, filter
//! descriptions or blank rows before the real column header. The locator scans
//! the top of the input and scores each row by how many canonical fields it
//! mentions; the best row at or above the configured threshold is the header.

use crate::config::AnalysisConfig;
use crate::error::{LagError, LagResult};
use crate::ingest::sniffer::{display_delimiter, fallback_delimiter, sniff_delimiter};
use crate::types::CellValue;
use std::path::Path;
use tracing::{info, warn};

/// A scored row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCandidate {
    pub row_index: usize,
    pub score: usize,
}

/// Header position and delimiter of a delimited text file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedHeader {
    /// Zero-based physical line of the header
    pub row_index: usize,
    pub delimiter: u8,
}

pub struct HeaderLocator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> HeaderLocator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Number of canonical fields matched by at least one lowercase token
    pub fn score_tokens(&self, tokens: &[String]) -> usize {
        self.config
            .field_rules
            .iter()
            .filter(|rule| tokens.iter().any(|token| rule.matches(token)))
            .count()
    }

    /// Locate header and delimiter of a delimited file on disk
    pub fn locate_delimited(&self, path: &Path) -> LagResult<DelimitedHeader> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        self.locate_in_text(&content, &file_label(path))
    }

    /// Locate header and delimiter in already-decoded text
    pub fn locate_in_text(&self, content: &str, file: &str) -> LagResult<DelimitedHeader> {
        let delimiter = self.detect_delimiter(content);

        match self.scan_lines(content, delimiter) {
            Some(candidate) => {
                info!(
                    file,
                    row = candidate.row_index + 1,
                    score = candidate.score,
                    delimiter = %display_delimiter(delimiter),
                    "header detected"
                );
                Ok(DelimitedHeader {
                    row_index: candidate.row_index,
                    delimiter,
                })
            }
            None => Err(self.not_found(file)),
        }
    }

    /// Sniff the delimiter from the configured sample, falling back on the
    /// first line when sniffing is inconclusive
    pub fn detect_delimiter(&self, content: &str) -> u8 {
        let sample = truncate_to_boundary(content, self.config.sniff_sample_bytes);
        match sniff_delimiter(sample, sample.len() < content.len()) {
            Some(delimiter) => delimiter,
            None => {
                let first_line = content.lines().next().unwrap_or("");
                let delimiter = fallback_delimiter(first_line);
                warn!(
                    delimiter = %display_delimiter(delimiter),
                    "delimiter sniffing inconclusive, using fallback"
                );
                delimiter
            }
        }
    }

    /// Best eligible line; only strictly higher scores replace an earlier row
    pub fn scan_lines(&self, content: &str, delimiter: u8) -> Option<HeaderCandidate> {
        let delimiter = delimiter as char;
        let mut best: Option<HeaderCandidate> = None;

        for (row_index, line) in content
            .lines()
            .take(self.config.max_header_scan_rows)
            .enumerate()
        {
            let lowered = line.to_lowercase();
            let tokens: Vec<String> = lowered.split(delimiter).map(str::to_string).collect();
            let score = self.score_tokens(&tokens);

            let beats_best = best.map_or(true, |b| score > b.score);
            if score >= self.config.min_header_score && beats_best {
                best = Some(HeaderCandidate { row_index, score });
            }
        }

        best
    }

    /// Locate the header row in a worksheet grid
    pub fn locate_in_rows(&self, rows: &[Vec<CellValue>], file: &str) -> LagResult<usize> {
        match self.scan_rows(rows) {
            Some(candidate) if candidate.score >= self.config.min_header_score => {
                info!(
                    file,
                    row = candidate.row_index + 1,
                    score = candidate.score,
                    "worksheet header detected"
                );
                Ok(candidate.row_index)
            }
            _ => Err(self.not_found(file)),
        }
    }

    /// Best row of any score among non-empty rows; the threshold is applied
    /// by the caller once the scan is complete
    pub fn scan_rows(&self, rows: &[Vec<CellValue>]) -> Option<HeaderCandidate> {
        let mut best: Option<HeaderCandidate> = None;

        for (row_index, row) in rows
            .iter()
            .take(self.config.max_header_scan_rows)
            .enumerate()
        {
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            let tokens: Vec<String> = row
                .iter()
                .filter(|cell| !cell.is_empty())
                .map(|cell| cell.to_label().to_lowercase())
                .collect();
            let score = self.score_tokens(&tokens);

            if best.map_or(true, |b| score > b.score) {
                best = Some(HeaderCandidate { row_index, score });
            }
        }

        best
    }

    fn not_found(&self, file: &str) -> LagError {
        LagError::HeaderNotFound {
            file: file.to_string(),
            max_rows: self.config.max_header_scan_rows,
            min_score: self.config.min_header_score,
        }
    }
}

/// File name used in messages
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate_to_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
