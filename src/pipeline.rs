//! Orchestration of one analysis run
//!
//! Loader → Aggregator → Exporter, either on a file already on disk
//! ([`analyze_file`]) or on uploaded bytes ([`run_full_analysis`]). Uploads
//! are copied into a private temporary directory that is removed when the run
//! ends, whether it succeeded or not.

use crate::config::AnalysisConfig;
use crate::core::Aggregator;
use crate::error::{LagError, LagResult};
use crate::excel::ReportExporter;
use crate::ingest::{DataLoader, InputFormat};
use crate::types::{AnalysisTables, WeeklySummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Prefix of every generated report file name
pub const REPORT_PREFIX: &str = "Scheduling_Lag_Calculation_Output_";
pub const REPORT_EXTENSION: &str = "xlsx";

/// A file handed over by the upload surface
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original name, used for the extension and the report name
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub weekly: WeeklySummary,
    pub output_path: PathBuf,
    /// Rows that survived validation
    pub records: usize,
    pub dropped_rows: usize,
    /// Directory name of an upload run under the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip)]
    pub tables: AnalysisTables,
}

/// Run the full pipeline on a file on disk and write the report to `output`
pub fn analyze_file(input: &Path, output: &Path, config: &AnalysisConfig) -> LagResult<AnalysisOutcome> {
    info!(input = %input.display(), "analysis started");

    let raw = DataLoader::new(config).load(input)?;
    let tables = Aggregator::from_config(config).aggregate(&raw.records);
    ReportExporter::new(&raw, &tables).export(output)?;

    Ok(AnalysisOutcome {
        weekly: tables.weekly.clone(),
        output_path: output.to_path_buf(),
        records: raw.len(),
        dropped_rows: raw.dropped_rows,
        run_id: None,
        tables,
    })
}

/// Persist an upload to a temporary location, analyse it and write the
/// report into a fresh `output_dir/<run_id>/` directory; the temporary copy
/// is always removed, and so is the run directory when the run fails
pub fn run_full_analysis(
    upload: &UploadedFile,
    config: &AnalysisConfig,
    output_dir: &Path,
) -> LagResult<AnalysisOutcome> {
    let upload_name = safe_upload_name(&upload.file_name);
    InputFormat::from_path(Path::new(&upload_name))?;

    let workdir = tempfile::Builder::new()
        .prefix("schedlag-upload-")
        .tempdir()?;
    let input_path = workdir.path().join(&upload_name);
    std::fs::write(&input_path, &upload.bytes)?;

    let run_id = Uuid::new_v4().to_string();
    let run_dir = output_dir.join(&run_id);
    std::fs::create_dir_all(&run_dir)?;

    let output_path = run_dir.join(report_file_name(&upload.file_name));
    let outcome = analyze_file(&input_path, &output_path, config).map(|outcome| AnalysisOutcome {
        run_id: Some(run_id),
        ..outcome
    });

    let workdir_path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        warn!(path = %workdir_path.display(), error = %e, "failed to remove temporary upload");
    }
    if outcome.is_err() {
        if let Err(e) = std::fs::remove_dir_all(&run_dir) {
            warn!(path = %run_dir.display(), error = %e, "failed to remove run directory");
        }
    }

    outcome
}

/// Location of a report produced by [`run_full_analysis`], or `None` when
/// either component is not a name the pipeline generates
pub fn report_path(output_dir: &Path, run_id: &str, report_file: &str) -> Option<PathBuf> {
    let is_run_id = Uuid::parse_str(run_id).is_ok_and(|id| id.hyphenated().to_string() == run_id);
    (is_run_id && is_report_file_name(report_file))
        .then(|| output_dir.join(run_id).join(report_file))
}

/// `Scheduling_Lag_Calculation_Output_<stem>.xlsx` for an uploaded file name
pub fn report_file_name(original: &str) -> String {
    let stem = Path::new(&base_name(original))
        .file_stem()
        .map(|s| sanitize(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    format!("{}{}.{}", REPORT_PREFIX, stem, REPORT_EXTENSION)
}

/// True for names `report_file_name` can produce
pub fn is_report_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_prefix(REPORT_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{}", REPORT_EXTENSION)))
    else {
        return false;
    };
    !stem.is_empty() && stem.chars().all(is_safe_char)
}

/// Upload name reduced to its final component with unsafe characters replaced
pub fn safe_upload_name(original: &str) -> String {
    let name = sanitize(&base_name(original));
    if name.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        name
    }
}

/// Final path component, accepting both separators
fn base_name(original: &str) -> String {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .to_string()
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect()
}

/// Default report location for the CLI: next to the input file
pub fn default_output_path(input: &Path) -> LagResult<PathBuf> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LagError::FileNotFound(input.to_path_buf()))?;
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(report_file_name(&name)))
}
