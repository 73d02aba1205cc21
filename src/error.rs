use std::path::PathBuf;
use thiserror::Error;

pub type LagResult<T> = Result<T, LagError>;

#[derive(Error, Debug)]
pub enum LagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("The file '{}' was not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported file format '{extension}' for '{file}' (expected csv, tsv, txt, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat { file: String, extension: String },

    #[error("Could not locate a header row in '{file}' within the first {max_rows} rows (need at least {min_score} of: scheduling lag, evenflow flag, appointment count)")]
    HeaderNotFound {
        file: String,
        max_rows: usize,
        min_score: usize,
    },

    #[error("Input file '{file}' is empty or its data could not be read")]
    EmptyInput { file: String },

    #[error("Essential columns missing in '{file}': {missing:?}. Found: {found:?}")]
    MissingColumns {
        file: String,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl LagError {
    /// True for errors caused by the content of the user's file, as opposed
    /// to environment or configuration failures.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LagError::FileNotFound(_)
                | LagError::UnsupportedFormat { .. }
                | LagError::HeaderNotFound { .. }
                | LagError::EmptyInput { .. }
                | LagError::MissingColumns { .. }
                | LagError::Read(_)
        )
    }
}

/// Hint shown alongside any analysis failure.
pub const REQUIRED_COLUMNS_HINT: &str = "Please ensure your file has the correct columns ('scheduling_lag', 'evenflow_flag', 'active_appointment_count') and is not corrupted.";
