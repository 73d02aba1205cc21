//! Data loader and validator
//!
//! Reads the table below the detected header, maps its columns onto the
//! canonical fields and coerces every row. Rows with a missing or unparseable
//! canonical value are dropped; they are never repaired.

use crate::config::AnalysisConfig;
use crate::error::{LagError, LagResult};
use crate::excel::WorkbookReader;
use crate::ingest::columns::{ColumnMapper, ColumnMapping};
use crate::ingest::locator::{file_label, HeaderLocator};
use crate::types::{format_number_label, CanonicalField, CellValue, RawRecord, RawTable, ValidatedTable};
use std::path::Path;
use tracing::info;

/// Kind of input, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma/tab/semicolon separated text
    Delimited,
    /// Spreadsheet workbook
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> LagResult<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(InputFormat::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(InputFormat::Workbook),
            _ => Err(LagError::UnsupportedFormat {
                file: file_label(path),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

/// Everything learned while loading one file
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub format: InputFormat,
    /// Zero-based row (text line or sheet row) of the header
    pub header_row: usize,
    /// Detected delimiter, for delimited input
    pub delimiter: Option<u8>,
    /// Worksheet read, for workbook input
    pub sheet_name: Option<String>,
    /// Header names as they appear in the file
    pub raw_columns: Vec<String>,
    pub mapping: ColumnMapping,
    pub table: ValidatedTable,
}

pub struct DataLoader<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DataLoader<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load and validate a file
    pub fn load(&self, path: &Path) -> LagResult<ValidatedTable> {
        Ok(self.load_with_details(path)?.table)
    }

    /// Load and validate a file, keeping header detection details
    pub fn load_with_details(&self, path: &Path) -> LagResult<LoadedInput> {
        if !path.exists() {
            return Err(LagError::FileNotFound(path.to_path_buf()));
        }
        let format = InputFormat::from_path(path)?;
        let file = file_label(path);

        let (raw, header_row, delimiter, sheet_name) = match format {
            InputFormat::Delimited => {
                let bytes = std::fs::read(path)?;
                let content = String::from_utf8_lossy(&bytes);
                let content = content.trim_start_matches('\u{feff}');
                let header = HeaderLocator::new(self.config).locate_in_text(content, &file)?;
                let raw = read_delimited(skip_lines(content, header.row_index), header.delimiter)?;
                (raw, header.row_index, Some(header.delimiter), None)
            }
            InputFormat::Workbook => {
                let grid = WorkbookReader::new(path).read_active_sheet()?;
                let header_row = HeaderLocator::new(self.config).locate_in_rows(&grid.rows, &file)?;
                let raw = table_from_grid(&grid.rows, header_row);
                (raw, header_row, None, Some(grid.name))
            }
        };

        let raw_columns = raw.columns.clone();
        let (table, mapping) = self.validate(raw, &file)?;

        Ok(LoadedInput {
            format,
            header_row,
            delimiter,
            sheet_name,
            raw_columns,
            mapping,
            table,
        })
    }

    /// Map columns, coerce the canonical fields and drop incomplete rows
    pub fn validate(&self, raw: RawTable, file: &str) -> LagResult<(ValidatedTable, ColumnMapping)> {
        if raw.rows.is_empty() {
            return Err(LagError::EmptyInput {
                file: file.to_string(),
            });
        }

        let mapping = ColumnMapper::new(self.config)?.map_columns(&raw.columns);
        let (lag_pos, flag_pos, count_pos) = match (
            mapping.position(CanonicalField::SchedulingLag),
            mapping.position(CanonicalField::EvenflowFlag),
            mapping.position(CanonicalField::ActiveAppointmentCount),
        ) {
            (Some(lag), Some(flag), Some(count)) => (lag, flag, count),
            _ => {
                return Err(LagError::MissingColumns {
                    file: file.to_string(),
                    missing: mapping
                        .missing()
                        .iter()
                        .map(|field| field.as_str().to_string())
                        .collect(),
                    found: mapping.columns.clone(),
                })
            }
        };

        let mut table = ValidatedTable {
            columns: mapping.columns.clone(),
            ..Default::default()
        };

        for mut row in raw.rows {
            let lag = self.coerce_number(&row[lag_pos], false);
            let flag = self.coerce_flag(&row[flag_pos]);
            let count = self.coerce_number(&row[count_pos], true);

            let (Some(lag), Some(flag), Some(count)) = (lag, flag, count) else {
                table.dropped_rows += 1;
                continue;
            };

            let lag = lag.trunc() as i64;
            row[lag_pos] = CellValue::Number(lag as f64);
            row[flag_pos] = CellValue::Text(flag.clone());
            row[count_pos] = CellValue::Number(count);

            table.records.push(RawRecord::new(lag, flag, count));
            table.rows.push(row);
        }

        info!(
            file,
            kept = table.records.len(),
            dropped = table.dropped_rows,
            "validated input rows"
        );

        Ok((table, mapping))
    }

    /// Numeric value of a cell; text is parsed after optionally removing
    /// thousands separators
    pub fn coerce_number(&self, cell: &CellValue, strip_commas: bool) -> Option<f64> {
        let value = match cell {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => {
                if self.config.is_missing_marker(s) {
                    return None;
                }
                let cleaned = if strip_commas {
                    s.replace(',', "")
                } else {
                    s.clone()
                };
                cleaned.trim().parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    /// Flag label of a cell; numbers are stringified
    pub fn coerce_flag(&self, cell: &CellValue) -> Option<String> {
        match cell {
            CellValue::Empty => None,
            CellValue::Text(s) if self.config.is_missing_marker(s) => None,
            CellValue::Number(n) if !n.is_finite() => None,
            CellValue::Number(n) => Some(format_number_label(*n)),
            other => Some(other.to_label()),
        }
    }
}

/// Text after the first `n` lines
fn skip_lines(content: &str, n: usize) -> &str {
    if n == 0 {
        return content;
    }
    match content.match_indices('\n').nth(n - 1) {
        Some((offset, _)) => &content[offset + 1..],
        None => "",
    }
}

/// Parse delimited text whose first line is the header
fn read_delimited(text: &str, delimiter: u8) -> LagResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LagError::Read(format!("Failed to read header: {}", e)))?
        .clone();

    let mut records = Vec::new();
    let mut width = headers.len();
    for result in reader.records() {
        let record = result.map_err(|e| LagError::Read(format!("Failed to read row: {}", e)))?;
        let cells: Vec<CellValue> = record
            .iter()
            .map(|field| CellValue::Text(field.to_string()))
            .collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        width = width.max(cells.len());
        records.push(cells);
    }

    let header_cells: Vec<CellValue> = headers
        .iter()
        .map(|name| CellValue::Text(name.to_string()))
        .collect();
    let mut table = RawTable::new(column_names(&header_cells, width));
    for cells in records {
        table.push_row(cells);
    }
    Ok(table)
}

/// Table below `header_row` of a worksheet grid
fn table_from_grid(rows: &[Vec<CellValue>], header_row: usize) -> RawTable {
    let body = rows.get(header_row + 1..).unwrap_or(&[]);
    let width = rows[header_row]
        .len()
        .max(body.iter().map(Vec::len).max().unwrap_or(0));

    let mut table = RawTable::new(column_names(&rows[header_row], width));
    for row in body {
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(row.clone());
    }
    table
}

/// Header labels padded to `width`; blank headers become `unnamed_<index>`
fn column_names(header: &[CellValue], width: usize) -> Vec<String> {
    (0..width)
        .map(|idx| match header.get(idx) {
            Some(cell) if !cell.to_label().trim().is_empty() => cell.to_label(),
            _ => format!("unnamed_{}", idx),
        })
        .collect()
}
