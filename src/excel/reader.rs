//! Workbook reader - spreadsheet (.xlsx/.xls/.xlsb/.ods) → cell grid

use crate::error::{LagError, LagResult};
use crate::types::CellValue;
use calamine::{open_workbook_auto, Data, Range, Reader, SheetType, SheetVisible};
use std::path::{Path, PathBuf};

/// Cells of one worksheet, indexed by absolute sheet position (row 0 is the
/// first row of the sheet even when the used range starts lower)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

/// Reads the worksheet a user would see first when opening the file
pub struct WorkbookReader {
    path: PathBuf,
}

impl WorkbookReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the first visible worksheet
    pub fn read_active_sheet(&self) -> LagResult<SheetGrid> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| LagError::Read(format!("Failed to open workbook: {}", e)))?;

        let sheet_name = workbook
            .sheets_metadata()
            .iter()
            .find(|sheet| sheet.typ == SheetType::WorkSheet && sheet.visible == SheetVisible::Visible)
            .map(|sheet| sheet.name.clone())
            .or_else(|| workbook.sheet_names().first().cloned())
            .ok_or_else(|| LagError::Read("Workbook contains no sheets".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            LagError::Read(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        Ok(SheetGrid {
            name: sheet_name,
            rows: range_to_rows(&range),
        })
    }
}

/// Expand a used range into absolute rows, padding the area above and to the
/// left of the range with empty cells
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    rows
}

/// Map a calamine cell onto the shared cell model
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
