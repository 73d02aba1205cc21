//! Excel input and output
//!
//! - Reader: workbook (.xlsx/.xls/.xlsb/.ods) → cell grid
//! - Exporter: validated data + analysis tables → report workbook (.xlsx)

mod exporter;
mod reader;

pub use exporter::{
    section_columns, ReportCell, ReportExporter, Section, ANALYSIS_SHEET, COUNT_TITLE,
    CUMULATIVE_TITLE, RAW_DATA_SHEET, SECTION_GAP, WEEKLY_TITLE,
};
pub use reader::{convert_cell, SheetGrid, WorkbookReader};
