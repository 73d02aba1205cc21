//! Report exporter - validated data + analysis tables → Excel (.xlsx)

use crate::error::{LagError, LagResult};
use crate::types::{
    AnalysisTables, CellValue, CountTable, CumulativeTable, ValidatedTable, WeeklySummary,
    GRAND_TOTAL,
};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

pub const RAW_DATA_SHEET: &str = "Raw_Data";
pub const ANALYSIS_SHEET: &str = "Analysis";

pub const COUNT_TITLE: &str = "Count by Schedule Lag and Flag";
pub const CUMULATIVE_TITLE: &str = "Running Total & Cumulative Percentage";
pub const WEEKLY_TITLE: &str = "% of Total: Within 1 Week";

/// Empty columns between two analysis sections
pub const SECTION_GAP: u16 = 2;

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

const HEADER_FILL: u32 = 0x4F81BD;
const HEADER_FONT: u32 = 0xFFFFFF;
const PERCENT_FORMAT: &str = "0%";

/// A cell of an analysis section
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Number(f64),
    Text(String),
    Blank,
}

/// One titled table of the analysis sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl Section {
    pub fn width(&self) -> u16 {
        self.headers.len().max(1) as u16
    }

    /// Percentage columns are recognised by a `%` in their header
    pub fn is_percent_column(&self, idx: usize) -> bool {
        self.headers.get(idx).is_some_and(|h| h.contains('%'))
    }

    pub fn from_count_table(table: &CountTable) -> Self {
        let mut rows: Vec<Vec<ReportCell>> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![ReportCell::Number(row.scheduling_lag as f64)];
                cells.extend(row.counts.iter().map(|c| ReportCell::Number(*c)));
                cells.push(ReportCell::Number(row.total));
                cells
            })
            .collect();

        if !table.is_empty() {
            let mut totals = vec![ReportCell::Text(GRAND_TOTAL.to_string())];
            totals.extend(table.column_totals.iter().map(|c| ReportCell::Number(*c)));
            totals.push(ReportCell::Number(table.grand_total));
            rows.push(totals);
        }

        Self {
            title: COUNT_TITLE.to_string(),
            headers: table.headers(),
            rows,
        }
    }

    pub fn from_cumulative_table(table: &CumulativeTable) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![ReportCell::Number(row.scheduling_lag as f64)];
                cells.extend(row.running.iter().map(|v| ReportCell::Number(*v)));
                cells.extend(row.percent.iter().map(percent_cell));
                cells
            })
            .collect();

        Self {
            title: CUMULATIVE_TITLE.to_string(),
            headers: table.headers(),
            rows,
        }
    }

    pub fn from_weekly_summary(summary: &WeeklySummary) -> Self {
        let rows = summary
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![ReportCell::Number(row.scheduling_lag as f64)];
                cells.extend(row.percent.iter().map(percent_cell));
                cells
            })
            .collect();

        Self {
            title: WEEKLY_TITLE.to_string(),
            headers: summary.headers(),
            rows,
        }
    }
}

fn percent_cell(value: &Option<f64>) -> ReportCell {
    match value {
        Some(v) => ReportCell::Number(*v),
        None => ReportCell::Blank,
    }
}

/// First column of each section when laid out left to right
pub fn section_columns(sections: &[Section]) -> Vec<u16> {
    let mut starts = Vec::with_capacity(sections.len());
    let mut col: u16 = 0;
    for section in sections {
        starts.push(col);
        col += section.width() + SECTION_GAP;
    }
    starts
}

fn export_err(context: &'static str) -> impl Fn(XlsxError) -> LagError {
    move |e| LagError::Export(format!("Failed to {}: {}", context, e))
}

/// Writes the two-sheet report workbook
pub struct ReportExporter<'a> {
    raw: &'a ValidatedTable,
    tables: &'a AnalysisTables,
}

impl<'a> ReportExporter<'a> {
    pub fn new(raw: &'a ValidatedTable, tables: &'a AnalysisTables) -> Self {
        Self { raw, tables }
    }

    /// Analysis sections in sheet order
    pub fn sections(&self) -> Vec<Section> {
        vec![
            Section::from_count_table(&self.tables.count),
            Section::from_cumulative_table(&self.tables.cumulative),
            Section::from_weekly_summary(&self.tables.weekly),
        ]
    }

    /// Export the report to an .xlsx file
    pub fn export(&self, output_path: &Path) -> LagResult<()> {
        let mut workbook = Workbook::new();

        self.write_raw_sheet(workbook.add_worksheet())?;
        self.write_analysis_sheet(workbook.add_worksheet())?;

        workbook
            .save(output_path)
            .map_err(|e| LagError::Export(format!("Failed to save Excel file: {}", e)))?;

        info!(path = %output_path.display(), "report written");
        Ok(())
    }

    fn write_raw_sheet(&self, worksheet: &mut Worksheet) -> LagResult<()> {
        worksheet
            .set_name(RAW_DATA_SHEET)
            .map_err(export_err("set worksheet name"))?;

        let header_format = Format::new().set_bold();
        for (col_idx, name) in self.raw.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_idx as u16, name, &header_format)
                .map_err(export_err("write header"))?;
        }

        for (row_idx, row) in self.raw.rows.iter().enumerate() {
            let excel_row = row_idx as u32 + 1;
            for (col_idx, cell) in row.iter().enumerate() {
                let col = col_idx as u16;
                match cell {
                    CellValue::Number(n) => {
                        worksheet
                            .write_number(excel_row, col, *n)
                            .map_err(export_err("write number"))?;
                    }
                    CellValue::Text(s) if !s.is_empty() => {
                        worksheet
                            .write_string(excel_row, col, s)
                            .map_err(export_err("write text"))?;
                    }
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(excel_row, col, *b)
                            .map_err(export_err("write boolean"))?;
                    }
                    _ => {}
                }
            }
        }

        worksheet.autofit();
        Ok(())
    }

    fn write_analysis_sheet(&self, worksheet: &mut Worksheet) -> LagResult<()> {
        worksheet
            .set_name(ANALYSIS_SHEET)
            .map_err(export_err("set worksheet name"))?;

        let title_format = Format::new().set_bold().set_font_size(14);
        let header_format = Format::new()
            .set_bold()
            .set_font_color(HEADER_FONT)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let percent_format = Format::new().set_num_format(PERCENT_FORMAT);

        let sections = self.sections();
        for (section, start_col) in sections.iter().zip(section_columns(&sections)) {
            worksheet
                .write_string_with_format(TITLE_ROW, start_col, &section.title, &title_format)
                .map_err(export_err("write title"))?;

            for (idx, header) in section.headers.iter().enumerate() {
                worksheet
                    .write_string_with_format(HEADER_ROW, start_col + idx as u16, header, &header_format)
                    .map_err(export_err("write header"))?;
            }

            for (row_idx, row) in section.rows.iter().enumerate() {
                let excel_row = FIRST_DATA_ROW + row_idx as u32;
                for (idx, cell) in row.iter().enumerate() {
                    let col = start_col + idx as u16;
                    let is_percent = section.is_percent_column(idx);
                    match cell {
                        ReportCell::Number(n) if is_percent => {
                            worksheet
                                .write_number_with_format(excel_row, col, *n, &percent_format)
                                .map_err(export_err("write percentage"))?;
                        }
                        ReportCell::Number(n) => {
                            worksheet
                                .write_number(excel_row, col, *n)
                                .map_err(export_err("write number"))?;
                        }
                        ReportCell::Text(s) => {
                            worksheet
                                .write_string(excel_row, col, s)
                                .map_err(export_err("write text"))?;
                        }
                        ReportCell::Blank if is_percent => {
                            worksheet
                                .write_blank(excel_row, col, &percent_format)
                                .map_err(export_err("write blank"))?;
                        }
                        ReportCell::Blank => {}
                    }
                }
            }
        }

        worksheet.autofit();
        Ok(())
    }
}
