//! Excel report tests
//!
//! Reports are written with the exporter and read back with calamine.

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use pretty_assertions::assert_eq;
use schedlag::core::Aggregator;
use schedlag::excel::{
    section_columns, ReportExporter, WorkbookReader, ANALYSIS_SHEET, COUNT_TITLE,
    CUMULATIVE_TITLE, RAW_DATA_SHEET, WEEKLY_TITLE,
};
use schedlag::types::{AnalysisTables, CellValue, RawRecord, ValidatedTable};
use std::path::Path;
use tempfile::TempDir;

fn validated(records: &[RawRecord]) -> ValidatedTable {
    ValidatedTable {
        columns: vec![
            "scheduling_lag".to_string(),
            "evenflow_flag".to_string(),
            "active_appointment_count".to_string(),
            "region".to_string(),
        ],
        rows: records
            .iter()
            .map(|r| {
                vec![
                    CellValue::Number(r.scheduling_lag as f64),
                    CellValue::Text(r.evenflow_flag.clone()),
                    CellValue::Number(r.active_appointment_count),
                    CellValue::Text("North".to_string()),
                ]
            })
            .collect(),
        records: records.to_vec(),
        dropped_rows: 0,
    }
}

fn sample() -> (ValidatedTable, AnalysisTables) {
    let records = vec![
        RawRecord::new(0, "A", 10.0),
        RawRecord::new(1, "A", 5.0),
        RawRecord::new(1, "B", 2.0),
        RawRecord::new(10, "C", 0.0),
    ];
    let tables = Aggregator::default().aggregate(&records);
    (validated(&records), tables)
}

fn export_sample(dir: &TempDir) -> std::path::PathBuf {
    let (raw, tables) = sample();
    let path = dir.path().join("report.xlsx");
    ReportExporter::new(&raw, &tables).export(&path).unwrap();
    path
}

fn sheet(path: &Path, name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_range(name).unwrap()
}

fn text_at(range: &Range<Data>, row: u32, col: u32) -> Option<String> {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn number_at(range: &Range<Data>, row: u32, col: u32) -> Option<f64> {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => Some(*f),
        Some(Data::Int(i)) => Some(*i as f64),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKBOOK STRUCTURE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_report_has_two_sheets_in_order() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);

    let workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec![RAW_DATA_SHEET, ANALYSIS_SHEET]);
}

#[test]
fn test_raw_data_sheet_contents() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);
    let raw = sheet(&path, RAW_DATA_SHEET);

    assert_eq!(text_at(&raw, 0, 0).as_deref(), Some("scheduling_lag"));
    assert_eq!(text_at(&raw, 0, 3).as_deref(), Some("region"));
    assert_eq!(number_at(&raw, 1, 0), Some(0.0));
    assert_eq!(text_at(&raw, 1, 1).as_deref(), Some("A"));
    assert_eq!(number_at(&raw, 2, 2), Some(5.0));
    assert_eq!(raw.height(), 5);
}

// ═══════════════════════════════════════════════════════════════════════════
// ANALYSIS SHEET TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_analysis_sections_side_by_side() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);
    let analysis = sheet(&path, ANALYSIS_SHEET);

    let (raw, tables) = sample();
    let exporter = ReportExporter::new(&raw, &tables);
    let starts = section_columns(&exporter.sections());
    // count: lag + 3 flags + total; cumulative: lag + 3 + 3
    assert_eq!(starts, vec![0, 7, 16]);

    assert_eq!(text_at(&analysis, 0, 0).as_deref(), Some(COUNT_TITLE));
    assert_eq!(text_at(&analysis, 0, 7).as_deref(), Some(CUMULATIVE_TITLE));
    assert_eq!(text_at(&analysis, 0, 16).as_deref(), Some(WEEKLY_TITLE));
}

#[test]
fn test_count_section_values() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);
    let analysis = sheet(&path, ANALYSIS_SHEET);

    let headers: Vec<Option<String>> = (0..5).map(|c| text_at(&analysis, 1, c)).collect();
    assert_eq!(
        headers,
        vec![
            Some("scheduling_lag".to_string()),
            Some("A".to_string()),
            Some("B".to_string()),
            Some("C".to_string()),
            Some("Grand Total".to_string()),
        ]
    );

    // lag 1 row
    assert_eq!(number_at(&analysis, 3, 0), Some(1.0));
    assert_eq!(number_at(&analysis, 3, 1), Some(5.0));
    assert_eq!(number_at(&analysis, 3, 2), Some(2.0));
    assert_eq!(number_at(&analysis, 3, 4), Some(7.0));

    // Grand Total row after the three lag rows
    assert_eq!(text_at(&analysis, 5, 0).as_deref(), Some("Grand Total"));
    assert_eq!(number_at(&analysis, 5, 1), Some(15.0));
    assert_eq!(number_at(&analysis, 5, 4), Some(17.0));
}

#[test]
fn test_cumulative_section_percentages() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);
    let analysis = sheet(&path, ANALYSIS_SHEET);

    assert_eq!(text_at(&analysis, 1, 11).as_deref(), Some("A %"));
    assert_eq!(text_at(&analysis, 1, 13).as_deref(), Some("C %"));

    // running total of A at lag 0, then its share
    assert_eq!(number_at(&analysis, 2, 8), Some(10.0));
    assert_eq!(number_at(&analysis, 2, 11), Some(10.0 / 15.0));
    assert_eq!(number_at(&analysis, 4, 11), Some(1.0));

    // C sums to zero, so its shares stay blank
    assert_eq!(number_at(&analysis, 2, 13), None);
    assert_eq!(number_at(&analysis, 4, 13), None);
}

#[test]
fn test_weekly_section_excludes_late_lags() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);
    let analysis = sheet(&path, ANALYSIS_SHEET);

    assert_eq!(text_at(&analysis, 1, 16).as_deref(), Some("scheduling_lag"));
    assert_eq!(text_at(&analysis, 1, 17).as_deref(), Some("A %"));
    assert_eq!(number_at(&analysis, 2, 16), Some(0.0));
    assert_eq!(number_at(&analysis, 3, 16), Some(1.0));
    // lag 10 is past the weekly cutoff
    assert_eq!(number_at(&analysis, 4, 16), None);
}

#[test]
fn test_export_to_missing_directory_fails() {
    let (raw, tables) = sample();
    let err = ReportExporter::new(&raw, &tables)
        .export(Path::new("/no/such/dir/report.xlsx"))
        .unwrap_err();
    assert!(err.to_string().contains("Export error"));
}

// ═══════════════════════════════════════════════════════════════════════════
// READER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reader_reads_first_sheet_of_report() {
    let dir = TempDir::new().unwrap();
    let path = export_sample(&dir);

    let grid = WorkbookReader::new(&path).read_active_sheet().unwrap();
    assert_eq!(grid.name, RAW_DATA_SHEET);
    assert_eq!(grid.rows.len(), 5);
    assert_eq!(grid.rows[0][0], CellValue::Text("scheduling_lag".to_string()));
    assert_eq!(grid.rows[1][2], CellValue::Number(10.0));
}

#[test]
fn test_reader_rejects_missing_file() {
    let err = WorkbookReader::new("/no/such/file.xlsx")
        .read_active_sheet()
        .unwrap_err();
    assert!(err.is_input_error());
}
