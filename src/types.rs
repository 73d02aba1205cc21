use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Canonical fields
//==============================================================================

/// The three fields every input must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    SchedulingLag,
    EvenflowFlag,
    ActiveAppointmentCount,
}

impl CanonicalField {
    /// All fields in report order
    pub const ALL: [CanonicalField; 3] = [
        CanonicalField::SchedulingLag,
        CanonicalField::EvenflowFlag,
        CanonicalField::ActiveAppointmentCount,
    ];

    /// Column name used once a header has been mapped to this field
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::SchedulingLag => "scheduling_lag",
            CanonicalField::EvenflowFlag => "evenflow_flag",
            CanonicalField::ActiveAppointmentCount => "active_appointment_count",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//==============================================================================
// Raw input
//==============================================================================

/// A single cell as read from either a delimited file or a worksheet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell the way it would appear as a label
    pub fn to_label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number_label(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

/// Integral floats print without a fractional part (3.0 → "3")
pub fn format_number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Table as read from the detected header row onward, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

//==============================================================================
// Validated input
//==============================================================================

/// One validated appointment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub scheduling_lag: i64,
    pub evenflow_flag: String,
    pub active_appointment_count: f64,
}

impl RawRecord {
    pub fn new(scheduling_lag: i64, evenflow_flag: impl Into<String>, count: f64) -> Self {
        Self {
            scheduling_lag,
            evenflow_flag: evenflow_flag.into(),
            active_appointment_count: count,
        }
    }
}

/// The surviving rows of an input file, ready for aggregation and export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedTable {
    /// Column names after normalization and canonical renaming
    pub columns: Vec<String>,
    /// Surviving rows; canonical cells hold their coerced values
    pub rows: Vec<Vec<CellValue>>,
    /// Canonical view of `rows`, same order
    pub records: Vec<RawRecord>,
    /// Rows removed because a canonical field was missing or unparseable
    pub dropped_rows: usize,
}

impl ValidatedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//==============================================================================
// Aggregate tables
//==============================================================================

/// Label of the synthetic total row and column
pub const GRAND_TOTAL: &str = "Grand Total";

/// Header of the percentage column derived from a flag
pub fn percent_header(flag: &str) -> String {
    format!("{} %", flag)
}

/// One lag row of the count pivot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRow {
    pub scheduling_lag: i64,
    /// Summed counts, aligned with `CountTable::flags`
    pub counts: Vec<f64>,
    /// Row sum (Grand Total column)
    pub total: f64,
}

/// Summed appointment counts by lag and flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountTable {
    /// Flag categories in column order
    pub flags: Vec<String>,
    /// Rows by ascending lag
    pub rows: Vec<CountRow>,
    /// Grand Total row, aligned with `flags`
    pub column_totals: Vec<f64>,
    /// Grand Total row value under the Grand Total column
    pub grand_total: f64,
}

impl CountTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["scheduling_lag".to_string()];
        headers.extend(self.flags.iter().cloned());
        headers.push(GRAND_TOTAL.to_string());
        headers
    }

    /// Column total for a flag, if the flag exists
    pub fn column_total(&self, flag: &str) -> Option<f64> {
        self.flags
            .iter()
            .position(|f| f == flag)
            .map(|idx| self.column_totals[idx])
    }
}

/// One lag row of the running-total table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRow {
    pub scheduling_lag: i64,
    /// Running sums, aligned with `CumulativeTable::flags`
    pub running: Vec<f64>,
    /// Running sum / column total; `None` when the total is zero
    pub percent: Vec<Option<f64>>,
}

/// Running totals and cumulative percentages per flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTable {
    pub flags: Vec<String>,
    pub rows: Vec<CumulativeRow>,
}

impl CumulativeTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["scheduling_lag".to_string()];
        headers.extend(self.flags.iter().cloned());
        headers.extend(self.flags.iter().map(|f| percent_header(f)));
        headers
    }
}

/// Cumulative percentage at one lag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRow {
    pub scheduling_lag: i64,
    pub percent: Vec<Option<f64>>,
}

/// Cumulative percentages for lags within the weekly cutoff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub flags: Vec<String>,
    pub rows: Vec<WeeklyRow>,
}

impl WeeklySummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["scheduling_lag".to_string()];
        headers.extend(self.flags.iter().map(|f| percent_header(f)));
        headers
    }
}

/// The three derived tables of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTables {
    pub count: CountTable,
    pub cumulative: CumulativeTable,
    pub weekly: WeeklySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_field_names() {
        assert_eq!(CanonicalField::SchedulingLag.as_str(), "scheduling_lag");
        assert_eq!(CanonicalField::EvenflowFlag.to_string(), "evenflow_flag");
        assert_eq!(
            CanonicalField::ActiveAppointmentCount.as_str(),
            "active_appointment_count"
        );
    }

    #[test]
    fn test_cell_value_labels() {
        assert_eq!(CellValue::Number(3.0).to_label(), "3");
        assert_eq!(CellValue::Number(-2.5).to_label(), "-2.5");
        assert_eq!(CellValue::Text("Yes".into()).to_label(), "Yes");
        assert_eq!(CellValue::Bool(true).to_label(), "TRUE");
        assert_eq!(CellValue::Empty.to_label(), "");
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Text(" ".into()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_raw_table_pads_short_rows() {
        let mut table = RawTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![CellValue::Number(1.0)]);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], CellValue::Empty);
    }

    #[test]
    fn test_table_headers() {
        let count = CountTable {
            flags: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        assert_eq!(
            count.headers(),
            vec!["scheduling_lag", "A", "B", "Grand Total"]
        );

        let weekly = WeeklySummary {
            flags: vec!["A".into()],
            rows: vec![],
        };
        assert_eq!(weekly.headers(), vec!["scheduling_lag", "A %"]);
    }
}
