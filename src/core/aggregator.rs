//! Pivot and cumulative aggregation
//!
//! Produces the three report tables from validated records:
//!
//! 1. Count table: summed appointment counts by lag (rows) and flag
//!    (columns), with a Grand Total column and row.
//! 2. Cumulative table: running totals per flag by ascending lag, and each
//!    running total as a share of the flag's overall total.
//! 3. Weekly summary: the cumulative shares for lags up to the cutoff.
//!
//! A flag whose overall total is zero has no defined share; its percentages
//! are `None` rather than 0.

use crate::config::AnalysisConfig;
use crate::types::{
    AnalysisTables, CountRow, CountTable, CumulativeRow, CumulativeTable, RawRecord, WeeklyRow,
    WeeklySummary,
};
use std::collections::{BTreeMap, BTreeSet};

pub struct Aggregator {
    weekly_cutoff_days: i64,
}

impl Aggregator {
    pub fn new(weekly_cutoff_days: i64) -> Self {
        Self { weekly_cutoff_days }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.weekly_cutoff_days)
    }

    /// Build all three tables; empty input yields empty tables
    pub fn aggregate(&self, records: &[RawRecord]) -> AnalysisTables {
        if records.is_empty() {
            return AnalysisTables::default();
        }

        let count = self.count_table(records);
        let cumulative = self.cumulative_table(&count);
        let weekly = self.weekly_summary(&cumulative);

        AnalysisTables {
            count,
            cumulative,
            weekly,
        }
    }

    /// Sum counts by (lag, flag); absent combinations are zero
    pub fn count_table(&self, records: &[RawRecord]) -> CountTable {
        let column_of: BTreeMap<&str, usize> = records
            .iter()
            .map(|r| r.evenflow_flag.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(idx, flag)| (flag, idx))
            .collect();
        let flags: Vec<String> = column_of.keys().map(|flag| flag.to_string()).collect();

        let mut by_lag: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for record in records {
            let counts = by_lag
                .entry(record.scheduling_lag)
                .or_insert_with(|| vec![0.0; flags.len()]);
            if let Some(&idx) = column_of.get(record.evenflow_flag.as_str()) {
                counts[idx] += record.active_appointment_count;
            }
        }

        let rows: Vec<CountRow> = by_lag
            .into_iter()
            .map(|(scheduling_lag, counts)| CountRow {
                scheduling_lag,
                total: counts.iter().sum(),
                counts,
            })
            .collect();

        let column_totals: Vec<f64> = (0..flags.len())
            .map(|idx| rows.iter().map(|row| row.counts[idx]).sum())
            .collect();
        let grand_total = rows.iter().map(|row| row.total).sum();

        CountTable {
            flags,
            rows,
            column_totals,
            grand_total,
        }
    }

    /// Running totals and shares of each flag's total by ascending lag
    pub fn cumulative_table(&self, count: &CountTable) -> CumulativeTable {
        let mut running = vec![0.0; count.flags.len()];

        let rows = count
            .rows
            .iter()
            .map(|row| {
                for (acc, value) in running.iter_mut().zip(&row.counts) {
                    *acc += value;
                }
                let percent = running
                    .iter()
                    .zip(&count.column_totals)
                    .map(|(acc, total)| (*total != 0.0).then(|| acc / total))
                    .collect();
                CumulativeRow {
                    scheduling_lag: row.scheduling_lag,
                    running: running.clone(),
                    percent,
                }
            })
            .collect();

        CumulativeTable {
            flags: count.flags.clone(),
            rows,
        }
    }

    /// Cumulative shares for lags at or below the cutoff
    pub fn weekly_summary(&self, cumulative: &CumulativeTable) -> WeeklySummary {
        WeeklySummary {
            flags: cumulative.flags.clone(),
            rows: cumulative
                .rows
                .iter()
                .filter(|row| row.scheduling_lag <= self.weekly_cutoff_days)
                .map(|row| WeeklyRow {
                    scheduling_lag: row.scheduling_lag,
                    percent: row.percent.clone(),
                })
                .collect(),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<RawRecord> {
        vec![
            RawRecord::new(0, "A", 10.0),
            RawRecord::new(1, "A", 5.0),
            RawRecord::new(1, "B", 2.0),
        ]
    }

    #[test]
    fn test_count_table_example() {
        let count = Aggregator::default().count_table(&sample());
        assert_eq!(count.flags, vec!["A", "B"]);
        assert_eq!(count.rows[0].counts, vec![10.0, 0.0]);
        assert_eq!(count.rows[0].total, 10.0);
        assert_eq!(count.rows[1].counts, vec![5.0, 2.0]);
        assert_eq!(count.rows[1].total, 7.0);
        assert_eq!(count.column_totals, vec![15.0, 2.0]);
        assert_eq!(count.grand_total, 17.0);
    }

    #[test]
    fn test_cumulative_example() {
        let aggregator = Aggregator::default();
        let cumulative = aggregator.cumulative_table(&aggregator.count_table(&sample()));
        assert_eq!(cumulative.rows[0].running, vec![10.0, 0.0]);
        assert_eq!(cumulative.rows[1].running, vec![15.0, 2.0]);
        let a0 = cumulative.rows[0].percent[0].unwrap();
        assert!((a0 - 10.0 / 15.0).abs() < 1e-12);
        assert_eq!(cumulative.rows[0].percent[1], Some(0.0));
        assert_eq!(cumulative.rows[1].percent, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_zero_total_is_undefined() {
        let records = vec![RawRecord::new(0, "A", 4.0), RawRecord::new(2, "Z", 0.0)];
        let tables = Aggregator::default().aggregate(&records);
        assert_eq!(tables.cumulative.rows[0].percent, vec![Some(1.0), None]);
        assert_eq!(tables.cumulative.rows[1].percent, vec![Some(1.0), None]);
    }

    #[test]
    fn test_duplicate_keys_are_summed() {
        let records = vec![RawRecord::new(3, "A", 1.5), RawRecord::new(3, "A", 2.5)];
        let count = Aggregator::default().count_table(&records);
        assert_eq!(count.rows.len(), 1);
        assert_eq!(count.rows[0].counts, vec![4.0]);
    }

    #[test]
    fn test_counts_land_in_their_flag_column() {
        let records = vec![
            RawRecord::new(0, "Z", 1.0),
            RawRecord::new(0, "B", 2.0),
            RawRecord::new(1, "A", 4.0),
            RawRecord::new(0, "B", 8.0),
        ];
        let count = Aggregator::default().count_table(&records);
        assert_eq!(count.flags, vec!["A", "B", "Z"]);
        assert_eq!(count.rows[0].counts, vec![0.0, 10.0, 1.0]);
        assert_eq!(count.rows[1].counts, vec![4.0, 0.0, 0.0]);
        assert_eq!(count.column_totals, vec![4.0, 10.0, 1.0]);
    }

    #[test]
    fn test_weekly_cutoff() {
        let records = vec![
            RawRecord::new(-2, "A", 1.0),
            RawRecord::new(7, "A", 1.0),
            RawRecord::new(8, "A", 1.0),
        ];
        let tables = Aggregator::new(7).aggregate(&records);
        let lags: Vec<i64> = tables.weekly.rows.iter().map(|r| r.scheduling_lag).collect();
        assert_eq!(lags, vec![-2, 7]);

        let tables = Aggregator::new(0).aggregate(&records);
        assert_eq!(tables.weekly.rows.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let tables = Aggregator::default().aggregate(&[]);
        assert!(tables.count.is_empty());
        assert!(tables.cumulative.is_empty());
        assert!(tables.weekly.is_empty());
    }
}
