//! Aggregation tests: count pivot, running totals and weekly summary

use pretty_assertions::assert_eq;
use schedlag::core::Aggregator;
use schedlag::types::{AnalysisTables, RawRecord};

fn sample_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new(0, "A", 10.0),
        RawRecord::new(1, "A", 5.0),
        RawRecord::new(0, "B", 4.0),
        RawRecord::new(9, "B", 4.0),
        RawRecord::new(1, "A", 5.0),
        RawRecord::new(3, "C", 0.0),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// COUNT TABLE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_count_table_sums_duplicates() {
    let count = Aggregator::default().count_table(&sample_records());

    assert_eq!(count.flags, vec!["A", "B", "C"]);
    let lags: Vec<i64> = count.rows.iter().map(|r| r.scheduling_lag).collect();
    assert_eq!(lags, vec![0, 1, 3, 9]);

    // lag 1 appears twice for A
    assert_eq!(count.rows[1].counts, vec![10.0, 0.0, 0.0]);
    assert_eq!(count.column_total("A"), Some(20.0));
    assert_eq!(count.column_total("B"), Some(8.0));
    assert_eq!(count.column_total("Z"), None);
    assert_eq!(count.grand_total, 28.0);
}

#[test]
fn test_row_totals_match_grand_total() {
    let count = Aggregator::default().count_table(&sample_records());
    let row_sum: f64 = count.rows.iter().map(|r| r.total).sum();
    let col_sum: f64 = count.column_totals.iter().sum();
    assert_eq!(row_sum, count.grand_total);
    assert_eq!(col_sum, count.grand_total);
}

// ═══════════════════════════════════════════════════════════════════════════
// CUMULATIVE TABLE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_last_running_total_equals_column_total() {
    let aggregator = Aggregator::default();
    let count = aggregator.count_table(&sample_records());
    let cumulative = aggregator.cumulative_table(&count);

    let last = cumulative.rows.last().unwrap();
    assert_eq!(last.running, count.column_totals);
    assert_eq!(last.percent[0], Some(1.0));
    assert_eq!(last.percent[1], Some(1.0));
}

#[test]
fn test_running_totals_are_monotonic() {
    let tables = Aggregator::default().aggregate(&sample_records());
    for window in tables.cumulative.rows.windows(2) {
        for (prev, next) in window[0].running.iter().zip(&window[1].running) {
            assert!(next >= prev);
        }
    }
}

#[test]
fn test_zero_total_flag_has_no_percentage() {
    let tables = Aggregator::default().aggregate(&sample_records());
    assert!(tables.cumulative.rows.iter().all(|r| r.percent[2].is_none()));
}

#[test]
fn test_two_flag_example() {
    let tables = Aggregator::default().aggregate(&[
        RawRecord::new(0, "A", 10.0),
        RawRecord::new(1, "A", 5.0),
        RawRecord::new(1, "B", 2.0),
    ]);

    let a_percent: Vec<Option<f64>> =
        tables.cumulative.rows.iter().map(|r| r.percent[0]).collect();
    assert_eq!(a_percent, vec![Some(10.0 / 15.0), Some(1.0)]);

    let b_percent: Vec<Option<f64>> =
        tables.cumulative.rows.iter().map(|r| r.percent[1]).collect();
    assert_eq!(b_percent, vec![Some(0.0), Some(1.0)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// WEEKLY SUMMARY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_weekly_summary_respects_cutoff() {
    let tables = Aggregator::default().aggregate(&sample_records());
    let lags: Vec<i64> = tables.weekly.rows.iter().map(|r| r.scheduling_lag).collect();
    assert_eq!(lags, vec![0, 1, 3]);
    assert_eq!(tables.weekly.flags, tables.cumulative.flags);
}

#[test]
fn test_weekly_rows_mirror_cumulative_percentages() {
    let tables = Aggregator::default().aggregate(&sample_records());
    for weekly in &tables.weekly.rows {
        let cumulative = tables
            .cumulative
            .rows
            .iter()
            .find(|r| r.scheduling_lag == weekly.scheduling_lag)
            .unwrap();
        assert_eq!(weekly.percent, cumulative.percent);
    }
}

#[test]
fn test_custom_cutoff() {
    let tables = Aggregator::new(0).aggregate(&sample_records());
    assert_eq!(tables.weekly.rows.len(), 1);
    assert_eq!(tables.weekly.rows[0].scheduling_lag, 0);
}

#[test]
fn test_negative_lags_sort_first() {
    let tables = Aggregator::default().aggregate(&[
        RawRecord::new(2, "A", 1.0),
        RawRecord::new(-3, "A", 1.0),
    ]);
    assert_eq!(tables.count.rows[0].scheduling_lag, -3);
    assert_eq!(tables.weekly.rows.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// PROPERTY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_aggregation_is_deterministic() {
    let aggregator = Aggregator::default();
    assert_eq!(
        aggregator.aggregate(&sample_records()),
        aggregator.aggregate(&sample_records())
    );
}

#[test]
fn test_record_order_does_not_matter() {
    let mut reversed = sample_records();
    reversed.reverse();
    let aggregator = Aggregator::default();
    assert_eq!(
        aggregator.aggregate(&sample_records()),
        aggregator.aggregate(&reversed)
    );
}

#[test]
fn test_empty_input_yields_empty_tables() {
    let tables = Aggregator::default().aggregate(&[]);
    assert_eq!(tables, AnalysisTables::default());
}
