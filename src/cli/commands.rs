use crate::config::AnalysisConfig;
use crate::error::LagResult;
use crate::ingest::sniffer::display_delimiter;
use crate::ingest::{DataLoader, InputFormat};
use crate::pipeline::{analyze_file, default_output_path};
use crate::types::{percent_header, WeeklySummary};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Format a cumulative share for display (0.667 → "67%")
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

/// Load the configuration file if one was given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> LagResult<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_yaml_file(p),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Plain-text table of the weekly summary, one line per lag
pub fn render_weekly_table(summary: &WeeklySummary) -> Vec<String> {
    let mut headers = vec!["scheduling_lag".to_string()];
    headers.extend(summary.flags.iter().map(|f| percent_header(f)));

    let body: Vec<Vec<String>> = summary
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.scheduling_lag.to_string()];
            cells.extend(row.percent.iter().map(|p| format_percent(*p)));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|idx| {
            body.iter()
                .map(|cells| cells[idx].len())
                .chain(std::iter::once(headers[idx].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = vec![format_line(headers.as_slice())];
    lines.extend(body.iter().map(|cells| format_line(cells.as_slice())));
    lines
}

/// Execute the analyze command
pub fn analyze(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
) -> LagResult<()> {
    println!("{}", "📊 schedlag - Scheduling Lag Analysis".bold().green());
    println!("   Input:  {}", input.display());

    let config = load_config(config.as_deref())?;
    let output = match output {
        Some(path) => path,
        None => default_output_path(&input)?,
    };
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Loading and validating input...".cyan());
    }

    let outcome = analyze_file(&input, &output, &config)?;

    if verbose {
        println!(
            "   {} rows kept, {} rows dropped",
            outcome.records, outcome.dropped_rows
        );
        println!(
            "   {} lag values, {} flag categories\n",
            outcome.tables.count.rows.len(),
            outcome.tables.count.flags.len()
        );
    }

    println!(
        "{}",
        format!(
            "📈 Percentage of Total: Within {} Days",
            config.weekly_cutoff_days
        )
        .bold()
        .cyan()
    );
    if outcome.weekly.is_empty() {
        println!("   {}", "No rows within the weekly window".yellow());
    } else {
        for line in render_weekly_table(&outcome.weekly) {
            println!("   {}", line);
        }
    }
    println!();

    println!("{}", "✅ Report written".bold().green());
    println!("   Excel file: {}\n", outcome.output_path.display());

    Ok(())
}

/// Execute the inspect command - show header detection without exporting
pub fn inspect(input: PathBuf, config: Option<PathBuf>) -> LagResult<()> {
    println!("{}", "🔍 schedlag - Input Inspection".bold().green());
    println!("   File: {}\n", input.display());

    let config = load_config(config.as_deref())?;
    let loaded = DataLoader::new(&config).load_with_details(&input)?;

    println!("{}", "📋 Detection:".bold().cyan());
    match loaded.format {
        InputFormat::Delimited => println!("   Format: delimited text"),
        InputFormat::Workbook => println!("   Format: workbook"),
    }
    if let Some(sheet) = &loaded.sheet_name {
        println!("   Sheet: {}", sheet.bright_blue());
    }
    if let Some(delimiter) = loaded.delimiter {
        println!("   Delimiter: '{}'", display_delimiter(delimiter).bright_blue());
    }
    println!("   Header row: {}", (loaded.header_row + 1).to_string().bold());
    println!();

    println!("{}", "🧭 Columns:".bold().cyan());
    for (raw, mapped) in loaded.raw_columns.iter().zip(&loaded.mapping.columns) {
        let is_canonical = loaded
            .mapping
            .positions
            .keys()
            .any(|field| field.as_str() == mapped);
        if is_canonical {
            println!("   {} → {}", raw, mapped.green().bold());
        } else {
            println!("   {} → {}", raw, mapped.dimmed());
        }
    }
    println!();

    println!("{}", "🧮 Rows:".bold().cyan());
    println!("   Valid:   {}", loaded.table.len().to_string().green());
    println!("   Dropped: {}", loaded.table.dropped_rows.to_string().yellow());
    println!();

    Ok(())
}

/// Execute the config command - print the effective configuration as YAML
pub fn show_config(config: Option<PathBuf>) -> LagResult<()> {
    let config = load_config(config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeeklyRow;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(2.0 / 3.0)), "67%");
        assert_eq!(format_percent(Some(1.0)), "100%");
        assert_eq!(format_percent(Some(0.0)), "0%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn test_render_weekly_table() {
        let summary = WeeklySummary {
            flags: vec!["A".to_string(), "B".to_string()],
            rows: vec![
                WeeklyRow {
                    scheduling_lag: 0,
                    percent: vec![Some(0.5), None],
                },
                WeeklyRow {
                    scheduling_lag: 1,
                    percent: vec![Some(1.0), None],
                },
            ],
        };
        let lines = render_weekly_table(&summary);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "scheduling_lag   A %  B %");
        assert!(lines[1].ends_with("50%  N/A"));
        assert!(lines[2].ends_with("100%  N/A"));
    }

    #[test]
    fn test_load_config_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Some(Path::new("no-such-config.yaml"))).is_err());
    }
}
