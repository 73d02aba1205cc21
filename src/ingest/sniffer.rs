//! Statistical delimiter detection for delimited text exports

use tracing::debug;

/// Delimiters considered by the sniffer, in preference order
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Share of lines (from the first matching line onward) that must agree
const MIN_CONSISTENCY: f64 = 0.9;

/// Per-delimiter statistics over a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelimiterStats {
    pub delimiter: u8,
    /// Most frequent non-zero occurrence count per line
    pub mode: usize,
    /// Lines whose count equals `mode`
    pub matching_lines: usize,
    /// Lines from the first matching line to the end of the sample
    pub considered_lines: usize,
}

impl DelimiterStats {
    pub fn consistency(&self) -> f64 {
        if self.considered_lines == 0 {
            return 0.0;
        }
        self.matching_lines as f64 / self.considered_lines as f64
    }

    fn qualifies(&self) -> bool {
        self.mode > 0 && self.consistency() >= MIN_CONSISTENCY
    }
}

/// Detect the field delimiter of a text sample, `None` when no candidate is
/// consistent enough. `truncated` marks a sample cut from a longer input,
/// whose last line may be partial.
pub fn sniff_delimiter(sample: &str, truncated: bool) -> Option<u8> {
    let lines = sample_lines(sample, truncated);
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<DelimiterStats> = None;
    for delimiter in CANDIDATE_DELIMITERS {
        let Some(stats) = delimiter_stats(&lines, delimiter) else {
            continue;
        };
        debug!(
            delimiter = %display_delimiter(delimiter),
            mode = stats.mode,
            matching = stats.matching_lines,
            considered = stats.considered_lines,
            "sniffed delimiter candidate"
        );
        if !stats.qualifies() {
            continue;
        }
        best = match best {
            Some(current) if !outranks(&stats, &current) => Some(current),
            _ => Some(stats),
        };
    }

    best.map(|stats| stats.delimiter)
}

/// Delimiter used when sniffing fails: tab if the first line has one, else comma
pub fn fallback_delimiter(first_line: &str) -> u8 {
    if first_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

/// Occurrence statistics of `delimiter` over non-blank lines
pub fn delimiter_stats(lines: &[&str], delimiter: u8) -> Option<DelimiterStats> {
    let counts: Vec<usize> = lines
        .iter()
        .map(|line| count_unquoted(line, delimiter))
        .collect();

    let mode = mode_of_nonzero(&counts)?;
    let first = counts.iter().position(|&c| c == mode)?;
    let considered = &counts[first..];

    Some(DelimiterStats {
        delimiter,
        mode,
        matching_lines: considered.iter().filter(|&&c| c == mode).count(),
        considered_lines: considered.len(),
    })
}

/// Printable form of a delimiter byte for logs and CLI output
pub fn display_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

/// Non-blank lines of the sample; the last line of a truncated sample is
/// discarded when it is partial and not the only line
fn sample_lines(sample: &str, truncated: bool) -> Vec<&str> {
    let mut lines: Vec<&str> = sample.lines().collect();
    if truncated && lines.len() > 1 && !sample.ends_with('\n') {
        lines.pop();
    }
    lines.retain(|line| !line.trim().is_empty());
    lines
}

/// Count delimiter bytes outside double-quoted sections
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Most frequent non-zero value; ties go to the larger value
fn mode_of_nonzero(counts: &[usize]) -> Option<usize> {
    let mut freq: std::collections::BTreeMap<usize, usize> = std::collections::BTreeMap::new();
    for &c in counts.iter().filter(|&&c| c > 0) {
        *freq.entry(c).or_default() += 1;
    }
    freq.into_iter()
        .max_by(|(a_val, a_freq), (b_val, b_freq)| a_freq.cmp(b_freq).then(a_val.cmp(b_val)))
        .map(|(value, _)| value)
}

/// Ranking between two qualifying candidates; earlier candidates win full ties
fn outranks(challenger: &DelimiterStats, current: &DelimiterStats) -> bool {
    if challenger.matching_lines != current.matching_lines {
        return challenger.matching_lines > current.matching_lines;
    }
    if challenger.mode != current.mode {
        return challenger.mode > current.mode;
    }
    challenger.consistency() > current.consistency()
}
