//! Output formatting for matching, typo-fix and check results (JSON, text).

use crate::balance::{check_balance, BalanceReport};
use crate::matcher::PageMatch;
use crate::models::MatchPolicy;
use crate::noise::{analyze_noise, NoiseAnalysis};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of matching excerpts against a paginated book.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub version: String,
    pub policy: MatchPolicy,
    pub page_count: usize,
    pub excerpt_count: usize,
    pub matched_count: usize,
    pub excerpts: Vec<ExcerptReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcerptReport {
    pub index: usize,
    pub excerpt: String,
    pub best_page: Option<usize>, // null when nothing matched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<PageMatch>,
}

impl MatchReport {
    /// Report for the single-best-page mode.
    pub fn from_best<S: AsRef<str>>(
        excerpts: &[S],
        best: &[Option<usize>],
        policy: &MatchPolicy,
        page_count: usize,
    ) -> Self {
        let reports = excerpts
            .iter()
            .zip(best)
            .enumerate()
            .map(|(index, (excerpt, page))| ExcerptReport {
                index,
                excerpt: excerpt.as_ref().to_string(),
                best_page: *page,
                matches: Vec::new(),
            })
            .collect();
        Self::new(reports, policy, page_count)
    }

    /// Report for the all-pages mode; the best page is the first ranked match.
    pub fn from_all<S: AsRef<str>>(
        excerpts: &[S],
        all: &[Vec<PageMatch>],
        policy: &MatchPolicy,
        page_count: usize,
    ) -> Self {
        let reports = excerpts
            .iter()
            .zip(all)
            .enumerate()
            .map(|(index, (excerpt, matches))| ExcerptReport {
                index,
                excerpt: excerpt.as_ref().to_string(),
                best_page: matches.first().map(|m| m.page),
                matches: matches.clone(),
            })
            .collect();
        Self::new(reports, policy, page_count)
    }

    fn new(excerpts: Vec<ExcerptReport>, policy: &MatchPolicy, page_count: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            policy: policy.clone(),
            page_count,
            excerpt_count: excerpts.len(),
            matched_count: excerpts.iter().filter(|e| e.best_page.is_some()).count(),
            excerpts,
        }
    }
}

/// Balance and noise findings for one line of text.
#[derive(Debug, Clone, Serialize)]
pub struct LineCheck {
    pub line: usize, // 1-based
    pub balance: BalanceReport,
    pub noise: NoiseAnalysis,
}

impl LineCheck {
    pub fn has_problems(&self) -> bool {
        !self.balance.is_balanced() || self.noise.is_noise
    }
}

/// Check every non-blank line of `text`.
pub fn check_lines(text: &str) -> Vec<LineCheck> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| LineCheck {
            line: i + 1,
            balance: check_balance(line),
            noise: analyze_noise(line),
        })
        .collect()
}

/// Write any serializable value as pretty JSON.
pub fn write_json<W: Write, T: Serialize + ?Sized>(value: &T, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Write any serializable value as pretty JSON to a file.
pub fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(value, &mut file)
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, OutputError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

/// Format ranked pages compactly, e.g. `3, 7 (0.83), 12 (0.50)`.
///
/// Exact hits print without a score.
pub fn format_page_list(matches: &[PageMatch]) -> String {
    if matches.is_empty() {
        return "-".to_string();
    }
    matches
        .iter()
        .map(|m| {
            if m.exact {
                m.page.to_string()
            } else {
                format!("{} ({:.2})", m.page, m.score)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write a summary report to stdout.
pub fn print_match_summary(report: &MatchReport) {
    println!("\n=== Match Summary ===");
    println!("Version: {}", report.version);
    println!();
    println!("Pages: {}", report.page_count);
    println!("Excerpts: {}", report.excerpt_count);
    println!();
    println!("Policy:");
    println!("  Fuzzy: {}", report.policy.enable_fuzzy);
    println!(
        "  Max edits: {} abs / {:.1}% rel",
        report.policy.max_edit_abs,
        report.policy.max_edit_rel * 100.0
    );
    println!("  Q-gram length: {}", report.policy.q);
    println!("  Seeds per excerpt: {}", report.policy.grams_per_excerpt);
    println!("  Candidate cap: {}", report.policy.max_candidates_per_excerpt);
    println!("  Seam length: {}", report.policy.seam_len);
    println!();
    let rate = if report.excerpt_count > 0 {
        report.matched_count as f64 / report.excerpt_count as f64 * 100.0
    } else {
        0.0
    };
    println!("Results:");
    println!("  Matched: {} ({:.1}%)", report.matched_count, rate);
    println!("  Unmatched: {}", report.excerpt_count - report.matched_count);
}

/// Format one excerpt line, truncating long excerpts.
pub fn format_excerpt_report(report: &ExcerptReport) -> String {
    const PREVIEW_CHARS: usize = 40;

    let preview: String = report.excerpt.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if report.excerpt.chars().count() > PREVIEW_CHARS {
        "..."
    } else {
        ""
    };
    let pages = if report.matches.is_empty() {
        report
            .best_page
            .map_or_else(|| "-".to_string(), |p| p.to_string())
    } else {
        format_page_list(&report.matches)
    };
    format!("#{} [{}] {}{}", report.index, pages, preview, ellipsis)
}

/// Print excerpt results in a human-readable format.
pub fn print_excerpt_reports(reports: &[ExcerptReport], limit: Option<usize>) {
    let to_print = match limit {
        Some(n) => &reports[..n.min(reports.len())],
        None => reports,
    };

    for report in to_print {
        println!("{}", format_excerpt_report(report));
    }

    if let Some(n) = limit {
        if reports.len() > n {
            println!("... and {} more excerpts", reports.len() - n);
        }
    }
}

/// Print the lines that failed a balance or noise check.
pub fn print_line_checks(checks: &[LineCheck]) {
    for check in checks.iter().filter(|c| c.has_problems()) {
        let mut problems: Vec<String> = check.balance.errors.iter().map(ToString::to_string).collect();
        if check.noise.is_noise {
            problems.push(format!(
                "looks like noise (letters {:.0}%, symbol run {}, single-char tokens {:.0}%)",
                check.noise.letter_ratio * 100.0,
                check.noise.longest_symbol_run,
                check.noise.single_char_token_ratio * 100.0
            ));
        }
        println!("line {}: {}", check.line, problems.join("; "));
    }
}
