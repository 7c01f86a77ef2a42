//! Kashshaf OCR Post-Processing Pipeline
//!
//! Typo correction against a reference OCR pass, excerpt-to-page matching,
//! and bracket/noise checks for premodern Arabic books.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kashshaf_ocr::align::align_token_sequences;
use kashshaf_ocr::distance::{bounded_levenshtein, bounded_substring_distance};
use kashshaf_ocr::matcher::{find_all_matches_per_excerpt, find_best_page_per_excerpt};
use kashshaf_ocr::models::{MatchPolicy, MatchPolicyOverrides, TypoFixParams, TypoPair};
use kashshaf_ocr::output::{
    check_lines, print_excerpt_reports, print_line_checks, print_match_summary, read_json_file,
    write_json_file, MatchReport,
};
use kashshaf_ocr::typo::{fix_typo, fix_typos_batch};

#[derive(Parser)]
#[command(name = "kashshaf-ocr")]
#[command(about = "OCR post-processing for Arabic texts: typo fixing and excerpt matching")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix typos in one OCR text using a reference OCR text
    FixTypo {
        /// Original OCR text file
        #[arg(long)]
        original: PathBuf,

        /// Reference OCR text file
        #[arg(long)]
        reference: PathBuf,

        /// Symbol kept as its own token and preferred when aligned (repeatable)
        #[arg(long = "symbol")]
        symbols: Vec<String>,

        /// Similarity threshold for soft matches [default: 0.6]
        #[arg(long)]
        similarity: Option<f64>,

        /// Threshold for collapsing adjacent duplicates [default: 0.8]
        #[arg(long)]
        high_similarity: Option<f64>,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fix typos for a JSON array of {original, reference} pairs
    FixTypos {
        /// Input JSON file
        #[arg(long)]
        input: PathBuf,

        /// Output JSON file (array of corrected texts)
        #[arg(long)]
        output: PathBuf,

        /// Symbol kept as its own token and preferred when aligned (repeatable)
        #[arg(long = "symbol")]
        symbols: Vec<String>,

        /// Similarity threshold for soft matches [default: 0.6]
        #[arg(long)]
        similarity: Option<f64>,

        /// Threshold for collapsing adjacent duplicates [default: 0.8]
        #[arg(long)]
        high_similarity: Option<f64>,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,
    },

    /// Find the page(s) each excerpt comes from
    ///
    /// Flags below override values from --policy; unset fields use defaults.
    Match {
        /// JSON array of page texts
        #[arg(long)]
        pages: PathBuf,

        /// JSON array of excerpts
        #[arg(long)]
        excerpts: PathBuf,

        /// JSON file with match policy overrides
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Report every matching page, ranked, instead of only the best
        #[arg(long)]
        all: bool,

        /// Exact matching only
        #[arg(long)]
        no_fuzzy: bool,

        /// Absolute edit-distance ceiling [default: 3]
        #[arg(long)]
        max_edit_abs: Option<usize>,

        /// Relative edit-distance ceiling [default: 0.1]
        #[arg(long)]
        max_edit_rel: Option<f64>,

        /// Q-gram length [default: 4]
        #[arg(long)]
        q: Option<usize>,

        /// Output JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress summary output
        #[arg(long)]
        quiet: bool,

        /// Print first N excerpt results to console
        #[arg(long)]
        show_excerpts: Option<usize>,
    },

    /// Check brackets, quotes and OCR noise line by line
    Check {
        /// Text file to check
        #[arg(long)]
        input: PathBuf,

        /// Write the full per-line report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Benchmark alignment and distance performance
    Benchmark {
        /// Number of iterations
        #[arg(long, default_value = "1000")]
        iterations: usize,

        /// Sequence size in tokens
        #[arg(long, default_value = "275")]
        size: usize,
    },
}

fn typo_params(
    symbols: Vec<String>,
    similarity: Option<f64>,
    high_similarity: Option<f64>,
) -> TypoFixParams {
    let defaults = TypoFixParams::default();
    TypoFixParams {
        typo_symbols: symbols,
        similarity_threshold: similarity.unwrap_or(defaults.similarity_threshold),
        high_similarity_threshold: high_similarity.unwrap_or(defaults.high_similarity_threshold),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::FixTypo {
            original,
            reference,
            symbols,
            similarity,
            high_similarity,
            output,
        } => {
            let params = typo_params(symbols, similarity, high_similarity);
            let original = std::fs::read_to_string(&original)?;
            let reference = std::fs::read_to_string(&reference)?;

            let fixed = fix_typo(&original, &reference, &params)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &fixed)?;
                    eprintln!("Output: {}", path.display());
                }
                None => println!("{}", fixed),
            }
        }

        Commands::FixTypos {
            input,
            output,
            symbols,
            similarity,
            high_similarity,
            quiet,
        } => {
            let params = typo_params(symbols, similarity, high_similarity);
            let pairs: Vec<TypoPair> = read_json_file(&input)?;

            if !quiet {
                eprintln!("Fixing {} document pairs...", pairs.len());
            }
            let fixed = fix_typos_batch(&pairs, &params, !quiet)?;
            write_json_file(&fixed, &output)?;

            if !quiet {
                eprintln!("\nOutput: {}", output.display());
            }
        }

        Commands::Match {
            pages,
            excerpts,
            policy,
            all,
            no_fuzzy,
            max_edit_abs,
            max_edit_rel,
            q,
            output,
            quiet,
            show_excerpts,
        } => {
            let pages: Vec<String> = read_json_file(&pages)?;
            let excerpts: Vec<String> = read_json_file(&excerpts)?;

            // Explicit flags win over the policy file; defaults are applied once
            let mut overrides: MatchPolicyOverrides = match policy {
                Some(path) => read_json_file(&path)?,
                None => MatchPolicyOverrides::default(),
            };
            if no_fuzzy {
                overrides.enable_fuzzy = Some(false);
            }
            overrides.max_edit_abs = max_edit_abs.or(overrides.max_edit_abs);
            overrides.max_edit_rel = max_edit_rel.or(overrides.max_edit_rel);
            overrides.q = q.or(overrides.q);
            let policy = overrides.resolve()?;

            if !quiet {
                eprintln!(
                    "Matching {} excerpts against {} pages...",
                    excerpts.len(),
                    pages.len()
                );
            }

            let report = if all {
                let matches = find_all_matches_per_excerpt(&pages, &excerpts, &policy)?;
                MatchReport::from_all(&excerpts, &matches, &policy, pages.len())
            } else {
                let best = find_best_page_per_excerpt(&pages, &excerpts, &policy)?;
                MatchReport::from_best(&excerpts, &best, &policy, pages.len())
            };

            if let Some(path) = &output {
                write_json_file(&report, path)?;
            }

            if !quiet {
                print_match_summary(&report);
                if let Some(path) = &output {
                    eprintln!("\nOutput: {}", path.display());
                }
            }

            if let Some(limit) = show_excerpts {
                println!("\n=== Excerpts ===");
                print_excerpt_reports(&report.excerpts, Some(limit));
            }
        }

        Commands::Check { input, output } => {
            let text = std::fs::read_to_string(&input)?;
            let checks = check_lines(&text);
            let flagged = checks.iter().filter(|c| c.has_problems()).count();

            print_line_checks(&checks);
            eprintln!("\n{} of {} lines flagged", flagged, checks.len());

            if let Some(path) = output {
                write_json_file(&checks, &path)?;
                eprintln!("Output: {}", path.display());
            }
        }

        Commands::Benchmark { iterations, size } => {
            run_benchmark(iterations, size);
        }
    }

    Ok(())
}

/// Run alignment and distance benchmarks to measure performance.
fn run_benchmark(iterations: usize, size: usize) {
    use std::time::Instant;

    println!("=== Alignment Benchmark ===");
    println!("Iterations: {}", iterations);
    println!("Sequence size: {}", size);

    let vocab = ["حدثنا", "عبد", "الله", "بن", "يوسف", "قال", "اخبرنا", "مالك", "عن", "نافع"];
    let text_a: Vec<&str> = (0..size).map(|i| vocab[i % vocab.len()]).collect();
    let text_b: Vec<&str> = (0..size)
        .map(|i| if i % 10 < 7 { vocab[i % vocab.len()] } else { "كلمه" })
        .collect();
    let no_symbols: [&str; 0] = [];

    report_timing("Identical sequences", iterations, || {
        let _ = align_token_sequences(&text_a, &text_a, &no_symbols, 0.7);
    });

    report_timing("70% match sequences", iterations, || {
        let _ = align_token_sequences(&text_a, &text_b, &no_symbols, 0.7);
    });

    let joined_a = text_a.join(" ");
    let joined_b = text_b.join(" ");
    report_timing("Bounded distance (k=8)", iterations, || {
        let _ = bounded_levenshtein(&joined_a, &joined_b, 8);
    });

    let pattern: Vec<char> = text_a[..size.min(12)].join(" ").chars().collect();
    let haystack: Vec<char> = joined_b.chars().collect();
    report_timing("Substring distance (k=4)", iterations, || {
        let _ = bounded_substring_distance(&pattern, &haystack, 4);
    });

    let pages = [joined_a.as_str(), joined_b.as_str()];
    let excerpts = [pattern.iter().collect::<String>()];
    let start = Instant::now();
    let _ = find_best_page_per_excerpt(&pages, &excerpts, &MatchPolicy::default());
    println!("\nSingle excerpt match: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);
}

fn report_timing<F: FnMut()>(label: &str, iterations: usize, mut run: F) {
    use std::time::Instant;

    println!("\n{}:", label);
    let start = Instant::now();
    for _ in 0..iterations {
        run();
    }
    let elapsed = start.elapsed();
    let per_run = elapsed.as_secs_f64() / iterations.max(1) as f64;
    println!("  Total time: {:.3}s", elapsed.as_secs_f64());
    println!("  Per run: {:.3}ms", per_run * 1000.0);
    if per_run > 0.0 {
        println!("  Runs/sec: {:.0}", 1.0 / per_run);
    }
}
