#![deny(missing_docs)]
//! Descramble command-line interface.
//!
//! Recovers mojibake from the command line: single strings, batches from a
//! file, credibility scoring, and catalog queries.

use clap::{Args, Parser, Subcommand, ValueEnum};
use descramble_core::{
    BatchItem, CredibilityReport, EncodingPair, PairCategory, RecoveryEngine, RecoveryOptions,
    RecoveryResult, Strategy,
};
use std::fmt::Write;
use std::path::PathBuf;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "descramble", version, about = "Mojibake recovery CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RecoverArgs {
    /// Conversion strategy: fast, balanced, or aggressive.
    #[arg(long)]
    strategy: Option<String>,
    /// Maximum number of results to return.
    #[arg(long, default_value_t = 10)]
    max_results: usize,
    /// Drop results scoring below this credibility.
    #[arg(long, default_value_t = 30.0)]
    min_credibility: f64,
    /// Restrict hypotheses to one category (chinese, western, japanese, korean).
    #[arg(long)]
    category: Option<String>,
    /// Query the raw catalog instead of detector-narrowed pairs.
    #[arg(long)]
    no_recommend: bool,
}

impl RecoverArgs {
    fn to_options(&self) -> CliResult<RecoveryOptions> {
        let strategy = self.strategy.as_deref().map(resolve_strategy);
        let category = match self.category.as_deref() {
            Some(label) => Some(
                PairCategory::parse(label)
                    .ok_or_else(|| format!("unknown category: {label}"))?,
            ),
            None => None,
        };
        Ok(RecoveryOptions {
            max_results: self.max_results,
            min_credibility: self.min_credibility,
            strategy,
            category,
            use_recommended: !self.no_recommend,
        })
    }
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover candidates for one garbled string, ranked by credibility.
    Recover {
        /// The garbled input text.
        text: String,
        #[command(flatten)]
        options: RecoverArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Recover only the single best candidate.
    Quick {
        /// The garbled input text.
        text: String,
        #[command(flatten)]
        options: RecoverArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Recover every input in a file (one per line, or a JSON array).
    Batch {
        /// File of inputs: one per line, or a JSON string array.
        file: PathBuf,
        #[command(flatten)]
        options: RecoverArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Score how much a string resembles real language.
    Score {
        /// The text to score.
        text: String,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Detect which hypothesis categories are worth trying.
    Detect {
        /// The text to inspect.
        text: String,
    },
    /// List the detector-recommended encoding pairs for a string.
    Pairs {
        /// The garbled input text.
        text: String,
        #[command(flatten)]
        options: RecoverArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// List supported encodings, optionally for one category.
    Encodings {
        /// Category to restrict to (chinese, western, japanese, korean).
        #[arg(long)]
        category: Option<String>,
    },
    /// List available conversion strategies.
    Strategies,
    /// Show category and support information for one encoding label.
    Info {
        /// The encoding label to look up.
        encoding: String,
    },
}

#[cfg(not(test))]
fn main() -> CliResult<()> {
    env_logger::init();
    run(Cli::parse())
}

#[cfg(test)]
fn main() {}

fn run(cli: Cli) -> CliResult<()> {
    let engine = RecoveryEngine::new()?;

    match cli.command {
        Commands::Recover {
            text,
            options,
            report,
        } => {
            let results = engine.recover(&text, &options.to_options()?)?;
            emit_results(&results, &report)
        }
        Commands::Quick {
            text,
            options,
            report,
        } => {
            let best = engine.quick_recover(&text, &options.to_options()?)?;
            let results: Vec<RecoveryResult> = best.into_iter().collect();
            emit_results(&results, &report)
        }
        Commands::Batch {
            file,
            options,
            report,
        } => {
            let inputs = load_batch_inputs(&file)?;
            let items = engine.batch_recover(&inputs, &options.to_options()?);
            emit_batch(&items, &report)
        }
        Commands::Score { text, report } => {
            let credibility = engine.score_text(&text);
            emit_report(&credibility, &report)
        }
        Commands::Detect { text } => {
            for category in engine.detect_categories(&text) {
                println!("{}", category.as_str());
            }
            Ok(())
        }
        Commands::Pairs {
            text,
            options,
            report,
        } => {
            let pairs = engine.recommended_pairs(&text, &options.to_options()?);
            emit_pairs(&pairs, &report)
        }
        Commands::Encodings { category } => {
            let category = match category.as_deref() {
                Some(label) => Some(
                    PairCategory::parse(label)
                        .ok_or_else(|| format!("unknown category: {label}"))?,
                ),
                None => None,
            };
            for encoding in engine.list_supported_encodings(category) {
                println!("{encoding}");
            }
            Ok(())
        }
        Commands::Strategies => {
            for strategy in engine.list_strategies() {
                println!("{strategy}");
            }
            Ok(())
        }
        Commands::Info { encoding } => {
            let info = engine.encoding_info(&encoding);
            let category = info
                .category
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("encoding: {}", info.encoding);
            println!("category: {category}");
            println!("supported: {}", info.supported);
            Ok(())
        }
    }
}

/// Unknown strategy labels fall back to `balanced` rather than failing.
fn resolve_strategy(label: &str) -> Strategy {
    Strategy::parse(label).unwrap_or_else(|| {
        log::warn!("unknown strategy {label:?}, using balanced");
        Strategy::default()
    })
}

fn load_batch_inputs(path: &PathBuf) -> CliResult<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim_start().starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(&contents)?;
        // Non-string entries become empty inputs; the engine reports each as
        // a per-item validation failure instead of aborting the batch.
        return Ok(values
            .into_iter()
            .map(|value| match value {
                serde_json::Value::String(text) => text,
                _ => String::new(),
            })
            .collect());
    }
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn emit_results(results: &[RecoveryResult], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_results_text(results),
        OutputFormat::Markdown => render_results_markdown(results),
        OutputFormat::Json => render_json(results)?,
    };
    emit_output(output, contents)
}

fn emit_batch(items: &[BatchItem], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_batch_text(items),
        OutputFormat::Markdown => render_batch_markdown(items),
        OutputFormat::Json => render_json(items)?,
    };
    emit_output(output, contents)
}

fn emit_report(report: &CredibilityReport, output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Markdown => render_report_markdown(report),
        OutputFormat::Json => render_json(report)?,
    };
    emit_output(output, contents)
}

fn emit_pairs(pairs: &[EncodingPair], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text | OutputFormat::Markdown => render_pairs_text(pairs),
        OutputFormat::Json => render_json(pairs)?,
    };
    emit_output(output, contents)
}

fn render_json<T: serde::Serialize + ?Sized>(payload: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_results_text(results: &[RecoveryResult]) -> String {
    if results.is_empty() {
        return "No recovery above the credibility threshold.\n".to_string();
    }
    let mut output = String::new();
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} -> {} (credibility {:.2})",
            rank + 1,
            result.source_encoding,
            result.target_encoding,
            result.credibility
        );
        let _ = writeln!(output, "   {}", result.recovered_text);
        let _ = writeln!(output, "   {}", result.description);
    }
    output
}

fn render_results_markdown(results: &[RecoveryResult]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Recovery Results\n");
    if results.is_empty() {
        let _ = writeln!(output, "No recovery above the credibility threshold.");
        return output;
    }
    for result in results {
        let _ = writeln!(
            output,
            "## {} -> {}\n",
            result.source_encoding, result.target_encoding
        );
        let _ = writeln!(output, "- Credibility: {:.2}", result.credibility);
        let _ = writeln!(output, "- Recovered: `{}`", result.recovered_text);
        let _ = writeln!(output, "- {}", result.description);
        let _ = writeln!(output);
    }
    output
}

fn render_batch_text(items: &[BatchItem]) -> String {
    let mut output = String::new();
    for item in items {
        let _ = writeln!(output, "[{}] {}", item.index, item.original_text);
        match (&item.result, &item.error) {
            (Some(best), _) => {
                let _ = writeln!(
                    output,
                    "    {} -> {}: {} (credibility {:.2})",
                    best.source_encoding,
                    best.target_encoding,
                    best.recovered_text,
                    best.credibility
                );
            }
            (None, Some(error)) => {
                let _ = writeln!(output, "    error: {error}");
            }
            (None, None) => {
                let _ = writeln!(output, "    no qualifying recovery");
            }
        }
    }
    output
}

fn render_batch_markdown(items: &[BatchItem]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Batch Recovery Report\n");
    for item in items {
        let _ = writeln!(output, "## Item {}\n", item.index);
        let _ = writeln!(output, "- Input: `{}`", item.original_text);
        let _ = writeln!(output, "- Success: {}", item.success);
        if let Some(best) = &item.result {
            let _ = writeln!(
                output,
                "- Best: `{}` via {} -> {} ({:.2})",
                best.recovered_text,
                best.source_encoding,
                best.target_encoding,
                best.credibility
            );
        }
        if let Some(error) = &item.error {
            let _ = writeln!(output, "- Error: {error}");
        }
        let _ = writeln!(output);
    }
    output
}

fn render_report_text(report: &CredibilityReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Score: {:.2}", report.score);
    let _ = writeln!(output, "Frequency: {:.2}", report.frequency_score);
    let _ = writeln!(output, "Language: {:.2}", report.language_score);
    let _ = writeln!(output, "Structure: {:.2}", report.structure_score);
    let _ = writeln!(output, "Primary language: {:?}", report.primary_language);
    let _ = writeln!(
        output,
        "Characters: {} total, {} CJK, {} Latin, {} digits, {} punctuation, {} symbols",
        report.stats.length,
        report.stats.chinese_count,
        report.stats.english_count,
        report.stats.number_count,
        report.stats.punctuation_count,
        report.stats.symbol_count
    );
    if let Some(error) = &report.error {
        let _ = writeln!(output, "Note: {error}");
    }
    output
}

fn render_report_markdown(report: &CredibilityReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Credibility Report\n");
    let _ = writeln!(output, "- Score: {:.2}", report.score);
    let _ = writeln!(output, "- Frequency: {:.2}", report.frequency_score);
    let _ = writeln!(output, "- Language: {:.2}", report.language_score);
    let _ = writeln!(output, "- Structure: {:.2}", report.structure_score);
    let _ = writeln!(output, "- Primary language: {:?}", report.primary_language);
    output
}

fn render_pairs_text(pairs: &[EncodingPair]) -> String {
    let mut output = String::new();
    for pair in pairs {
        let _ = writeln!(
            output,
            "{} -> {} [{}] priority {}",
            pair.source_encoding,
            pair.target_encoding,
            pair.category.as_str(),
            pair.priority
        );
    }
    output
}
