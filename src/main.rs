//! CLI for texcite - rewrite author-year citations as LaTeX citation keys.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use texcite::{pipeline, BibError, LookupMode, PipelineError};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Rewrite author-year citations in a plain-text manuscript as natbib
/// \citep{...} / \citet{...} keys taken from a BibTeX file
#[derive(Parser)]
#[command(name = "texcite")]
#[command(version)]
#[command(after_help = "\
Examples:
  texcite refs.bib draft.txt draft.tex
  texcite refs.bib draft.txt draft.tex --lenient --report rewrites.json

BibTeX keys must look like surname_token_year, e.g. @article{smith_widgets_2016,
Recognised citations: (Smith, 2016), (Smith et al., 2016; Jones, 2012a),
Smith et al. (2016), Smith and Jones (2016), Jones (2016)")]
struct Cli {
    /// The BibTeX file
    bib: PathBuf,

    /// The input text file
    input: PathBuf,

    /// The output filename (overwritten)
    output: PathBuf,

    /// Use a surname_???_year placeholder for citations missing from the
    /// bibliography instead of failing. Authors joined by `&` are not split,
    /// so "(Smith & Jones, 2016)" becomes smith & jones_???_2016
    #[arg(long)]
    lenient: bool,

    /// Write a JSON report of every rewrite to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input file not found / unreadable
    InputFile(String),
    /// Exit 11: bibliography file not found / unreadable
    BibFile(String),
    /// Exit 12: bibliography key not shaped surname_token_year
    MalformedKey(String),
    /// Exit 13: citation not found in bibliography
    ReferenceNotFound(String),
    /// Exit 15: cannot write output or report file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::MalformedKey(_) => 12,
            AppError::ReferenceNotFound(_) => 13,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::BibFile(msg) => {
                write!(f, "{}\n  hint: verify the bibliography path is correct", msg)
            }
            AppError::MalformedKey(msg) => {
                write!(
                    f,
                    "{}\n  hint: every entry key must have exactly three underscore-separated parts",
                    msg
                )
            }
            AppError::ReferenceNotFound(msg) => {
                write!(
                    f,
                    "{}\n  hint: add the entry to your bibliography, or rerun with --lenient to insert a ??? placeholder",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match &e {
            PipelineError::ReadInput { .. } => AppError::InputFile(e.to_string()),
            PipelineError::Bibliography {
                source: BibError::MalformedKey { .. },
                ..
            } => AppError::MalformedKey(e.to_string()),
            PipelineError::Bibliography { .. } => AppError::BibFile(e.to_string()),
            PipelineError::Resolve(_) => AppError::ReferenceNotFound(e.to_string()),
            PipelineError::WriteOutput { .. }
            | PipelineError::WriteReport { .. }
            | PipelineError::Serialize(_) => AppError::OutputFile(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let mode = if cli.lenient {
        LookupMode::Lenient
    } else {
        LookupMode::Strict
    };

    let report = pipeline::run(&cli.bib, &cli.input, &cli.output, mode)?;

    if let Some(report_path) = cli.report.as_deref() {
        pipeline::write_report(report_path, &report)?;
    }

    summarize(&report, &cli.output);
    println!("Done.");

    Ok(())
}

fn summarize(report: &texcite::Report, output: &Path) {
    let unresolved = report.unresolved();
    if unresolved > 0 {
        eprintln!(
            "rewrote {} citation(s) with {} ??? placeholder(s) to resolve by hand, wrote {}",
            report.len(),
            unresolved,
            output.display()
        );
    } else {
        eprintln!(
            "rewrote {} citation(s), wrote {}",
            report.len(),
            output.display()
        );
    }
}
