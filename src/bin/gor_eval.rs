//! Meta-document evaluation runner.
//!
//! Loads one YAML/JSON meta-document, runs the validation gate, computes
//! Q1-Q4 and writes `<stem>_results.json` next to the input (or to `--out`).
//!
//! ## Configuration
//!
//! Environment variables:
//! - `GOR_ALPHA`, `GOR_BETA`: Q2 weights (default: 0.7 / 0.3)
//! - `GOR_REDUCED_VIEW`: `gist-only` or `gist-and-detail` (default: gist-only)
//! - `GOR_MANIFEST`: preregistration manifest fallback (default: manifest.yaml)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin gor_eval --features cli -- data/report.yaml --alpha 0.6
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gor_kernel::preflight::{Preflight, DEFAULT_MANIFEST};
use gor_kernel::{
    load_value, results_path_for, write_report, DocumentEvaluator, MetricsConfig, PipelineError,
    ReducedView,
};

/// Evaluate a meta-document and write its metrics report.
#[derive(Parser)]
#[command(name = "gor_eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input document (.yaml, .yml or .json)
    input: PathBuf,

    /// Output path (default: <input stem>_results.json)
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Weight of anchor coverage in Q2
    #[arg(long, env = "GOR_ALPHA", default_value_t = 0.7)]
    alpha: f64,

    /// Weight of normalized mean path in Q2
    #[arg(long, env = "GOR_BETA", default_value_t = 0.3)]
    beta: f64,

    /// Composition of the Q1 reduced view
    #[arg(long, env = "GOR_REDUCED_VIEW", default_value = "gist-only", value_parser = parse_view)]
    reduced_view: ReducedView,

    /// Preregistration manifest accepted when the input has no preregister block
    #[arg(long, env = "GOR_MANIFEST", default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,
}

fn parse_view(s: &str) -> Result<ReducedView, String> {
    ReducedView::from_str(s).ok_or_else(|| format!("unknown reduced view: {s}"))
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "gor_eval=info,gor_kernel=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(cli: &Cli) -> Result<PathBuf, PipelineError> {
    let config = MetricsConfig::default()
        .with_weights(cli.alpha, cli.beta)
        .with_reduced_view(cli.reduced_view);
    let evaluator = DocumentEvaluator::new(config).with_preflight(Preflight::with_manifest(&cli.manifest));

    let raw = load_value(&cli.input)?;
    let report = evaluator.run(raw)?;

    let out = cli.out.clone().unwrap_or_else(|| results_path_for(&cli.input));
    write_report(&out, &report)?;

    info!(
        doc_id = %report.doc_id,
        q1_distortion = report.metrics.q1.distortion,
        q2_a_sa = report.metrics.q2.a_sa,
        q3_v_ch = report.metrics.q3.v_ch,
        q4_g_a = report.metrics.q4.g_a,
        report_hash = %report.report_hash(),
        "report written"
    );
    Ok(out)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(out) => {
            println!("{}", out.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.code().unwrap_or("-"), error = %e, input = %cli.input.display(), "evaluation failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
