//! CLI binary for gpx-starting-point-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use gpx_starting_point_extract::{
    convert_to_file, ExtractConfig, ExtractionProgressCallback, FileSkip, InvalidWaypointPolicy,
    OutputProfile, ProgressCallback, RunSummary, Waypoint,
};
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a file counter bar plus one stderr line per
/// skipped file. The skip lines are printed even when the bar is hidden.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(show_bar: bool) -> Arc<Self> {
        let bar = if show_bar {
            // Cleared on drop too, so an aborted run leaves no stale bar.
            let bar = ProgressBar::new(0).with_finish(ProgressFinish::AndClear);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos:>3}/{len} files  {wide_msg:.dim}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
            bar.set_style(style);
            bar.set_prefix("Extracting");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(path.display().to_string());
    }

    fn on_waypoint(&self, _index: usize, _total: usize, _waypoint: &Waypoint) {
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, skip: &FileSkip) {
        // Diagnostic format is part of the CLI contract: `no waypoint found in <path>`.
        self.bar.suspend(|| eprintln!("{skip}"));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_files: usize, _extracted: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Starting points of all tracks, with Garmin address extensions
  gpx-starting-point-extract tracks/*.gpx --output starts.gpx

  # Add a bounds block and a POI category
  gpx-starting-point-extract tracks/*.gpx -o starts.gpx --bounds --category Trailheads

  # Plain GPX 1.1 points with the "Flag" symbol
  gpx-starting-point-extract tracks/*.gpx -o starts.gpx --profile basic

  # Keep going when a file's first waypoint has no name or coordinates
  gpx-starting-point-extract tracks/*.gpx -o starts.gpx --skip-invalid

INPUT:
  GPX 1.0 or 1.1 documents. The first <wpt> directly under <gpx> is used;
  files without one are reported as "no waypoint found in <path>" and skipped.

EXIT STATUS:
  0  output written (possibly with skipped files)
  1  fatal error: unreadable or malformed input, unsupported GPX version,
     incomplete waypoint, or output not writable; the output is not touched
  2  invalid command line

ENVIRONMENT VARIABLES:
  GPXSPE_OUTPUT    Default for --output
  GPXSPE_SYMBOL    Default for --symbol
  GPXSPE_CATEGORY  Default for --category
  GPXSPE_PROFILE   Default for --profile
  RUST_LOG         Log filter (overrides --verbose / --quiet)
"#;

/// Extract the first waypoint from each GPX file into one GPX file.
#[derive(Parser, Debug)]
#[command(
    name = "gpx-starting-point-extract",
    version,
    about = "Extract the first waypoint from each GPX file into one GPX waypoint file",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// GPX input files.
    #[arg(value_name = "INPUTFILE", required = true)]
    files: Vec<PathBuf>,

    /// GPX output file (replaced if it exists).
    #[arg(short, long, value_name = "OUTPUTFILE", env = "GPXSPE_OUTPUT")]
    output: PathBuf,

    /// Add metadata with bounds.
    #[arg(long)]
    bounds: bool,

    /// POI category (Garmin extension).
    #[arg(long, value_name = "NAME", env = "GPXSPE_CATEGORY")]
    category: Option<String>,

    /// Waypoint symbol. Defaults to "Flag" with --profile basic.
    #[arg(long, value_name = "NAME", env = "GPXSPE_SYMBOL")]
    symbol: Option<String>,

    /// Output flavour: garmin (gpxx extensions) or basic.
    #[arg(long, value_enum, env = "GPXSPE_PROFILE", default_value = "garmin")]
    profile: ProfileArg,

    /// Skip files whose first waypoint lacks lat, lon or name instead of failing.
    #[arg(long)]
    skip_invalid: bool,

    /// Override the creator attribute of the output document.
    #[arg(long, value_name = "TEXT")]
    creator: Option<String>,

    /// Print a JSON run summary on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and skip diagnostics.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Garmin,
    Basic,
}

impl From<ProfileArg> for OutputProfile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Garmin => OutputProfile::Garmin,
            ProfileArg::Basic => OutputProfile::Basic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Skip diagnostics are printed by the progress callback; library logs
    // stay at error level unless asked for.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let progress: ProgressCallback = CliProgressCallback::new(show_progress);
    let config = build_config(&cli, progress)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = convert_to_file(cli.files.as_slice(), &cli.output, &config)
        .context("Waypoint extraction failed")?;

    if cli.json {
        let summary = RunSummary {
            output: &cli.output,
            stats: &output.stats,
            bounds: output.bounds.as_ref(),
            skipped: &output.skipped,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} waypoints  {}  →  {}",
            if stats.skipped == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.extracted,
            stats.total_files,
            dim(&format!("{}ms", stats.duration_ms)),
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractConfig`.
fn build_config(cli: &Cli, progress: ProgressCallback) -> Result<ExtractConfig> {
    let mut builder = ExtractConfig::builder()
        .profile(cli.profile.into())
        .include_bounds(cli.bounds)
        .invalid_waypoint_policy(if cli.skip_invalid {
            InvalidWaypointPolicy::Skip
        } else {
            InvalidWaypointPolicy::Abort
        })
        .progress_callback(progress);

    if let Some(ref symbol) = cli.symbol {
        builder = builder.symbol(symbol.as_str());
    }
    if let Some(ref category) = cli.category {
        builder = builder.category(category.as_str());
    }
    if let Some(ref creator) = cli.creator {
        builder = builder.creator(creator.as_str());
    }

    builder.build().context("Invalid configuration")
}
