//! sizemap - bounded directory scanner with a treemap layout.
//!
//! Usage:
//!   sizemap [DIRECTORY]                 Scan and print the largest tiles
//!   sizemap [DIRECTORY] --format json   Emit records and rectangles as JSON
//!   sizemap --help                      Show help

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sizemap_layout::{LayoutConfig, Rectangle, SizedItem, TreemapLayout};
use sizemap_scan::{
    DEFAULT_UPDATE_INTERVAL, DeliveryError, FileRecord, ScanError, ScanLimits, ScanProgress,
    ScanStatus, StreamingBatcher, scan_streaming,
};

#[derive(Parser)]
#[command(
    name = "sizemap",
    version,
    about = "Scan a directory under time and size bounds and lay it out as a treemap",
    long_about = "sizemap walks a directory tree, stopping cleanly at the depth, record \
                  and time limits, and computes a size-proportional treemap layout of \
                  the files it found."
)]
struct Cli {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Deepest directory level to list
    #[arg(long, default_value_t = ScanLimits::DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Maximum number of entries to record
    #[arg(long, default_value_t = ScanLimits::DEFAULT_MAX_RECORDS)]
    max_files: u64,

    /// Scan time budget in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Margin around the canvas in pixels
    #[arg(long, default_value_t = 0)]
    padding: u32,

    /// Seconds between streamed progress batches
    #[arg(long, default_value_t = DEFAULT_UPDATE_INTERVAL.as_secs_f64())]
    update_interval: f64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Number of rectangles to list in text output
    #[arg(short = 'n', long, default_value = "20")]
    top: usize,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(&cli)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Scan, lay out, and print.
fn run(cli: &Cli) -> Result<()> {
    let limits = ScanLimits::builder()
        .max_depth(cli.max_depth)
        .max_records(cli.max_files)
        .timeout(Duration::from_secs(cli.timeout))
        .follow_symlinks(cli.follow_symlinks)
        .build()
        .map_err(ScanError::from)?;
    let interval = Duration::try_from_secs_f64(cli.update_interval)
        .context("Invalid update interval")?;
    let layout_config = LayoutConfig::builder()
        .width(cli.width)
        .height(cli.height)
        .padding(cli.padding)
        .build()
        .context("Invalid canvas")?;

    let mut streamed: u64 = 0;
    let sink = |batch: &[FileRecord]| -> Result<(), DeliveryError> {
        streamed += batch.len() as u64;
        if let Some(last) = batch.last() {
            eprint!("\rScanned {streamed} entries ({})", truncate(&last.name(), 40));
        }
        Ok(())
    };
    let mut batcher = StreamingBatcher::new(sink, interval);

    let mut walk = scan_streaming(&cli.directory, &limits, &mut batcher)
        .with_context(|| format!("Cannot scan {}", cli.directory.display()))?;
    let root = walk.root().to_path_buf();
    eprintln!("Scanning {}...", root.display());

    let records: Vec<FileRecord> = walk.by_ref().collect();
    let status = walk.status();
    let progress = walk.progress();
    let warnings = walk.warnings().len();
    drop(walk);

    batcher.flush();
    eprintln!();
    let stats = batcher.stats();
    tracing::debug!(
        batches = stats.batches_delivered,
        records = stats.records_delivered,
        failed = stats.failed_deliveries,
        "streaming finished"
    );

    let engine = TreemapLayout::with_config(layout_config);
    let rects = engine.layout(SizedItem::from_records(records.iter().cloned()));

    match cli.format {
        OutputFormat::Text => print_text(
            &root,
            status,
            &progress,
            warnings,
            &rects,
            engine.config(),
            cli.top,
        ),
        OutputFormat::Json => {
            let report = JsonReport::new(&root, status, &progress, &records, &rects);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_text(
    root: &Path,
    status: ScanStatus,
    progress: &ScanProgress,
    warnings: usize,
    rects: &[Rectangle<FileRecord>],
    config: &LayoutConfig,
    top: usize,
) {
    let (width, height) = config.drawable_size();
    println!();
    println!("{}", "─".repeat(70));
    println!(
        " {} - {}",
        root.display(),
        format_size(progress.bytes_scanned)
    );
    println!(
        " {} files, {} directories ({})",
        progress.files_scanned, progress.dirs_scanned, status
    );
    println!(
        " Scanned in {:.2}s ({:.0} entries/s)",
        progress.elapsed.as_secs_f64(),
        progress.records_per_second()
    );
    println!(" {} rectangles on a {width}x{height} canvas", rects.len());
    println!("{}", "─".repeat(70));
    println!();

    for rect in rects.iter().take(top) {
        let share = canvas_share(rect, config);
        println!(
            " {:<36} {:>10} {:>5}x{:<5} @ ({:>4},{:>4}) {}",
            truncate(&display_path(root, rect.payload()), 36),
            format_size(rect.item.size),
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            make_bar(share, 10)
        );
    }

    let remaining = rects.len().saturating_sub(top);
    if remaining > 0 {
        println!("   ... and {} more", remaining);
    }

    if status.is_truncated() {
        println!();
        println!(
            "Scan stopped early ({status}); results cover {} entries",
            progress.records_yielded
        );
    }
    if warnings > 0 {
        println!();
        println!("{} warning(s) during scan", warnings);
    }
}

/// JSON export of one run.
#[derive(Serialize)]
struct JsonReport {
    root: PathBuf,
    status: ScanStatus,
    progress: ScanProgress,
    records: Vec<JsonRecord>,
    rectangles: Vec<JsonRect>,
}

#[derive(Serialize)]
struct JsonRecord {
    path: PathBuf,
    size: u64,
    is_dir: bool,
    depth: u32,
    modified: DateTime<Utc>,
}

#[derive(Serialize)]
struct JsonRect {
    path: PathBuf,
    size: u64,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl JsonReport {
    fn new(
        root: &Path,
        status: ScanStatus,
        progress: &ScanProgress,
        records: &[FileRecord],
        rects: &[Rectangle<FileRecord>],
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            status,
            progress: progress.clone(),
            records: records
                .iter()
                .map(|r| JsonRecord {
                    path: r.path.clone(),
                    size: r.size,
                    is_dir: r.is_dir,
                    depth: r.depth,
                    modified: DateTime::<Utc>::from(r.modified),
                })
                .collect(),
            rectangles: rects
                .iter()
                .map(|r| JsonRect {
                    path: r.payload().path.clone(),
                    size: r.item.size,
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                })
                .collect(),
        }
    }
}

/// Fraction of the drawable canvas covered by `rect`.
fn canvas_share<T>(rect: &Rectangle<T>, config: &LayoutConfig) -> f64 {
    let (width, height) = config.drawable_size();
    let canvas = u64::from(width) * u64::from(height);
    if canvas == 0 {
        return 0.0;
    }
    rect.area() as f64 / canvas as f64
}

/// Path relative to the scan root, falling back to the full path.
fn display_path(root: &Path, record: &FileRecord) -> String {
    record
        .path
        .strip_prefix(root)
        .unwrap_or(&record.path)
        .display()
        .to_string()
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length (in characters).
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
