use std::io::{IsTerminal as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flametile::batch::{BatchConfig, BatchObserver, BatchRenderer, UnitOutcome, UnitReport};
use flametile::render::{CpuRenderSettings, CpuRenderer, ProgressSink};
use flametile::variation::VariationRegistry;

#[derive(Parser, Debug)]
#[command(name = "flametile", version, about = "Batch fractal flame renderer")]
struct Cli {
    /// Output width in pixels.
    #[arg(short = 'w', long, default_value_t = 800)]
    width: u32,

    /// Output height in pixels.
    #[arg(short = 'H', long, default_value_t = 600)]
    height: u32,

    /// Samples per pixel.
    #[arg(short = 'q', long, default_value_t = 100)]
    quality: u32,

    /// Also write a Radiance HDR image next to each PNG.
    #[arg(long)]
    hdr: bool,

    /// Also write an HDR intensity map next to each PNG.
    #[arg(long)]
    intensity: bool,

    /// Put the output dimensions in file names.
    #[arg(short = 'D')]
    dimensions_in_filename: bool,

    /// Put the quality in file names.
    #[arg(short = 'Q')]
    quality_in_filename: bool,

    /// Re-render outputs that already exist.
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Render as 8x8 tiles and reassemble (width and height must be multiples of 8).
    #[arg(short = 'l', long = "low-mem")]
    low_memory: bool,

    /// Keep tile images after reassembly.
    #[arg(short = 'k', long)]
    keep_tiles: bool,

    /// Debug-level logging.
    #[arg(long)]
    verbose: bool,

    /// Render threads (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Flame files (.json or .flame).
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Cli {
    fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            hdr: self.hdr,
            intensity_map: self.intensity,
            dimensions_in_filename: self.dimensions_in_filename,
            quality_in_filename: self.quality_in_filename,
            overwrite: self.overwrite,
            low_memory: self.low_memory,
            keep_tiles: self.keep_tiles,
            ..BatchConfig::new(self.width, self.height, self.quality)
        }
    }

    /// The progress bar is drawn only for verbose runs on a terminal.
    fn shows_progress(&self, terminal: bool) -> bool {
        self.verbose && terminal
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = CpuRenderSettings {
        threads: cli.threads,
        ..CpuRenderSettings::default()
    };
    let renderer = CpuRenderer::new(VariationRegistry::builtin(), settings)
        .context("start renderer")?;
    let mut batch = BatchRenderer::new(cli.batch_config(), renderer)
        .context("invalid batch settings")?
        .with_observer(LogObserver);
    if cli.shows_progress(std::io::stderr().is_terminal()) {
        batch = batch.with_progress(ConsoleProgress::default());
    }

    for file in &cli.files {
        batch.enqueue(file);
    }
    if batch.queue().is_empty() {
        anyhow::bail!("no flame files to render");
    }

    let report = batch.run();
    let failures: Vec<_> = report.failures().collect();
    for (unit, error) in &failures {
        eprintln!("failed: {}: {error}", unit.label());
    }
    Ok(if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Prints the finished output path of each image to stdout.
struct LogObserver;

impl BatchObserver for LogObserver {
    fn unit_finished(&mut self, report: &UnitReport, remaining: usize) {
        let secs = report.elapsed.as_secs();
        match &report.outcome {
            UnitOutcome::Rendered { outputs } => {
                if let Some(path) = outputs.first() {
                    println!("[{remaining}]: {} in {}m{}s", path.display(), secs / 60, secs % 60);
                }
            }
            UnitOutcome::Reassembled { path, .. } => {
                println!("[{remaining}]: {} in {}m{}s", path.display(), secs / 60, secs % 60);
            }
            _ => {}
        }
    }
}

/// Single-line text progress bar on stderr.
#[derive(Default)]
struct ConsoleProgress {
    label: String,
    total: u64,
}

const BAR_WIDTH: u64 = 50;

impl ConsoleProgress {
    fn bar(&self, step: u64) -> String {
        let total = self.total.max(1);
        let filled = (step.min(total) * BAR_WIDTH / total) as usize;
        let mut bar = String::with_capacity(BAR_WIDTH as usize);
        for x in 0..BAR_WIDTH as usize {
            bar.push(match x {
                x if x < filled && x % 10 == 9 => 'o',
                x if x < filled && x % 5 == 4 => '~',
                x if x < filled => '-',
                x if x % 10 == 9 => '+',
                _ => ' ',
            });
        }
        bar
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn init_total(&mut self, total_steps: u64) {
        self.total = total_steps;
    }

    fn advance(&mut self, step: u64) {
        let pct = step as f64 * 100.0 / self.total.max(1) as f64;
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}: |{}| [{pct:5.1}%]", self.label, self.bar(step));
        if step >= self.total {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    }
}
