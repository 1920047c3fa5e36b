use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use pdfdiff::export::{PageExporter, comparison_dir_name};
use pdfdiff::panic_handler::{flush_output, initialize_panic_handler};
use pdfdiff::pdf::{
    CompareConfig, ComparisonMode, HighlightStatus, MupdfDocument, Rgba, Threshold, Zoom, compare,
};
use pdfdiff::settings::{Settings, load_settings};

#[derive(Parser, Debug)]
#[command(name = "pdfdiff")]
#[command(version)]
#[command(about = "Compare two PDFs page by page and export highlighted renders", long_about = None)]
struct Cli {
    /// First (original) PDF
    #[arg(value_name = "A")]
    first: PathBuf,

    /// Second (revised) PDF
    #[arg(value_name = "B")]
    second: PathBuf,

    /// Output directory (defaults to "<A>_vs_<B>")
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Render zoom in percent (25-400)
    #[arg(long, value_name = "PCT", value_parser = parse_zoom)]
    zoom: Option<u16>,

    /// Export plain renders without insertion/deletion overlays
    #[arg(long)]
    no_highlight: bool,

    /// Overlay color for inserted words ("#RRGGBB", "#RRGGBBAA" or "r,g,b[,a]")
    #[arg(long, value_name = "COLOR", value_parser = parse_color)]
    insertion_color: Option<Rgba>,

    /// Overlay color for deleted words
    #[arg(long, value_name = "COLOR", value_parser = parse_color)]
    deletion_color: Option<Rgba>,

    /// Per-channel difference that marks a pixel as changed (1-100)
    #[arg(short, long, value_name = "T", value_parser = parse_threshold)]
    threshold: Option<u8>,

    /// Page filter applied before comparing: rgb, grayscale or text-only
    #[arg(short, long, value_name = "MODE", value_parser = parse_mode)]
    mode: Option<ComparisonMode>,

    /// Also export a difference map per page
    #[arg(long)]
    diff_map: bool,

    /// Log file
    #[arg(long, value_name = "FILE", default_value = "pdfdiff.log")]
    log_file: PathBuf,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Settings from the config file with command-line overrides applied
    fn settings(&self, mut settings: Settings) -> Settings {
        if let Some(zoom) = self.zoom {
            settings.zoom_percent = zoom;
        }
        if self.no_highlight {
            settings.highlight_differences = false;
        }
        if let Some(color) = self.insertion_color {
            settings.insertion_color = color;
        }
        if let Some(color) = self.deletion_color {
            settings.deletion_color = color;
        }
        if let Some(threshold) = self.threshold {
            settings.difference_threshold = threshold;
        }
        if let Some(mode) = self.mode {
            settings.comparison_mode = mode;
        }
        if self.diff_map {
            settings.show_difference_map = true;
        }
        settings
    }
}

fn parse_zoom(s: &str) -> Result<u16, String> {
    let percent: u16 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    Zoom::new(percent)
        .map(Zoom::percent)
        .map_err(|e| e.to_string())
}

fn parse_threshold(s: &str) -> Result<u8, String> {
    let value: u8 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    Threshold::new(value)
        .map(Threshold::get)
        .map_err(|e| e.to_string())
}

fn parse_color(s: &str) -> Result<Rgba, String> {
    s.parse().map_err(|e: pdfdiff::pdf::CompareError| e.to_string())
}

fn parse_mode(s: &str) -> Result<ComparisonMode, String> {
    s.parse().map_err(|e: pdfdiff::pdf::CompareError| e.to_string())
}

fn main() {
    initialize_panic_handler();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Comparison failed: {e:?}");
        eprintln!("Error: {e:?}");
        flush_output();
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?,
    )?;

    info!(
        "Starting pdfdiff: {} vs {}",
        cli.first.display(),
        cli.second.display()
    );

    let settings = cli.settings(load_settings());
    let config: CompareConfig = settings
        .compare_config()
        .context("Invalid comparison settings")?;

    let doc_a = MupdfDocument::open(&cli.first)
        .with_context(|| format!("Failed to open {}", cli.first.display()))?;
    let doc_b = MupdfDocument::open(&cli.second)
        .with_context(|| format!("Failed to open {}", cli.second.display()))?;

    let comparison = compare(&doc_a, &doc_b, &config).context("Comparison failed")?;

    let out_dir = cli
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(comparison_dir_name(&cli.first, &cli.second)));
    let written = PageExporter::export(&comparison, &out_dir)?;

    match &comparison.highlight {
        HighlightStatus::Disabled => println!("Highlighting disabled"),
        HighlightStatus::Highlighted { painted } => {
            println!("Highlighted {painted} changed words");
        }
        HighlightStatus::FallbackRaw { reason } => {
            println!("Highlighting unavailable ({reason}), exported plain renders");
        }
    }
    if config.show_difference_map {
        println!(
            "{} pixels differ above threshold {}",
            comparison.differing_pixels(),
            config.threshold
        );
    }
    println!(
        "Wrote {} images for {} pages to {}",
        written.len(),
        comparison.page_count(),
        out_dir.display()
    );

    info!("Shutting down pdfdiff");
    Ok(())
}
