// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — bind images into a PDF, one image per page.
//
// Entry point. Initialises logging, reads configuration, and feeds files from
// the command line through the working set and compositor.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use folio_core::error::Result;
use folio_core::human_errors::humanize_error;
use folio_core::{FolioConfig, Orientation, PageConfig, PageFormat};
use folio_document::{ImageDecoder, PdfReader, RasterDecoder};
use folio_session::{CandidateFile, ComposeOutcome, Compositor, WorkingSet};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Bind images into a PDF, one image per page")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the given images into a PDF, in the order given
    Compose {
        /// Image files
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output PDF path (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page format: a3, a4, a5, letter, legal, tabloid
        #[arg(long, value_parser = parse_format)]
        page: Option<PageFormat>,

        /// Page orientation: portrait or landscape
        #[arg(long, value_parser = parse_orientation)]
        orientation: Option<Orientation>,
    },

    /// Print page count, page sizes, and metadata of a PDF
    Inspect {
        /// PDF file
        input: PathBuf,
    },
}

fn parse_format(raw: &str) -> std::result::Result<PageFormat, String> {
    PageFormat::from_name(raw).ok_or_else(|| {
        let names: Vec<&str> = PageFormat::ALL.iter().map(PageFormat::name).collect();
        format!("unknown page format '{raw}' (expected one of: {})", names.join(", "))
    })
}

fn parse_orientation(raw: &str) -> std::result::Result<Orientation, String> {
    Orientation::from_name(raw)
        .ok_or_else(|| format!("unknown orientation '{raw}' (expected portrait or landscape)"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "folio failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => FolioConfig::load(path)?,
        None => FolioConfig::default(),
    };

    match cli.command {
        Commands::Compose {
            images,
            output,
            page,
            orientation,
        } => {
            let page_config = resolve_page(&config, page, orientation);
            compose(&config, images, output, page_config).await
        }
        Commands::Inspect { input } => inspect(input),
    }
}

/// Command-line choices override the configured default page.
fn resolve_page(
    config: &FolioConfig,
    format: Option<PageFormat>,
    orientation: Option<Orientation>,
) -> PageConfig {
    PageConfig::new(
        format.unwrap_or(config.default_page.format),
        orientation.unwrap_or(config.default_page.orientation),
    )
}

async fn compose(
    config: &FolioConfig,
    images: Vec<PathBuf>,
    output: Option<PathBuf>,
    page: PageConfig,
) -> Result<()> {
    let candidates = images
        .iter()
        .map(CandidateFile::from_path)
        .collect::<Result<Vec<_>>>()?;

    let decoder: Arc<dyn ImageDecoder> = Arc::new(RasterDecoder::new());
    let mut working_set = WorkingSet::from_config(config, Arc::clone(&decoder));
    let report = working_set.add(candidates).await?;

    if report.unsupported > 0 {
        eprintln!("{} file(s) were not images and were ignored.", report.unsupported);
    }
    if let Some(notice) = report.capacity_notice() {
        eprintln!("{}", notice.message);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling");
            on_interrupt.cancel();
        }
    });

    let compositor = Compositor::new(config, decoder);
    match compositor
        .compose(working_set.snapshot(), page, &cancel)
        .await?
    {
        ComposeOutcome::Completed(document) => {
            let path = output.unwrap_or_else(|| PathBuf::from(&document.suggested_file_name));
            document.save(&path)?;
            println!(
                "Wrote {} page(s) to {}",
                document.page_count,
                path.display()
            );
            Ok(())
        }
        ComposeOutcome::NothingToCompose => {
            eprintln!("No images to compose.");
            Ok(())
        }
        // A fresh compositor cannot already be running.
        ComposeOutcome::AlreadyComposing => Ok(()),
    }
}

fn inspect(input: PathBuf) -> Result<()> {
    let reader = PdfReader::open(&input)?;
    println!("{}", input.display());
    println!("  pages: {}", reader.page_count());
    for (index, (width, height)) in reader.page_sizes_mm()?.into_iter().enumerate() {
        println!("  page {}: {:.1} x {:.1} mm", index + 1, width, height);
    }
    for key in ["Title", "Subject", "Author", "Creator", "Producer"] {
        if let Some(value) = reader.info_string(key) {
            println!("  {key}: {value}");
        }
    }
    Ok(())
}
