use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use lazymark::{run_with, FileStats, FileStatus, ProcessorConfig, RunConfig, RunObserver};

#[derive(Parser, Debug)]
#[command(name = "lazymark")]
#[command(about = "Append lazy-loading annotations to Markdown image embeds")]
#[command(version)]
struct Args {
    /// Directory whose *.md files are annotated (not recursive)
    #[arg(default_value = "./portfolio")]
    directory: PathBuf,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Report which files would change without writing them
    #[arg(long)]
    dry_run: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

/// Drives the console progress bar from run events
struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl RunObserver for ProgressObserver {
    fn files_discovered(&mut self, count: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(count as u64);
        }
    }

    fn file_processed(&mut self, stats: &FileStats) {
        if let Some(bar) = &self.bar {
            bar.set_message(stats.path.clone());
            bar.inc(1);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the summary.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    if !args.directory.is_dir() {
        anyhow::bail!("Not a readable directory: {}", args.directory.display());
    }

    let config = RunConfig {
        fail_fast: args.fail_fast,
        processor: ProcessorConfig {
            dry_run: args.dry_run,
            ..Default::default()
        },
    };

    let bar = if args.no_progress {
        None
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}")
                .context("Invalid progress bar template")?,
        );
        Some(bar)
    };
    let mut observer = ProgressObserver { bar };

    let stats = run_with(&args.directory, &config, &mut observer)
        .await
        .with_context(|| format!("Failed to annotate {}", args.directory.display()))?;

    if let Some(bar) = observer.bar.take() {
        bar.finish_and_clear();
    }

    if let Some(stats_out) = &args.stats_out {
        stats
            .write_json(stats_out)
            .await
            .with_context(|| format!("Failed to write stats to {}", stats_out.display()))?;
        info!("Wrote run statistics to {}", stats_out.display());
    }

    println!("lazymark v{} - {}", env!("CARGO_PKG_VERSION"), args.directory.display());
    println!("Found {} Markdown files", stats.files_discovered);
    if args.dry_run {
        for file in stats.file_stats.iter().filter(|f| f.status == FileStatus::Annotated) {
            println!("  would annotate {} ({} images)", file.path, file.lines_annotated);
        }
        println!("Files that would change: {}", stats.files_annotated);
    } else {
        println!(
            "Annotated: {} files ({} images), unchanged: {}",
            stats.files_annotated, stats.images_annotated, stats.files_unchanged
        );
    }

    if stats.has_failures() {
        for file in stats.file_stats.iter().filter(|f| f.status == FileStatus::Failed) {
            let error = file.error.as_deref().unwrap_or("unknown error");
            eprintln!("  failed {}: {}", file.path, error);
        }
        anyhow::bail!("{} of {} files failed", stats.files_failed, stats.files_discovered);
    }

    Ok(())
}
