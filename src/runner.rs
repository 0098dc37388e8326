// Sequential driver: scan a directory, then annotate each file in scan order

use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::discovery::collect_markdown_files;
use crate::error::Result;
use crate::processor::{FileProcessor, ProcessorConfig};
use crate::stats::{FileStats, RunStats};

/// Configuration for a run over one directory
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Abort on the first file that fails instead of logging it and moving on
    pub fail_fast: bool,
    pub processor: ProcessorConfig,
}

/// Hooks called while a run progresses
pub trait RunObserver {
    fn files_discovered(&mut self, _count: usize) {}
    fn file_processed(&mut self, _stats: &FileStats) {}
}

impl RunObserver for () {}

/// Annotate every Markdown file directly inside `directory` with default configuration
pub async fn run(directory: impl AsRef<Path>) -> Result<RunStats> {
    run_with(directory, &RunConfig::default(), &mut ()).await
}

/// Annotate every Markdown file directly inside `directory`.
///
/// Files are handled one at a time: each is fully read, annotated, and
/// replaced before the next is opened. A directory that cannot be scanned
/// always fails the run. A file that fails is recorded in the returned stats,
/// unless `fail_fast` is set, in which case its error is returned.
pub async fn run_with(
    directory: impl AsRef<Path>,
    config: &RunConfig,
    observer: &mut dyn RunObserver,
) -> Result<RunStats> {
    let directory = directory.as_ref();
    let start_time = Instant::now();
    let mut run_stats = RunStats::new(directory, config.processor.dry_run);

    let files = collect_markdown_files(directory).await?;
    run_stats.files_discovered = files.len() as u64;
    observer.files_discovered(files.len());

    let processor = FileProcessor::new(config.processor.clone())?;

    for path in &files {
        let file_start = Instant::now();
        let file_stats = match processor.process_file(path).await {
            Ok(stats) => stats,
            Err(e) if config.fail_fast => {
                warn!("Aborting run: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("Failed to annotate {} (continuing): {}", path.display(), e);
                FileStats::failed(path, &e, file_start.elapsed().as_millis() as u64)
            }
        };

        observer.file_processed(&file_stats);
        run_stats.record(file_stats);
    }

    run_stats.total_processing_time_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Run completed in {}ms: {} annotated, {} unchanged, {} failed, {} images annotated",
        run_stats.total_processing_time_ms,
        run_stats.files_annotated,
        run_stats.files_unchanged,
        run_stats.files_failed,
        run_stats.images_annotated
    );

    Ok(run_stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotateError;
    use crate::stats::FileStatus;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        discovered: Option<usize>,
        processed: Vec<FileStatus>,
    }

    impl RunObserver for Recorder {
        fn files_discovered(&mut self, count: usize) {
            self.discovered = Some(count);
        }

        fn file_processed(&mut self, stats: &FileStats) {
            self.processed.push(stats.status);
        }
    }

    #[tokio::test]
    async fn test_run_reports_each_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.md"), "![a](a.png)\n").unwrap();
        std::fs::write(temp_dir.path().join("b.md"), "no images\n").unwrap();

        let mut recorder = Recorder::default();
        let stats = run_with(temp_dir.path(), &RunConfig::default(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.discovered, Some(2));
        assert_eq!(recorder.processed.len(), 2);
        assert_eq!(stats.files_discovered, 2);
        assert_eq!(stats.files_annotated, 1);
        assert_eq!(stats.files_unchanged, 1);
        assert_eq!(stats.images_annotated, 1);
    }

    #[tokio::test]
    async fn test_run_continues_past_bad_file_by_default() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.md"), [0xFF, 0xFE, b'\n']).unwrap();
        std::fs::write(temp_dir.path().join("good.md"), "![g](g.png)\n").unwrap();

        let stats = run(temp_dir.path()).await.unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_annotated, 1);
        assert!(stats.has_failures());
        let failed = stats
            .file_stats
            .iter()
            .find(|f| f.status == FileStatus::Failed)
            .unwrap();
        assert!(failed.path.ends_with("bad.md"));
        assert!(failed.error.as_deref().unwrap().contains("UTF-8"));
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("good.md")).unwrap(),
            "![g](g.png){:loading=\"lazy\"}\n"
        );
    }

    #[tokio::test]
    async fn test_run_fail_fast_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.md"), [0xFF, b'\n']).unwrap();

        let config = RunConfig {
            fail_fast: true,
            ..Default::default()
        };
        let result = run_with(temp_dir.path(), &config, &mut ()).await;

        assert!(matches!(result, Err(AnnotateError::Encoding { line: 1, .. })));
    }

    #[tokio::test]
    async fn test_run_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();

        let result = run(temp_dir.path().join("portfolio")).await;
        assert!(matches!(result, Err(AnnotateError::Filesystem { .. })));
    }
}
