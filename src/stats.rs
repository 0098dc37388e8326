// Per-file and per-run statistics, written as JSON by `--stats-out`

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::error::{AnnotateError, Result};

/// Outcome of processing one Markdown file
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// At least one image-embed line gained the lazy marker
    Annotated,
    /// Nothing to annotate; the file was left alone
    Unchanged,
    /// Reading or writing the file failed
    Failed,
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    pub lines_read: u64,
    pub lines_annotated: u64,
    pub bytes_read: u64,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    /// False for unchanged files, failures, and dry runs
    pub written: bool,
    pub error: Option<String>,
}

impl FileStats {
    pub(crate) fn failed(path: &Path, error: &AnnotateError, processing_time_ms: u64) -> Self {
        Self {
            path: path.display().to_string(),
            lines_read: 0,
            lines_annotated: 0,
            bytes_read: 0,
            processing_time_ms,
            status: FileStatus::Failed,
            written: false,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate statistics for one run over a directory
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    pub directory: String,
    /// Seconds since the Unix epoch
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub files_discovered: u64,
    pub files_annotated: u64,
    pub files_unchanged: u64,
    pub files_failed: u64,
    pub images_annotated: u64,
    pub dry_run: bool,
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    pub fn new(directory: &Path, dry_run: bool) -> Self {
        let run_start = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            directory: directory.display().to_string(),
            run_start,
            total_processing_time_ms: 0,
            files_discovered: 0,
            files_annotated: 0,
            files_unchanged: 0,
            files_failed: 0,
            images_annotated: 0,
            dry_run,
            file_stats: Vec::new(),
        }
    }

    /// Fold one file's outcome into the totals
    pub fn record(&mut self, stats: FileStats) {
        match stats.status {
            FileStatus::Annotated => self.files_annotated += 1,
            FileStatus::Unchanged => self.files_unchanged += 1,
            FileStatus::Failed => self.files_failed += 1,
        }
        self.images_annotated += stats.lines_annotated;
        self.file_stats.push(stats);
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Write the stats as pretty-printed JSON
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .map_err(|e| AnnotateError::filesystem(path, e))
    }
}
