use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::annotate::{AnnotatedText, LineAnnotator};
use crate::error::{AnnotateError, Result};
use crate::stats::{FileStats, FileStatus};

/// Configuration for per-file processing
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Buffer size for reading (default: 8KB)
    pub buffer_size: usize,
    /// Compute the annotations without touching the file
    pub dry_run: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            dry_run: false,
        }
    }
}

/// Lines of a file as read, each keeping its own line ending
#[derive(Debug, Clone, Default)]
pub struct FileLines {
    pub lines: Vec<String>,
    pub bytes_read: u64,
}

/// Reads a Markdown file, annotates its image embeds, and replaces it in place
pub struct FileProcessor {
    config: ProcessorConfig,
    annotator: LineAnnotator,
}

impl FileProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Ok(Self {
            config,
            annotator: LineAnnotator::new()?,
        })
    }

    /// Read the file as newline-inclusive lines.
    ///
    /// `\r\n` endings and a missing final newline are kept exactly as read.
    /// The file handle is closed before this returns.
    pub async fn read_file_lines(&self, path: &Path) -> Result<FileLines> {
        debug!("Reading file: {}", path.display());

        let file = File::open(path)
            .await
            .map_err(|e| AnnotateError::filesystem(path, e))?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);

        let mut result = FileLines::default();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(n) => {
                    result.bytes_read += n as u64;
                    result.lines.push(line);
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(AnnotateError::Encoding {
                        path: path.to_path_buf(),
                        line: result.lines.len() as u64 + 1,
                    });
                }
                Err(e) => return Err(AnnotateError::filesystem(path, e)),
            }
        }

        Ok(result)
    }

    /// Annotate one Markdown file.
    ///
    /// Each line goes through [`LineAnnotator::annotate_lines`] in order, so the
    /// output has exactly as many lines as the input. Files with nothing to
    /// annotate are not rewritten.
    pub async fn process_file(&self, path: &Path) -> Result<FileStats> {
        let start_time = Instant::now();

        let FileLines { lines, bytes_read } = self.read_file_lines(path).await?;

        let AnnotatedText {
            text: output,
            lines: lines_read,
            lines_annotated,
        } = self
            .annotator
            .annotate_lines(lines.iter().map(String::as_str));

        let status = if lines_annotated > 0 {
            FileStatus::Annotated
        } else {
            FileStatus::Unchanged
        };

        let written = status == FileStatus::Annotated && !self.config.dry_run;
        if written {
            replace_file_atomically(path, output.as_bytes()).await?;
        }

        let stats = FileStats {
            path: path.display().to_string(),
            lines_read,
            lines_annotated,
            bytes_read,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            status,
            written,
            error: None,
        };

        match (status, written) {
            (FileStatus::Annotated, true) => info!(
                "Annotated {}: {} of {} lines",
                path.display(),
                lines_annotated,
                stats.lines_read
            ),
            (FileStatus::Annotated, false) => info!(
                "Would annotate {}: {} of {} lines (dry run)",
                path.display(),
                lines_annotated,
                stats.lines_read
            ),
            _ => debug!("No image embeds to annotate in {}", path.display()),
        }

        Ok(stats)
    }
}

/// Annotate a single file with default configuration
pub async fn process_file(path: impl AsRef<Path>) -> Result<FileStats> {
    let processor = FileProcessor::new(ProcessorConfig::default())?;
    processor.process_file(path.as_ref()).await
}

/// Replace `path` with `contents` through a temporary file and a rename, so
/// an interrupted write never truncates the original. Symlinks are resolved
/// first: the link stays in place and its target receives the new contents.
/// The replacement keeps the target file's permissions.
async fn replace_file_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path)
        .await
        .map_err(|e| AnnotateError::filesystem(path, e))?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let permissions = fs::metadata(&target)
        .await
        .map_err(|e| AnnotateError::filesystem(&target, e))?
        .permissions();

    let temp_file = tempfile::Builder::new()
        .prefix(".lazymark-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| AnnotateError::filesystem(dir, e))?;
    // The TempPath removes the file on drop until it is persisted.
    let (std_file, temp_path) = temp_file.into_parts();

    let mut file = File::from_std(std_file);
    let write_result = async {
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);
    write_result.map_err(|e| AnnotateError::filesystem(&*temp_path, e))?;

    fs::set_permissions(&*temp_path, permissions)
        .await
        .map_err(|e| AnnotateError::filesystem(&*temp_path, e))?;

    temp_path
        .persist(&target)
        .map_err(|e| AnnotateError::filesystem(&target, e.error))?;

    debug!("Replaced {} ({} bytes)", target.display(), contents.len());
    Ok(())
}
