use futures::stream::{self, Stream, StreamExt};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_stream::wrappers::ReadDirStream;
use tracing::{debug, info};

use crate::error::{AnnotateError, Result};

/// Literal, case-sensitive file name suffix selecting Markdown files
pub const MARKDOWN_SUFFIX: &str = ".md";

/// Lists the direct entries of `root_dir` and yields every `*.md` file.
///
/// Subdirectories are never descended into. Paths come out in the order the
/// filesystem lists them, which is not guaranteed to be stable across platforms.
///
/// Failing to open the directory is returned immediately; failures while
/// iterating its entries are yielded through the stream.
pub async fn discover_markdown_files(
    root_dir: impl AsRef<Path>,
) -> Result<impl Stream<Item = Result<PathBuf>>> {
    let root_path = root_dir.as_ref().to_path_buf();

    let read_dir = fs::read_dir(&root_path)
        .await
        .map_err(|e| AnnotateError::filesystem(&root_path, e))?;
    info!("Scanning for Markdown files in: {}", root_path.display());

    let state = DiscoveryState {
        root_dir: root_path,
        entries: ReadDirStream::new(read_dir),
    };

    Ok(stream::unfold(state, |mut state| async move {
        state.next_file().await.map(|result| (result, state))
    }))
}

/// Collect all Markdown files of `root_dir` into a Vec, stopping at the first error
pub async fn collect_markdown_files(root_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_markdown_files(root_dir).await?);

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    info!("Discovered {} Markdown files", files.len());
    Ok(files)
}

/// True when the entry name ends with `.md`. Non-UTF-8 names never match.
pub fn is_markdown_name(file_name: &OsStr) -> bool {
    file_name
        .to_str()
        .is_some_and(|name| name.ends_with(MARKDOWN_SUFFIX))
}

struct DiscoveryState {
    root_dir: PathBuf,
    entries: ReadDirStream,
}

impl DiscoveryState {
    async fn next_file(&mut self) -> Option<Result<PathBuf>> {
        loop {
            let entry = match self.entries.next().await? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(AnnotateError::filesystem(&self.root_dir, e))),
            };

            if !is_markdown_name(&entry.file_name()) {
                continue;
            }

            let path = entry.path();
            // Follows symlinks. An entry that cannot be stat'ed is still handed
            // out so the failure surfaces when the file itself is processed.
            match fs::metadata(&path).await {
                Ok(metadata) if !metadata.is_file() => {
                    debug!("Skipping non-file entry: {}", path.display());
                }
                _ => {
                    debug!("Found Markdown file: {}", path.display());
                    return Some(Ok(path));
                }
            }
        }
    }
}
