// Integration test utilities and common code
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for creating temporary directories with Markdown files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a file with given content, creating parent directories as needed
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        self.create_file_bytes(relative_path, content.as_bytes())
    }

    pub fn create_file_bytes<P: AsRef<Path>>(&self, relative_path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Create a Markdown file from a list of newline-inclusive lines
    pub fn create_markdown_lines(&self, name: &str, lines: &[&str]) -> PathBuf {
        self.create_file(name, &lines.concat())
    }

    pub fn read<P: AsRef<Path>>(&self, relative_path: P) -> String {
        fs::read_to_string(self.root_path.join(relative_path)).expect("Failed to read test file")
    }

    pub fn read_bytes<P: AsRef<Path>>(&self, relative_path: P) -> Vec<u8> {
        fs::read(self.root_path.join(relative_path)).expect("Failed to read test file")
    }

    /// Sorted names of the direct entries of the fixture root
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.root_path)
            .expect("Failed to list fixture root")
            .map(|e| e.expect("Bad dir entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Split text into newline-inclusive lines
pub fn lines_of(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}
