pub mod annotate;
pub mod discovery;
pub mod error;
pub mod processor;
pub mod runner;
pub mod stats;

// Re-export main types for convenient access
pub use annotate::{AnnotatedText, LineAnnotator, LAZY_MARKER};
pub use error::{AnnotateError, Result};

pub use discovery::{collect_markdown_files, discover_markdown_files};
pub use processor::{process_file, FileProcessor, ProcessorConfig};
pub use runner::{run, run_with, RunConfig, RunObserver};
pub use stats::{FileStats, FileStatus, RunStats};
