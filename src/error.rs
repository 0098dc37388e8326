use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning a directory or rewriting a Markdown file
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// Directory or file could not be listed, read, or written
    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File content is not valid UTF-8
    #[error("{} is not valid UTF-8 (line {line})", .path.display())]
    Encoding { path: PathBuf, line: u64 },

    /// The image-embed pattern failed to compile
    #[error("failed to build image-embed matcher: {0}")]
    Matcher(#[from] regex_automata::meta::BuildError),

    /// Run statistics could not be serialized
    #[error("failed to serialize run statistics: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnnotateError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Path of the file or directory the error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Filesystem { path, .. } | Self::Encoding { path, .. } => Some(path),
            Self::Matcher(_) | Self::Serialization(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = AnnotateError::filesystem(
            "portfolio/a.md",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "filesystem error on portfolio/a.md: denied");
        assert_eq!(err.path(), Some(std::path::Path::new("portfolio/a.md")));

        let err = AnnotateError::Encoding {
            path: PathBuf::from("b.md"),
            line: 7,
        };
        assert_eq!(err.to_string(), "b.md is not valid UTF-8 (line 7)");
    }
}
