//! Error types for minecraft-store

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt guild document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path_and_operation() {
        let err = StoreError::io(
            "read",
            Path::new("/data/42.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("read"));
        assert!(msg.contains("/data/42.json"));
    }

    #[test]
    fn test_corrupt_error_display() {
        let source = serde_json::from_str::<i32>("{").unwrap_err();
        let err = StoreError::Corrupt {
            path: PathBuf::from("/data/7.json"),
            source,
        };
        assert!(err.to_string().starts_with("corrupt guild document"));
    }
}
