//! Common types shared across the caf-scrape crates.
//!
//! - [`CafError`] and [`Result`]: the error kinds a scrape run can end with
//! - [`observability`]: one-shot `tracing` initialisation for the binary and tests
//!
//! Every stage crate converts its own error type into [`CafError`] so the
//! binary can report a single kind and pick an exit status from it.
//!
//! ```rust
//! use caf_common::CafError;
//!
//! let err = CafError::StructureMismatch("no objectives".into());
//! assert_eq!(err.kind(), "structure_mismatch");
//! assert_ne!(err.exit_code(), 0);
//! ```
use std::path::PathBuf;

pub mod observability;

/// The ways a fetch-extract-write run can fail.
///
/// None of these are recovered locally; the pipeline stops at the first one.
#[derive(thiserror::Error, Debug)]
pub enum CafError {
    /// The page could not be fetched (connection, timeout, non-2xx status).
    #[error("network error: {0}")]
    Network(String),

    /// The page markup no longer matches the markers the extractor relies on.
    #[error("structure mismatch: {0}")]
    StructureMismatch(String),

    /// Writing the output document failed.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory document could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CafError {
    /// Stable snake_case label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CafError::Network(_) => "network",
            CafError::StructureMismatch(_) => "structure_mismatch",
            CafError::Io { .. } => "io",
            CafError::Serialize(_) => "serialize",
            CafError::Config(_) => "config",
        }
    }

    /// Process exit status for this failure. Always non-zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            CafError::Network(_) => 2,
            CafError::StructureMismatch(_) => 3,
            CafError::Io { .. } | CafError::Serialize(_) => 4,
            CafError::Config(_) => 5,
        }
    }
}

/// Convenient alias for results that use [`CafError`].
pub type Result<T> = std::result::Result<T, CafError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_non_zero_and_distinguish_stages() {
        let errs = [
            CafError::Network("refused".into()),
            CafError::StructureMismatch("missing h2".into()),
            CafError::Io {
                path: PathBuf::from("output.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            },
            CafError::Config("bad mode".into()),
        ];
        let codes: Vec<u8> = errs.iter().map(CafError::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        assert_eq!(codes, vec![2, 3, 4, 5]);
    }

    #[test]
    fn io_error_message_names_the_path() {
        let err = CafError::Io {
            path: PathBuf::from("out/output.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("out/output.json"));
        assert_eq!(err.kind(), "io");
    }
}
