//! JSON encoding for [`FrameworkDocument`].
//!
//! Output is pretty-printed with two-space indentation and a trailing
//! newline. Key names follow the model: `objectives[].principles[]
//! .outcomes[].indicators[]`, every node carrying `id`, `title` and
//! `description`.

use std::fs;
use std::path::{Path, PathBuf};

use caf_common::CafError;
use thiserror::Error;

use crate::model::FrameworkDocument;

#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode failed at line {line}, column {column}: {source}")]
    Decode {
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("write to {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<FrameworkError> for CafError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::Write { path, source } => CafError::Io { path, source },
            other => CafError::Serialize(other.to_string()),
        }
    }
}

pub fn to_json(doc: &FrameworkDocument) -> Result<String, FrameworkError> {
    let mut text = serde_json::to_string_pretty(doc).map_err(FrameworkError::Encode)?;
    text.push('\n');
    Ok(text)
}

pub fn from_json(text: &str) -> Result<FrameworkDocument, FrameworkError> {
    serde_json::from_str(text).map_err(|source| FrameworkError::Decode {
        line: source.line(),
        column: source.column(),
        source,
    })
}

/// Serialize `doc` and write it to `path`, replacing any existing file.
///
/// Encoding happens before the file is touched, so an encode failure never
/// leaves a truncated document behind.
pub fn write_json(doc: &FrameworkDocument, path: &Path) -> Result<usize, FrameworkError> {
    let text = to_json(doc)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| FrameworkError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(path, text.as_bytes()).map_err(|source| FrameworkError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "json.written");
    Ok(text.len())
}
