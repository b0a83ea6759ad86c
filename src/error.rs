use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Chapterize's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Chapterize's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A transcript segment with corrupt timing. This always indicates a broken
    /// transcription collaborator, so we fail fast instead of tolerating it.
    #[error("malformed transcript segment {index}: {reason}")]
    MalformedSegment { index: usize, reason: String },

    /// An external tool (ffmpeg, ffprobe, whisper) was not found on PATH.
    #[error("external command not found: '{command}' (is it installed and on PATH?)")]
    CommandMissing { command: String },

    /// An external tool exited non-zero.
    #[error("'{command}' exited with status {status}: {stderr_tail}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_tail: String,
    },

    /// An external tool claimed success but the artifact it should have produced is absent.
    #[error("expected output file was not produced: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
