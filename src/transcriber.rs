//! Transcription backends.
//!
//! The engine only needs timestamped text; where it comes from is behind the
//! [`Transcriber`] trait so tests can feed canned transcripts and the CLI can
//! shell out to an installed `whisper`.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::process::run;
use crate::segments::Transcript;
use crate::{Error, Result};

/// Pluggable speech-to-text source used by [`crate::Chapterize`].
///
/// A transcriber is responsible for turning an audio file into a
/// [`Transcript`] of timestamped segments. It must not reorder or merge
/// segments; downstream scanning relies on narration order.
pub trait Transcriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcript>;
}

/// A [`Transcriber`] that shells out to the OpenAI `whisper` CLI.
///
/// The CLI writes its JSON transcript next to other render formats in an
/// output directory; we point it at a temp dir and read the JSON back, so
/// nothing litters the caller's tree.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    program: String,
    model: String,
    language: Option<String>,
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self {
            program: "whisper".to_owned(),
            model: "base".to_owned(),
            language: None,
        }
    }
}

impl WhisperCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the executable name, e.g. a wrapper script or absolute path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Whisper model size, `"base"` by default. Larger models transcribe
    /// chapter announcements more reliably at the cost of runtime.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Pin the spoken language instead of letting whisper auto-detect.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, audio: &Path) -> Result<Transcript> {
        let output_dir = tempfile::tempdir()?;
        let json_path = transcript_json_path(output_dir.path(), audio)?;

        info!(
            audio = %audio.display(),
            model = self.model,
            "transcribing; this may take a while"
        );
        run(
            &self.program,
            &transcribe_args(audio, &self.model, self.language.as_deref(), output_dir.path()),
        )?;

        if !json_path.is_file() {
            return Err(Error::MissingArtifact(json_path));
        }
        let transcript: Transcript = serde_json::from_reader(BufReader::new(File::open(&json_path)?))?;
        Ok(transcript)
    }
}

/// Where the whisper CLI will write the JSON transcript for `audio`.
fn transcript_json_path(output_dir: &Path, audio: &Path) -> Result<PathBuf> {
    let stem = audio
        .file_stem()
        .ok_or_else(|| Error::msg(format!("audio path has no file name: {}", audio.display())))?;
    Ok(output_dir.join(stem).with_extension("json"))
}

fn transcribe_args(
    audio: &Path,
    model: &str,
    language: Option<&str>,
    output_dir: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![audio.into()];
    args.push("--model".into());
    args.push(model.into());
    args.push("--output_format".into());
    args.push("json".into());
    args.push("--output_dir".into());
    args.push(output_dir.into());
    if let Some(language) = language {
        args.push("--language".into());
        args.push(language.into());
    }
    args
}
