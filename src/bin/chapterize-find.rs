// Diagnostic: transcribe one audio file and show where a phrase is spoken.
// Useful when the main pipeline misses a chapter announcement and you want
// to see what the transcriber actually heard around it.

use anyhow::Result;
use clap::Parser;

use std::path::PathBuf;

use chapterize::logging;
use chapterize::report::format_timestamp_mmss;
use chapterize::segments::{Segment, Transcript};
use chapterize::transcriber::{Transcriber, WhisperCli};

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    let mut whisper = WhisperCli::new()
        .with_program(&params.whisper_bin)
        .with_model(&params.model);
    if let Some(language) = &params.language {
        whisper = whisper.with_language(language);
    }

    println!(
        "Transcribing '{}'... this may take a while",
        params.audiobook.display()
    );
    let transcript = whisper.transcribe(&params.audiobook)?;

    let hits = matching_segments(&transcript, &params.phrase);
    if hits.is_empty() {
        println!("No occurrences of '{}' found.", params.phrase);
        return Ok(());
    }

    println!("\nFound '{}' at:", params.phrase);
    for segment in hits {
        println!(
            " - {} → {}",
            format_timestamp_mmss(segment.start_seconds),
            segment.text.trim()
        );
    }
    Ok(())
}

/// Segments whose text contains `phrase`, case-insensitively.
fn matching_segments<'a>(transcript: &'a Transcript, phrase: &str) -> Vec<&'a Segment> {
    let needle = phrase.to_lowercase();
    transcript
        .segments
        .iter()
        .filter(|segment| segment.text.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Parser, Debug)]
#[command(name = "chapterize-find")]
#[command(about = "Find where a phrase is spoken in an audio file")]
struct Params {
    /// Path to the audio file to search.
    pub audiobook: PathBuf,

    /// Phrase to look for (case-insensitive).
    #[arg(default_value = "chapter 7")]
    pub phrase: String,

    /// Whisper model size used for transcription.
    #[arg(short = 'm', long = "model", default_value = "base")]
    pub model: String,

    /// Whisper executable to invoke.
    #[arg(long = "whisper-bin", default_value = "whisper")]
    pub whisper_bin: String,

    /// Spoken-language hint passed to the transcriber.
    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
