//! High-level API for turning a narrated audio file into chaptered output.
//!
//! We expose a single entry point (`Chapterize`) that wires up
//! transcription → marker scanning → boundary resolution, and drives the
//! audio extraction around the result.
//!
//! The intent is:
//! - We compile the marker pattern once and reuse it across files.
//! - Callers choose the transcription source via the [`Transcriber`] seam,
//!   so tests can feed canned transcripts and never touch whisper.
//! - The decision work (`segment`) is separated from the cutting work
//!   (`extract`) so a frontend can show the anomaly report in between.

use std::path::Path;

use tracing::{info, warn};

use crate::chapters::Naming;
use crate::keywords::SectionKeyword;
use crate::opts::Opts;
use crate::resolve::{Segmentation, resolve};
use crate::scan::MarkerScanner;
use crate::split;
use crate::titles::TitleList;
use crate::transcriber::{Transcriber, WhisperCli};
use crate::Result;

/// The main high-level segmentation entry point.
///
/// `Chapterize` owns the long-lived pieces of a run:
/// - a transcription backend
/// - the compiled marker pattern
///
/// Typical usage:
/// - Construct once.
/// - Call `segment` to decide the chapter structure, show the caller the
///   anomaly report, then call `extract` to cut the audio.
pub struct Chapterize<T: Transcriber = WhisperCli> {
    transcriber: T,
    scanner: MarkerScanner,
}

impl Chapterize<WhisperCli> {
    /// Create an instance that shells out to the whisper CLI configured in `opts`.
    pub fn new(opts: &Opts) -> Result<Self> {
        let mut whisper = WhisperCli::new()
            .with_program(&opts.program)
            .with_model(&opts.model);
        if let Some(language) = &opts.language {
            whisper = whisper.with_language(language);
        }
        Self::with_transcriber(whisper)
    }
}

impl<T: Transcriber> Chapterize<T> {
    /// Create an instance with a custom transcription source.
    pub fn with_transcriber(transcriber: T) -> Result<Self> {
        Ok(Self {
            transcriber,
            scanner: MarkerScanner::new()?,
        })
    }

    /// Restrict the structural keywords the scanner recognizes.
    pub fn with_keywords(mut self, keywords: &[SectionKeyword]) -> Result<Self> {
        self.scanner = MarkerScanner::with_keywords(keywords)?;
        Ok(self)
    }

    /// Transcribe `audio` and resolve its chapter structure.
    ///
    /// Interval output paths point into the work directory derived from the
    /// audio file name (extension stripped); nothing is written yet.
    pub fn segment(&self, audio: &Path, titles: &TitleList) -> Result<Segmentation> {
        let transcript = self.transcriber.transcribe(audio)?;
        info!(segments = transcript.segments.len(), "transcription finished");

        let markers = self.scanner.scan(&transcript)?;
        let naming = Naming::new(audio.with_extension(""), audio);
        Ok(resolve(
            markers,
            titles,
            transcript.final_end_seconds(),
            &naming,
        ))
    }

    /// Cut the resolved chapters out of `audio`, or fall back to copying the
    /// whole file into the work directory when no chapters were found.
    pub fn extract(&self, audio: &Path, segmentation: &Segmentation) -> Result<()> {
        let work_dir = audio.with_extension("");
        if segmentation.has_chapters() {
            let exported = split::export_clips(audio, &work_dir, &segmentation.chapters)?;
            info!(exported, of = segmentation.chapters.len(), "chapters extracted");
        } else {
            warn!("no chapter markers found; converting as a single audiobook file");
            split::copy_single(audio, &work_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::segments::{Segment, Transcript};

    struct Canned(Transcript);

    impl Transcriber for Canned {
        fn transcribe(&self, _audio: &Path) -> Result<Transcript> {
            Ok(self.0.clone())
        }
    }

    fn engine(segments: Vec<Segment>) -> Chapterize<Canned> {
        let canned = Canned(Transcript::new(segments, None));
        Chapterize::with_transcriber(canned).expect("engine construction")
    }

    #[test]
    fn segments_a_canned_transcript_end_to_end() -> anyhow::Result<()> {
        let engine = engine(vec![
            Segment::new(5.0, 8.0, " Prologue."),
            Segment::new(10.0, 12.0, " Chapter 1."),
            Segment::new(100.0, 103.0, " Chapter 2. The Road."),
            Segment::new(950.0, 955.0, " The end."),
        ]);

        let segmentation = engine.segment(Path::new("/in/Book.mp3"), &TitleList::empty())?;

        assert!(segmentation.has_chapters());
        let spans: Vec<_> = segmentation
            .chapters
            .iter()
            .map(|c| (c.number, c.start_seconds, c.end_seconds))
            .collect();
        assert_eq!(spans, vec![(1, 10.0, Some(100.0)), (2, 100.0, Some(955.0))]);
        assert_eq!(
            segmentation.chapters[0].output_path,
            PathBuf::from("/in/Book/Chapter 1.mp3")
        );
        // The prologue sits before chapter 1, where it belongs.
        assert!(segmentation.anomalies.is_empty());
        Ok(())
    }

    #[test]
    fn chapterless_audio_reports_all_structural_keywords() -> anyhow::Result<()> {
        let engine = engine(vec![
            Segment::new(0.0, 3.0, " Dedication."),
            Segment::new(40.0, 45.0, " Epilogue."),
        ]);

        let segmentation = engine.segment(Path::new("/in/Book.mp3"), &TitleList::empty())?;

        assert!(!segmentation.has_chapters());
        assert_eq!(segmentation.anomalies.total(), 2);
        Ok(())
    }

    #[test]
    fn extract_falls_back_to_a_single_file_copy() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let audio = dir.path().join("Book.mp3");
        std::fs::write(&audio, b"audio bytes")?;

        let engine = engine(vec![Segment::new(0.0, 3.0, " just narration")]);
        let segmentation = engine.segment(&audio, &TitleList::empty())?;
        engine.extract(&audio, &segmentation)?;

        let copied = dir.path().join("Book").join("Book.mp3");
        assert_eq!(std::fs::read(copied)?, b"audio bytes");
        Ok(())
    }
}
