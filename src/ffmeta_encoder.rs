use std::io::Write;

use crate::Result;
use crate::chapter_encoder::{ChapterEncoder, ChapterMeta};

/// A `ChapterEncoder` that writes ffmpeg metadata (`;FFMETADATA1`) chapter
/// stanzas, the format `-map_metadata` consumes when muxing the audiobook.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - We write the `;FFMETADATA1` header lazily on the first chapter so that:
///   - callers can construct the encoder without immediately writing output
///   - close still emits a valid (chapterless) metadata file on empty runs
pub struct FfmetaEncoder<W: Write> {
    /// The underlying writer we stream metadata into.
    w: W,

    /// Whether we've written the `;FFMETADATA1` header.
    started: bool,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> FfmetaEncoder<W> {
    /// Create a new ffmetadata encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    /// Write the ffmetadata header if we haven't written it yet.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            // The header line is mandatory; ffmpeg rejects the file without it.
            self.w.write_all(b";FFMETADATA1\n")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> ChapterEncoder for FfmetaEncoder<W> {
    /// Write a single `[CHAPTER]` stanza.
    fn write_chapter(&mut self, chapter: &ChapterMeta) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write chapter: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        // Millisecond timebase matches the offsets we carry.
        writeln!(&mut self.w, "[CHAPTER]")?;
        writeln!(&mut self.w, "TIMEBASE=1/1000")?;
        writeln!(&mut self.w, "START={}", chapter.start_ms)?;
        writeln!(&mut self.w, "END={}", chapter.end_ms)?;

        // Title goes out verbatim; if we later need ffmetadata escaping,
        // this is where it happens.
        writeln!(&mut self.w, "title={}", chapter.title)?;

        // Blank line separates stanzas.
        writeln!(&mut self.w)?;

        // Flush so streaming consumers (stdout, pipes) see output promptly.
        self.w.flush()?;

        Ok(())
    }

    /// Finalize the metadata file and flush the underlying writer.
    ///
    /// This method is idempotent; an empty run still yields a valid file.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
