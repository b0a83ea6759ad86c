//! Exporting resolved chapters as audio clips.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::chapters::ChapterInterval;
use crate::ffmpeg;
use crate::report::format_timestamp_mmss;
use crate::{Error, Result};

/// Cut every chapter out of `source` with stream copy, in the given order.
///
/// A failed cut is logged and skipped so one bad seek cannot sink an
/// hours-long run; a missing ffmpeg aborts immediately. Returns how many
/// clips were written.
pub fn export_clips(
    source: &Path,
    output_dir: &Path,
    chapters: &[ChapterInterval],
) -> Result<usize> {
    fs::create_dir_all(output_dir)?;

    let mut exported = 0;
    for chapter in chapters {
        match ffmpeg::cut(
            source,
            chapter.start_seconds,
            chapter.duration_seconds(),
            &chapter.output_path,
        ) {
            Ok(()) => {
                info!(
                    label = %chapter.label,
                    at = %format_timestamp_mmss(chapter.start_seconds),
                    "exported chapter"
                );
                exported += 1;
            }
            Err(err @ Error::CommandMissing { .. }) => return Err(err),
            Err(err) => {
                error!(label = %chapter.label, error = %err, "chapter export failed");
            }
        }
    }
    Ok(exported)
}

/// The no-chapters fallback: place the source file, unchanged, into the
/// working directory so assembly still has input.
pub fn copy_single(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        Error::msg(format!("audio path has no file name: {}", source.display()))
    })?;

    fs::create_dir_all(output_dir)?;
    let dest = output_dir.join(name);
    fs::copy(source, &dest)?;
    info!(dest = %dest.display(), "copied single file without chapter extraction");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_single_places_the_source_into_a_fresh_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("My Book.mp3");
        fs::write(&source, b"not really audio")?;

        let work = dir.path().join("My Book");
        let dest = copy_single(&source, &work)?;

        assert_eq!(dest, work.join("My Book.mp3"));
        assert_eq!(fs::read(&dest)?, b"not really audio");
        assert!(source.is_file());
        Ok(())
    }

    #[test]
    fn copy_single_fails_on_missing_source() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("nope.mp3");
        assert!(copy_single(&missing, &dir.path().join("out")).is_err());
        Ok(())
    }
}
