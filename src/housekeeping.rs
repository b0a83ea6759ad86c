//! Input validation and end-of-run filing: backup, archive, tidy up.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::{Error, Result};

/// Check the pieces a run needs and derive its paths.
///
/// The audio file must be an existing mp3 with a same-stem `.jpg` cover next
/// to it, and the work directory (audio file minus extension) must not exist
/// yet so a previous run is never clobbered.
///
/// Returns `(work_dir, cover)`.
pub fn validate_inputs(audio_file: &Path) -> Result<(PathBuf, PathBuf)> {
    let work_dir = audio_file.with_extension("");
    if work_dir.exists() {
        return Err(Error::msg(format!(
            "directory '{}' already exists",
            work_dir.display()
        )));
    }

    if !audio_file.is_file() {
        return Err(Error::msg(format!(
            "the audio file '{}' does not exist",
            audio_file.display()
        )));
    }

    let is_mp3 = audio_file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
    if !is_mp3 {
        return Err(Error::msg(format!(
            "the audio file '{}' does not have an mp3 extension",
            audio_file.display()
        )));
    }

    let cover = audio_file.with_extension("jpg");
    if !cover.is_file() {
        return Err(Error::msg(format!(
            "book cover '{}' could not be found",
            cover.display()
        )));
    }

    Ok((work_dir, cover))
}

/// Rename clips whose names would fight the concat list or the shell:
/// apostrophes become typographic (`’`), backslashes become dashes, percent
/// signs become `pc`. Returns the (possibly renamed) file names in order.
pub fn sanitize_names(dir: &Path, files: Vec<String>) -> Result<Vec<String>> {
    let mut sanitized = Vec::with_capacity(files.len());
    for name in files {
        let replaced = name
            .replace('\'', "\u{2019}")
            .replace('\\', "-")
            .replace('%', "pc");
        if replaced != name {
            debug!(from = %name, to = %replaced, "renaming awkward clip name");
            fs::rename(dir.join(&name), dir.join(&replaced))?;
        }
        sanitized.push(replaced);
    }
    Ok(sanitized)
}

/// File the finished book away and drop the working tree.
///
/// The m4b is copied out beside the source audio; the source audio, cover,
/// and title list (when one was used) move into the work directory, which is
/// then archived as `<book>.orig.tar.gz` and deleted.
///
/// Returns the archive path.
pub fn clean_up(
    work_dir: &Path,
    audio_file: &Path,
    titles_path: Option<&Path>,
) -> Result<PathBuf> {
    let book = work_dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::msg(format!("working directory has no name: {}", work_dir.display())))?
        .to_owned();

    // List artifacts (filelist, chapters, concat list) have served their
    // purpose; drop them before anything is archived.
    for entry in fs::read_dir(work_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            fs::remove_file(&path)?;
        }
    }

    let finished = work_dir.join(format!("{book}.m4b"));
    if !finished.is_file() {
        return Err(Error::MissingArtifact(finished));
    }
    fs::copy(&finished, audio_file.with_extension("m4b"))?;

    if let Some(titles) = titles_path {
        if titles.is_file() {
            let name = titles.file_name().ok_or_else(|| {
                Error::msg(format!("titles path has no file name: {}", titles.display()))
            })?;
            fs::copy(titles, work_dir.join(name))?;
        }
    }

    let audio_name = audio_file.file_name().ok_or_else(|| {
        Error::msg(format!("audio path has no file name: {}", audio_file.display()))
    })?;
    fs::rename(audio_file, work_dir.join(audio_name))?;

    let cover = audio_file.with_extension("jpg");
    let cover_name = cover.file_name().ok_or_else(|| {
        Error::msg(format!("cover path has no file name: {}", cover.display()))
    })?;
    fs::rename(&cover, work_dir.join(cover_name))?;

    let parent = audio_file.parent().unwrap_or(Path::new(""));
    let archive_path = parent.join(format!("{book}.orig.tar.gz"));
    let mut builder = tar::Builder::new(GzEncoder::new(
        File::create(&archive_path)?,
        Compression::default(),
    ));
    builder.append_dir_all(&book, work_dir)?;
    builder.into_inner()?.finish()?;

    fs::remove_dir_all(work_dir)?;

    info!(archive = %archive_path.display(), "originals archived");
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_demands_mp3_cover_and_fresh_work_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let audio = dir.path().join("Book.mp3");

        // Missing audio file.
        assert!(validate_inputs(&audio).is_err());

        fs::write(&audio, b"x")?;
        // Missing cover.
        let err = validate_inputs(&audio).unwrap_err();
        assert!(err.to_string().contains("cover"));

        fs::write(dir.path().join("Book.jpg"), b"x")?;
        let (work_dir, cover) = validate_inputs(&audio)?;
        assert_eq!(work_dir, dir.path().join("Book"));
        assert_eq!(cover, dir.path().join("Book.jpg"));

        // Wrong extension.
        let wav = dir.path().join("Other.wav");
        fs::write(&wav, b"x")?;
        let err = validate_inputs(&wav).unwrap_err();
        assert!(err.to_string().contains("mp3 extension"));

        // Stale work directory.
        fs::create_dir(dir.path().join("Book"))?;
        let err = validate_inputs(&audio).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        Ok(())
    }

    #[test]
    fn sanitizing_renames_on_disk_and_in_the_list() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["Don't Panic.mp3", "fifty%.mp3", "plain.mp3"] {
            fs::write(dir.path().join(name), b"x")?;
        }

        let files = sanitize_names(
            dir.path(),
            vec![
                "Don't Panic.mp3".to_owned(),
                "fifty%.mp3".to_owned(),
                "plain.mp3".to_owned(),
            ],
        )?;

        assert_eq!(
            files,
            vec!["Don\u{2019}t Panic.mp3", "fiftypc.mp3", "plain.mp3"]
        );
        for name in &files {
            assert!(dir.path().join(name).is_file());
        }
        assert!(!dir.path().join("Don't Panic.mp3").exists());
        Ok(())
    }

    #[test]
    fn clean_up_backs_up_archives_and_removes_the_work_dir() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let audio = root.path().join("Book.mp3");
        let cover = root.path().join("Book.jpg");
        let titles = root.path().join("chapter_titles.txt");
        fs::write(&audio, b"original audio")?;
        fs::write(&cover, b"cover")?;
        fs::write(&titles, b"Alpha\nBeta\n")?;

        let work_dir = root.path().join("Book");
        fs::create_dir(&work_dir)?;
        fs::write(work_dir.join("Book.m4b"), b"finished book")?;
        fs::write(work_dir.join("Chapter 1.mp3"), b"clip")?;
        fs::write(work_dir.join("chapters.txt"), b"meta")?;
        fs::write(work_dir.join("filelist.txt"), b"list")?;

        let archive = clean_up(&work_dir, &audio, Some(&titles))?;

        // The finished book sits beside where the source used to be.
        assert_eq!(fs::read(root.path().join("Book.m4b"))?, b"finished book");
        // Everything else got folded into the archive.
        assert!(!work_dir.exists());
        assert!(!audio.exists());
        assert!(!cover.exists());
        assert_eq!(archive, root.path().join("Book.orig.tar.gz"));

        let mut entries = Vec::new();
        let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(File::open(&archive)?));
        for entry in tar.entries()? {
            entries.push(entry?.path()?.to_string_lossy().into_owned());
        }
        assert!(entries.iter().any(|p| p.ends_with("Chapter 1.mp3")));
        assert!(entries.iter().any(|p| p.ends_with("Book.mp3")));
        assert!(entries.iter().any(|p| p.ends_with("Book.jpg")));
        assert!(entries.iter().any(|p| p.ends_with("chapter_titles.txt")));
        // The list artifacts were removed before archiving.
        assert!(!entries.iter().any(|p| p.ends_with("chapters.txt")));
        assert!(!entries.iter().any(|p| p.ends_with("filelist.txt")));
        Ok(())
    }

    #[test]
    fn clean_up_requires_the_finished_book() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let audio = root.path().join("Book.mp3");
        fs::write(&audio, b"x")?;
        let work_dir = root.path().join("Book");
        fs::create_dir(&work_dir)?;

        let err = clean_up(&work_dir, &audio, None).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(_)));
        Ok(())
    }
}
