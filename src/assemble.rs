//! Turning a directory of chapter clips into one tagged m4b audiobook.
//!
//! The stages mirror how the book is built: list clips in natural order,
//! write the list/metadata artifacts, convert each clip to AAC, concatenate,
//! then mux chapters, tags, and the cover into the final file.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::chapter_encoder::{ChapterEncoder, ChapterMeta};
use crate::ffmeta_encoder::FfmetaEncoder;
use crate::housekeeping;
use crate::{Error, Result, ffmpeg};

/// Reported after each clip finishes converting, for progress display.
#[derive(Debug, Clone)]
pub struct ConvertProgress {
    /// Clip file stem, e.g. `"Chapter 3 - The Road"`.
    pub label: String,
    /// Percent of total audio duration converted so far.
    pub percent: f32,
    /// Estimated time remaining, once enough has converted to extrapolate.
    pub eta: Option<Duration>,
    /// 1-based position of this clip.
    pub index: usize,
    pub total: usize,
}

/// Build `<dir>/<dirname>.m4b` from the audio clips inside `dir`.
///
/// `progress` is called after each clip conversion; pass a closure that
/// renders a bar, or one that does nothing.
pub fn assemble(
    dir: &Path,
    author: &str,
    cover: &Path,
    mut progress: impl FnMut(&ConvertProgress),
) -> Result<PathBuf> {
    let title = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::msg(format!("working directory has no name: {}", dir.display())))?
        .to_owned();

    let files = list_audio_files(dir)?;
    if files.is_empty() {
        return Err(Error::msg(format!("no audio files found in {}", dir.display())));
    }
    let files = housekeeping::sanitize_names(dir, files)?;

    // Every clip was cut from one source, so one probe speaks for all.
    let codec = ffmpeg::probe_codec(&dir.join(&files[0]))?;
    if codec != "mp3" {
        return Err(Error::msg(format!(
            "codec {codec:?} is not supported; only mp3 sources are handled"
        )));
    }
    info!(book = %title, codec = %codec, clips = files.len(), "assembling audiobook");

    write_filelist(&dir.join("filelist.txt"), dir, &files)?;
    let durations = probe_durations(dir, &files)?;
    let chapters_file = dir.join("chapters.txt");
    write_chapter_metadata(&chapters_file, &files, &durations, &title)?;

    let temps = convert_clips(dir, &files, &durations, &mut progress)?;
    let concat_list = write_concat_list(&dir.join("temp_concat_list.txt"), &temps)?;

    let output = dir.join(format!("{title}.m4b"));
    ffmpeg::concat(&concat_list, &output)?;

    // ffmpeg cannot edit in place, so chapters and cover go into a sibling
    // file that then replaces the plain concat output.
    let with_chapters = dir.join(format!("{title}_with_chapters.m4b"));
    ffmpeg::attach_metadata(&output, &chapters_file, cover, &title, author, &with_chapters)?;
    if !with_chapters.is_file() {
        return Err(Error::MissingArtifact(with_chapters));
    }
    fs::rename(&with_chapters, &output)?;

    for temp in &temps {
        fs::remove_file(temp)?;
    }

    info!(output = %output.display(), "audiobook assembled");
    Ok(output)
}

/// The audio clips in `dir`, in natural (digit-aware) name order.
pub fn list_audio_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(name = %name.to_string_lossy(), "skipping non-UTF-8 file name");
            continue;
        };
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".mp3") || lower.ends_with(".m4a") || lower.ends_with(".aac") {
            files.push(name.to_owned());
        }
    }
    files.sort_by_cached_key(|name| natural_key(name));
    Ok(files)
}

/// Probe every clip's duration, in list order.
pub fn probe_durations(dir: &Path, files: &[String]) -> Result<Vec<u64>> {
    files
        .iter()
        .map(|name| ffmpeg::probe_duration_ms(&dir.join(name)))
        .collect()
}

/// Write the ffmetadata chapter file for the final m4b.
pub fn write_chapter_metadata(
    path: &Path,
    files: &[String],
    durations_ms: &[u64],
    book_title: &str,
) -> Result<()> {
    let mut encoder = FfmetaEncoder::new(BufWriter::new(File::create(path)?));
    for meta in chapter_metas(files, durations_ms, book_title) {
        encoder.write_chapter(&meta)?;
    }
    encoder.close()
}

/// Chapter entries for the concatenated book: cumulative millisecond spans,
/// titled from the clip names. A lone clip becomes one chapter carrying the
/// book's own title.
fn chapter_metas(files: &[String], durations_ms: &[u64], book_title: &str) -> Vec<ChapterMeta> {
    if files.len() == 1 {
        return vec![ChapterMeta {
            title: book_title.to_owned(),
            start_ms: 0,
            end_ms: durations_ms.first().copied().unwrap_or(0),
        }];
    }

    let mut metas = Vec::with_capacity(files.len());
    let mut start = 0;
    for (name, duration) in files.iter().zip(durations_ms) {
        let end = start + duration;
        metas.push(ChapterMeta {
            title: clip_title(name),
            start_ms: start,
            end_ms: end,
        });
        start = end;
    }
    metas
}

/// Clip file name to chapter title: drop the extension, turn the label's
/// `" - "` separator into `": "`.
fn clip_title(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    stem.replace(" - ", ": ")
}

/// Convert each clip to stereo 44.1kHz AAC, reporting progress by audio
/// duration (file count would lie when chapter lengths vary).
fn convert_clips(
    dir: &Path,
    files: &[String],
    durations_ms: &[u64],
    progress: &mut impl FnMut(&ConvertProgress),
) -> Result<Vec<PathBuf>> {
    let total_ms: u64 = durations_ms.iter().sum();
    let started = Instant::now();
    let mut cumulative_ms = 0u64;
    let mut temps = Vec::with_capacity(files.len());

    for (index, (name, duration)) in files.iter().zip(durations_ms).enumerate() {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name);
        let temp = dir.join(format!("{stem}.m4a"));

        ffmpeg::convert_to_m4a(&dir.join(name), &temp)?;
        if !temp.is_file() {
            return Err(Error::MissingArtifact(temp));
        }

        cumulative_ms += duration;
        let fraction = if total_ms > 0 {
            cumulative_ms as f64 / total_ms as f64
        } else {
            0.0
        };
        let eta = (fraction > 0.0).then(|| {
            let elapsed = started.elapsed();
            elapsed.div_f64(fraction).saturating_sub(elapsed)
        });
        progress(&ConvertProgress {
            label: stem.to_owned(),
            percent: (fraction * 100.0) as f32,
            eta,
            index: index + 1,
            total: files.len(),
        });

        temps.push(temp);
    }

    Ok(temps)
}

/// Record the source clips, one dir-joined path per line.
fn write_filelist(path: &Path, dir: &Path, files: &[String]) -> Result<()> {
    let mut body = String::new();
    for name in files {
        body.push_str(&dir.join(name).to_string_lossy());
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

/// Write the concat demuxer input: absolute paths, single-quoted with
/// shell-style quote escaping.
fn write_concat_list(path: &Path, clips: &[PathBuf]) -> Result<PathBuf> {
    let mut body = String::new();
    for clip in clips {
        let absolute = std::path::absolute(clip)?;
        body.push_str("file '");
        body.push_str(&concat_escape(&absolute.to_string_lossy()));
        body.push_str("'\n");
    }
    fs::write(path, body)?;
    Ok(path.to_owned())
}

fn concat_escape(path: &str) -> String {
    path.replace('\'', "'\\''")
}

fn natural_key(name: &str) -> Vec<SortPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for ch in name.chars() {
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != in_digits {
            parts.push(SortPart::from_run(&mut current, in_digits));
        }
        in_digits = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(SortPart::from_run(&mut current, in_digits));
    }
    parts
}

/// One run of a file name, either a number or the text between numbers.
/// Numbers order before text so `"Chapter 2"` precedes `"Chapter 2b"`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortPart {
    Number(u64),
    Text(String),
}

impl SortPart {
    fn from_run(run: &mut String, digits: bool) -> Self {
        let text = std::mem::take(run);
        if digits {
            match text.parse() {
                Ok(number) => Self::Number(number),
                // A digit run too long for u64 still sorts, just textually.
                Err(_) => Self::Text(text),
            }
        } else {
            Self::Text(text.to_lowercase())
        }
    }
}
