//! Thin wrappers around the `ffmpeg` and `ffprobe` executables.
//!
//! Every invocation's argument list is built by a pure function, so the exact
//! command lines stay testable without the tools installed; spawning and
//! failure classification live in [`crate::process`].

use std::ffi::OsString;
use std::path::Path;

use crate::process::run;
use crate::{Error, Result};

/// The audio codec of the first audio stream, e.g. `"mp3"` or `"aac"`.
pub fn probe_codec(file: &Path) -> Result<String> {
    let output = run("ffprobe", &probe_codec_args(file))?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

/// Container duration in milliseconds.
pub fn probe_duration_ms(file: &Path) -> Result<u64> {
    let output = run("ffprobe", &probe_duration_args(file))?;
    parse_duration_ms(&String::from_utf8_lossy(&output.stdout))
}

/// Stream-copy a time range out of `input`. `duration_seconds` of `None`
/// copies through to the end of the file.
pub fn cut(
    input: &Path,
    start_seconds: f32,
    duration_seconds: Option<f32>,
    output: &Path,
) -> Result<()> {
    run("ffmpeg", &cut_args(input, start_seconds, duration_seconds, output))?;
    Ok(())
}

/// Re-encode one file to stereo 44.1kHz AAC in an m4a container.
pub fn convert_to_m4a(input: &Path, output: &Path) -> Result<()> {
    run("ffmpeg", &convert_to_m4a_args(input, output))?;
    Ok(())
}

/// Concatenate the files listed in `concat_list` (concat demuxer syntax)
/// into one AAC stream. Re-encoding here is deliberate: stream copy across
/// clip boundaries produces timestamp glitches some players trip over.
pub fn concat(concat_list: &Path, output: &Path) -> Result<()> {
    run("ffmpeg", &concat_args(concat_list, output))?;
    Ok(())
}

/// Mux `source` into `output` with chapter metadata, book tags, and the cover
/// image as an attached picture. ffmpeg cannot edit in place, so `output`
/// must differ from `source`.
pub fn attach_metadata(
    source: &Path,
    chapters_file: &Path,
    cover: &Path,
    title: &str,
    author: &str,
    output: &Path,
) -> Result<()> {
    run(
        "ffmpeg",
        &attach_metadata_args(source, chapters_file, cover, title, author, output),
    )?;
    Ok(())
}

fn parse_duration_ms(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| Error::msg(format!("unparsable ffprobe duration: {trimmed:?}")))?;
    Ok((seconds * 1000.0).round() as u64)
}

/// Common prefix for every ffmpeg invocation: quiet output, overwrite targets.
fn ffmpeg_base() -> Vec<OsString> {
    ["-hide_banner", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect()
}

fn probe_codec_args(file: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-select_streams",
        "a:0",
        "-show_entries",
        "stream=codec_name",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(file.into());
    args
}

fn probe_duration_args(file: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(file.into());
    args
}

fn cut_args(
    input: &Path,
    start_seconds: f32,
    duration_seconds: Option<f32>,
    output: &Path,
) -> Vec<OsString> {
    let mut args = ffmpeg_base();
    args.push("-i".into());
    args.push(input.into());
    args.push("-ss".into());
    args.push(start_seconds.to_string().into());
    if let Some(duration) = duration_seconds {
        args.push("-t".into());
        args.push(duration.to_string().into());
    }
    args.push("-c".into());
    args.push("copy".into());
    args.push(output.into());
    args
}

fn convert_to_m4a_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_base();
    args.push("-i".into());
    args.push(input.into());
    for arg in ["-c:a", "aac", "-b:a", "128k", "-ar", "44100", "-ac", "2"] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}

fn concat_args(concat_list: &Path, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_base();
    for arg in ["-f", "concat", "-safe", "0", "-i"] {
        args.push(arg.into());
    }
    args.push(concat_list.into());
    for arg in ["-c:a", "aac", "-b:a", "128k"] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}

fn attach_metadata_args(
    source: &Path,
    chapters_file: &Path,
    cover: &Path,
    title: &str,
    author: &str,
    output: &Path,
) -> Vec<OsString> {
    let mut args = ffmpeg_base();
    args.push("-i".into());
    args.push(source.into());
    args.push("-i".into());
    args.push(chapters_file.into());
    args.push("-i".into());
    args.push(cover.into());

    for arg in ["-map_metadata", "1", "-c:a", "copy"] {
        args.push(arg.into());
    }
    args.push("-metadata".into());
    args.push(format!("title={title}").into());
    args.push("-metadata".into());
    args.push(format!("album={title}").into());
    args.push("-metadata".into());
    args.push(format!("author={author}").into());
    args.push("-metadata".into());
    args.push(format!("artist={author}").into());

    for arg in ["-map", "0:a", "-map", "2", "-c:v", "mjpeg", "-disposition:v", "attached_pic"] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}
