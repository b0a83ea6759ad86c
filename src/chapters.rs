//! Chapter intervals and the naming scheme for their exported clips.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::chapter_encoder::ChapterMeta;
use crate::titles::TitleList;

/// One resolved chapter: where it starts, where it ends, and where its audio
/// clip will be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterInterval {
    /// Human-readable label, also the clip's file stem.
    pub label: String,
    pub number: u32,
    pub start_seconds: f32,
    /// `None` means "runs to the end of the recording": the cut is then
    /// unbounded instead of duration-limited.
    pub end_seconds: Option<f32>,
    pub output_path: PathBuf,
}

impl ChapterInterval {
    /// Clip length in seconds, when the end is known.
    pub fn duration_seconds(&self) -> Option<f32> {
        self.end_seconds.map(|end| end - self.start_seconds)
    }

    /// Millisecond metadata for the chapter encoders. An open-ended chapter
    /// becomes a zero-length stanza rather than inventing an end time.
    pub fn meta(&self) -> ChapterMeta {
        let start_ms = to_ms(self.start_seconds);
        let end_ms = self.end_seconds.map(to_ms).unwrap_or(start_ms);
        ChapterMeta {
            title: self.label.clone(),
            start_ms,
            end_ms,
        }
    }
}

fn to_ms(seconds: f32) -> u64 {
    (f64::from(seconds) * 1000.0).round() as u64
}

/// Where chapter clips land and what they are called.
///
/// Clips keep the source file's extension because they are cut with stream
/// copy, so the container format never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Naming {
    output_dir: PathBuf,
    extension: String,
}

impl Naming {
    /// Derive naming from the destination directory and the source audio file.
    pub fn new(output_dir: impl Into<PathBuf>, source: &Path) -> Self {
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("mp3")
            .to_owned();
        Self {
            output_dir: output_dir.into(),
            extension,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `"Chapter N"`, extended with `" - Title"` when the title list has an
    /// entry for this number.
    pub fn label(&self, number: u32, titles: &TitleList) -> String {
        match titles.title_for(number) {
            Some(title) => format!("Chapter {number} - {title}"),
            None => format!("Chapter {number}"),
        }
    }

    /// Build the full interval for a resolved chapter boundary.
    pub fn interval(
        &self,
        number: u32,
        start_seconds: f32,
        end_seconds: Option<f32>,
        titles: &TitleList,
    ) -> ChapterInterval {
        let label = self.label(number, titles);
        let output_path = self
            .output_dir
            .join(format!("{label}.{}", self.extension));
        ChapterInterval {
            label,
            number,
            start_seconds,
            end_seconds,
            output_path,
        }
    }
}
