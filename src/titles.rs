//! Optional chapter titles supplied alongside the audio.
//!
//! One title per line, in chapter-number order. Blank lines and `#` comment
//! lines are skipped so the file can carry notes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::Result;

/// Ordered chapter titles: line `n` titles chapter `n`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleList {
    titles: Vec<String>,
}

impl TitleList {
    /// A list with no titles; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read titles from a file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Read titles from any line-oriented reader.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut titles = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            titles.push(trimmed.to_owned());
        }
        Ok(Self { titles })
    }

    /// The title for chapter `number`, when one was supplied.
    ///
    /// Chapter numbers are 1-based; chapter 0 and numbers past the end of the
    /// list miss rather than wrapping or erroring.
    pub fn title_for(&self, number: u32) -> Option<&str> {
        if number == 0 {
            return None;
        }
        self.titles.get(number as usize - 1).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
