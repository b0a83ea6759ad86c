use serde::Serialize;

use crate::Result;

/// Chapter metadata as written into the finished audiobook: millisecond
/// offsets into the concatenated file, not transcript seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterMeta {
    pub title: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

pub trait ChapterEncoder {
    fn write_chapter(&mut self, chapter: &ChapterMeta) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
