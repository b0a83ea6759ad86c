//! Marker scanning over transcript segments.
//!
//! One compiled, case-insensitive alternation recognizes `"chapter <digits>"`
//! plus the structural section keywords. Every match becomes a [`Marker`]
//! carrying the *owning segment's* timing, never the match's character
//! offset, because a transcript segment is the finest timing unit we trust.

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::keywords::{ALL_KEYWORDS, SectionKeyword};
use crate::report::format_timestamp_mmss;
use crate::segments::{Segment, Transcript};
use crate::{Error, Result};

/// What a scanned marker refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// A spoken `"chapter N"` phrase.
    Chapter(u32),
    /// A structural section name (prologue, appendix, ...).
    Section(SectionKeyword),
}

/// One keyword occurrence found inside a segment.
///
/// A segment mentioning several keywords yields several markers, all sharing
/// that segment's `start`/`end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub start_seconds: f32,
    pub end_seconds: f32,
    /// The phrase as it appeared in the transcript (original casing).
    pub matched_text: String,
    pub kind: MarkerKind,
}

/// Scans transcripts for chapter and structural-section markers.
///
/// The pattern is compiled once at construction; reuse the scanner across
/// files rather than rebuilding it per run.
pub struct MarkerScanner {
    regex: Regex,
}

impl MarkerScanner {
    /// Build a scanner recognizing numbered chapters plus every section keyword.
    pub fn new() -> Result<Self> {
        Self::with_keywords(&ALL_KEYWORDS)
    }

    /// Build a scanner recognizing numbered chapters plus a chosen keyword subset.
    ///
    /// The numbered-chapter alternative always comes first so `"chapter 4"`
    /// is captured as a chapter rather than falling through to any keyword.
    pub fn with_keywords(keywords: &[SectionKeyword]) -> Result<Self> {
        let mut pattern = String::from(r"(?i)(chapter (\d+)");
        for keyword in keywords {
            pattern.push('|');
            pattern.push_str(keyword.pattern());
        }
        pattern.push(')');

        let regex = Regex::new(&pattern)
            .map_err(|err| Error::msg(format!("invalid marker pattern: {err}")))?;
        Ok(Self { regex })
    }

    /// Scan every segment in order and return all markers found, in segment
    /// iteration order (not yet time-sorted).
    ///
    /// Zero segments or zero matches yields an empty list; that is a valid
    /// "no structural markers" outcome, not an error. Corrupt segment timing
    /// is the only failure mode.
    pub fn scan(&self, transcript: &Transcript) -> Result<Vec<Marker>> {
        transcript.validate()?;

        let total = transcript
            .duration_seconds
            .filter(|d| *d > 0.0)
            .or_else(|| transcript.final_end_seconds());

        let mut markers = Vec::new();
        for seg in &transcript.segments {
            if let Some(total) = total {
                trace!(
                    progress_percent = format!("{:.0}", seg.end_seconds / total * 100.0),
                    position = %format_timestamp_mmss(seg.end_seconds),
                    "scanned segment"
                );
            }

            for caps in self.regex.captures_iter(&seg.text) {
                let Some(matched) = caps.get(1) else {
                    continue;
                };

                let kind = if let Some(digits) = caps.get(2) {
                    match digits.as_str().parse::<u32>() {
                        Ok(number) => MarkerKind::Chapter(number),
                        Err(_) => {
                            // A digit run too long for u32 cannot name a real chapter.
                            warn!(digits = digits.as_str(), "ignoring oversized chapter number");
                            continue;
                        }
                    }
                } else {
                    let Some(keyword) = SectionKeyword::from_matched(matched.as_str()) else {
                        continue;
                    };
                    MarkerKind::Section(keyword)
                };

                debug!(
                    matched = matched.as_str(),
                    at = %format_timestamp_mmss(seg.start_seconds),
                    "found marker"
                );
                markers.push(Marker {
                    start_seconds: seg.start_seconds,
                    end_seconds: seg.end_seconds,
                    matched_text: matched.as_str().to_owned(),
                    kind,
                });
            }
        }

        if markers.is_empty() && !transcript.segments.is_empty() {
            log_near_misses(&transcript.segments);
        }

        Ok(markers)
    }
}

/// When nothing matched at all, surface the segments that *almost* look like
/// chapter announcements so an operator can judge whether the transcript or
/// the narration is at fault.
fn log_near_misses(segments: &[Segment]) {
    let Ok(loose) = Regex::new(r"(?i)\bchapter\b|\b(one|two|three|four|five|1|2|3|4|5)\b") else {
        return;
    };

    for seg in segments.iter().filter(|s| loose.is_match(&s.text)).take(10) {
        debug!(
            at = %format_timestamp_mmss(seg.start_seconds),
            text = seg.text.trim(),
            "possible chapter mention without a marker match"
        );
    }
}
