//! Boundary resolution: scanned markers in, chapter intervals and an anomaly
//! report out.
//!
//! The resolver is pure. It never touches the filesystem and never fails;
//! transcripts with corrupt timing were rejected before markers existed.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::chapters::{ChapterInterval, Naming};
use crate::keywords::Placement;
use crate::report::AnomalyReport;
use crate::scan::{Marker, MarkerKind};
use crate::titles::TitleList;

/// Everything the resolver decided about one transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// Unique chapters, sorted by chapter number.
    pub chapters: Vec<ChapterInterval>,
    /// Structural keywords heard where their placement policy forbids them.
    pub anomalies: AnomalyReport,
}

impl Segmentation {
    /// False means the book gets the single-file fallback instead of cuts.
    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }
}

/// Resolve markers into chapter intervals and classify section placements.
///
/// `transcript_end` bounds the final chapter when known; without it the last
/// chapter is left open-ended and cut without a duration limit.
pub fn resolve(
    mut markers: Vec<Marker>,
    titles: &TitleList,
    transcript_end: Option<f32>,
    naming: &Naming,
) -> Segmentation {
    // Stable by start time, so markers born from the same segment keep the
    // order they appeared in its text.
    markers.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

    // Anchors span every numbered announcement, duplicates included: a
    // re-announced chapter still stretches the span the classifier trusts.
    let first_chapter_start = markers.iter().find_map(chapter_start);
    let last_chapter_start = markers.iter().rev().find_map(chapter_start);

    let mut chapters = Vec::new();
    let mut seen = HashSet::new();
    for (index, marker) in markers.iter().enumerate() {
        let MarkerKind::Chapter(number) = marker.kind else {
            continue;
        };
        if !seen.insert(number) {
            debug!(number, at = marker.start_seconds, "skipping repeated chapter announcement");
            continue;
        }

        // The very next marker bounds this chapter, whatever its kind: a
        // section heading or even a repeated number still ends the narration
        // that belongs to this chapter.
        let end_seconds = markers
            .get(index + 1)
            .map(|next| next.start_seconds)
            .or(transcript_end);
        chapters.push(naming.interval(number, marker.start_seconds, end_seconds, titles));
    }
    chapters.sort_by_key(|chapter| chapter.number);

    let mut anomalies = AnomalyReport::new();
    for marker in &markers {
        let MarkerKind::Section(keyword) = marker.kind else {
            continue;
        };
        let start = marker.start_seconds;
        let anomalous = match (keyword.placement(), first_chapter_start, last_chapter_start) {
            (Placement::FrontMatter, Some(first), _) => start >= first,
            (Placement::BackMatter, _, Some(last)) => start <= last,
            (Placement::EitherEnd, Some(first), Some(last)) => start >= first && start <= last,
            // No numbered chapters means no trusted region; report everything
            // rather than silently blessing unknown placements.
            _ => true,
        };
        if anomalous {
            anomalies.record(keyword, start);
        }
    }

    Segmentation { chapters, anomalies }
}

fn chapter_start(marker: &Marker) -> Option<f32> {
    match marker.kind {
        MarkerKind::Chapter(_) => Some(marker.start_seconds),
        MarkerKind::Section(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use super::*;
    use crate::keywords::SectionKeyword;

    fn chapter(number: u32, at: f32) -> Marker {
        Marker {
            start_seconds: at,
            end_seconds: at + 2.0,
            matched_text: format!("Chapter {number}"),
            kind: MarkerKind::Chapter(number),
        }
    }

    fn section(keyword: SectionKeyword, at: f32) -> Marker {
        Marker {
            start_seconds: at,
            end_seconds: at + 2.0,
            matched_text: keyword.display_name().to_owned(),
            kind: MarkerKind::Section(keyword),
        }
    }

    fn naming() -> Naming {
        Naming::new("/work/book", Path::new("/in/book.mp3"))
    }

    fn spans(segmentation: &Segmentation) -> Vec<(u32, f32, Option<f32>)> {
        segmentation
            .chapters
            .iter()
            .map(|c| (c.number, c.start_seconds, c.end_seconds))
            .collect()
    }

    #[test]
    fn duplicate_numbers_keep_the_first_announcement() {
        let markers = vec![chapter(3, 10.0), chapter(3, 20.0), chapter(5, 30.0), chapter(3, 40.0)];
        let out = resolve(markers, &TitleList::empty(), Some(100.0), &naming());

        // The repeats produce no intervals, yet each still ends the chapter
        // before it: 3 stops at 20, 5 stops at 40.
        assert_eq!(
            spans(&out),
            vec![(3, 10.0, Some(20.0)), (5, 30.0, Some(40.0))]
        );
    }

    #[test]
    fn chapters_sort_numerically_regardless_of_discovery_order() {
        let markers = vec![chapter(2, 50.0), chapter(1, 10.0)];
        let out = resolve(markers, &TitleList::empty(), Some(100.0), &naming());

        assert_eq!(
            spans(&out),
            vec![(1, 10.0, Some(50.0)), (2, 50.0, Some(100.0))]
        );
    }

    #[test]
    fn each_chapter_ends_where_the_next_marker_starts() {
        let markers = vec![chapter(1, 10.0), chapter(2, 42.5), chapter(3, 300.0)];
        let out = resolve(markers, &TitleList::empty(), Some(950.0), &naming());

        let spans = spans(&out);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].2, Some(pair[1].1));
        }
        assert_eq!(spans.last().map(|s| s.2), Some(Some(950.0)));
    }

    #[test]
    fn chapter_end_stops_at_structural_marker_between_chapters() {
        let markers = vec![
            chapter(1, 10.0),
            section(SectionKeyword::Epilogue, 40.0),
            chapter(2, 60.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(100.0), &naming());

        assert_eq!(
            spans(&out),
            vec![(1, 10.0, Some(40.0)), (2, 60.0, Some(100.0))]
        );
        // Back matter heard before the last chapter is also flagged.
        let entries: Vec<_> = out.anomalies.iter().collect();
        assert_eq!(entries, vec![(SectionKeyword::Epilogue, &[40.0][..])]);
    }

    #[test]
    fn markers_sharing_a_segment_keep_text_order() {
        // Both announcements come from one segment, so they share a start;
        // the stable sort keeps 1 before 2 and chapter 1 collapses to zero
        // length rather than swallowing chapter 2.
        let markers = vec![chapter(1, 10.0), chapter(2, 10.0)];
        let out = resolve(markers, &TitleList::empty(), Some(50.0), &naming());

        assert_eq!(
            spans(&out),
            vec![(1, 10.0, Some(10.0)), (2, 10.0, Some(50.0))]
        );
    }

    #[test]
    fn without_transcript_end_the_last_chapter_stays_open() {
        let out = resolve(vec![chapter(1, 10.0)], &TitleList::empty(), None, &naming());
        assert_eq!(spans(&out), vec![(1, 10.0, None)]);
    }

    #[test]
    fn front_matter_before_the_first_chapter_is_expected() {
        let markers = vec![
            section(SectionKeyword::Prologue, 5.0),
            chapter(1, 20.0),
            section(SectionKeyword::Prologue, 25.0),
            chapter(2, 60.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(100.0), &naming());

        let entries: Vec<_> = out.anomalies.iter().collect();
        assert_eq!(entries, vec![(SectionKeyword::Prologue, &[25.0][..])]);
    }

    #[test]
    fn back_matter_after_the_last_chapter_is_expected() {
        let markers = vec![
            chapter(1, 20.0),
            chapter(2, 100.0),
            section(SectionKeyword::Afterword, 150.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(200.0), &naming());
        assert!(out.anomalies.is_empty());
    }

    #[test]
    fn back_matter_at_the_last_chapter_start_is_flagged() {
        let markers = vec![
            chapter(1, 20.0),
            chapter(2, 100.0),
            section(SectionKeyword::Epilogue, 100.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(200.0), &naming());
        assert_eq!(out.anomalies.total(), 1);
    }

    #[test]
    fn either_end_keywords_flag_only_inside_the_chapter_span() {
        let markers = vec![
            section(SectionKeyword::Dedication, 15.0),
            chapter(1, 20.0),
            section(SectionKeyword::Dedication, 50.0),
            chapter(9, 100.0),
            section(SectionKeyword::Dedication, 150.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(200.0), &naming());

        let entries: Vec<_> = out.anomalies.iter().collect();
        assert_eq!(entries, vec![(SectionKeyword::Dedication, &[50.0][..])]);
    }

    #[test]
    fn the_chapter_span_is_a_closed_interval() {
        let markers = vec![
            section(SectionKeyword::Acknowledgement, 20.0),
            chapter(1, 20.0),
            chapter(2, 100.0),
            section(SectionKeyword::Acknowledgement, 100.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(200.0), &naming());

        let entries: Vec<_> = out.anomalies.iter().collect();
        assert_eq!(
            entries,
            vec![(SectionKeyword::Acknowledgement, &[20.0, 100.0][..])]
        );
    }

    #[test]
    fn anchors_include_discarded_duplicate_announcements() {
        // The repeat of chapter 1 at 80 widens the span even though it never
        // becomes an interval, so the epilogue at 50 is inside and flagged.
        let markers = vec![
            chapter(1, 10.0),
            section(SectionKeyword::Epilogue, 50.0),
            chapter(1, 80.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(100.0), &naming());

        assert_eq!(spans(&out), vec![(1, 10.0, Some(50.0))]);
        assert_eq!(out.anomalies.total(), 1);
    }

    #[test]
    fn without_chapters_every_structural_keyword_is_reported() {
        let markers = vec![
            section(SectionKeyword::Prologue, 5.0),
            section(SectionKeyword::Epilogue, 900.0),
            section(SectionKeyword::Dedication, 12.0),
        ];
        let out = resolve(markers, &TitleList::empty(), Some(1000.0), &naming());

        assert!(!out.has_chapters());
        assert_eq!(out.anomalies.total(), 3);
    }

    #[test]
    fn no_markers_resolve_to_nothing() {
        let out = resolve(vec![], &TitleList::empty(), Some(100.0), &naming());
        assert!(!out.has_chapters());
        assert!(out.anomalies.is_empty());
    }

    #[test]
    fn titles_substitute_into_labels_by_chapter_number() -> anyhow::Result<()> {
        let titles = TitleList::from_reader(Cursor::new("Alpha\nBeta\n"))?;
        let markers = vec![chapter(1, 0.0), chapter(2, 10.0), chapter(3, 20.0)];
        let out = resolve(markers, &titles, Some(30.0), &naming());

        let labels: Vec<_> = out.chapters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Chapter 1 - Alpha", "Chapter 2 - Beta", "Chapter 3"]
        );
        assert_eq!(
            out.chapters[0].output_path,
            Path::new("/work/book/Chapter 1 - Alpha.mp3")
        );
        Ok(())
    }

    #[test]
    fn resolution_is_deterministic() {
        let markers = || {
            vec![
                chapter(2, 50.0),
                section(SectionKeyword::Preface, 60.0),
                chapter(1, 10.0),
                chapter(2, 70.0),
            ]
        };
        let first = resolve(markers(), &TitleList::empty(), Some(100.0), &naming());
        let second = resolve(markers(), &TitleList::empty(), Some(100.0), &naming());
        assert_eq!(first, second);
    }
}
