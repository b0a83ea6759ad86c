use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One timestamped unit of transcribed speech.
///
/// Produced by the transcription collaborator (see [`crate::transcriber`]); the
/// engine only ever reads these, it never rewrites text or timing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Segment {
    #[serde(rename = "start")]
    pub start_seconds: f32,
    #[serde(rename = "end")]
    pub end_seconds: f32,
    pub text: String,
}

impl Segment {
    pub fn new(start_seconds: f32, end_seconds: f32, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }
}

/// The full transcription result for one audio file.
///
/// `duration_seconds` is advisory: most Whisper frontends don't report it, and the
/// engine only uses it for progress percentages. Correctness never depends on it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Transcript {
    pub segments: Vec<Segment>,

    #[serde(rename = "duration", default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f32>,
}

impl Transcript {
    pub fn new(segments: Vec<Segment>, duration_seconds: Option<f32>) -> Self {
        Self {
            segments,
            duration_seconds,
        }
    }

    /// The end timestamp of the final segment, if any segments exist.
    ///
    /// This is the terminal boundary used when the last chapter has no later
    /// marker to stop at.
    pub fn final_end_seconds(&self) -> Option<f32> {
        self.segments.last().map(|seg| seg.end_seconds)
    }

    /// Validate segment timing shape.
    ///
    /// A segment whose end precedes its start (or whose times are negative or
    /// non-finite) means the transcription collaborator handed us garbage, and
    /// every downstream boundary computation would silently misbehave. We fail
    /// fast with the offending index instead.
    ///
    /// Zero-length segments (`end == start`) are tolerated: some Whisper builds
    /// emit them for punctuation-only cues.
    pub fn validate(&self) -> Result<()> {
        for (index, seg) in self.segments.iter().enumerate() {
            if !seg.start_seconds.is_finite() || !seg.end_seconds.is_finite() {
                return Err(Error::MalformedSegment {
                    index,
                    reason: format!(
                        "non-finite timing ({} -> {})",
                        seg.start_seconds, seg.end_seconds
                    ),
                });
            }
            if seg.start_seconds < 0.0 {
                return Err(Error::MalformedSegment {
                    index,
                    reason: format!("negative start time {}", seg.start_seconds),
                });
            }
            if seg.end_seconds < seg.start_seconds {
                return Err(Error::MalformedSegment {
                    index,
                    reason: format!(
                        "end time {} precedes start time {}",
                        seg.end_seconds, seg.start_seconds
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_ordinary_and_zero_length_segments() -> anyhow::Result<()> {
        let transcript = Transcript::new(
            vec![
                Segment::new(0.0, 4.5, "Chapter 1"),
                Segment::new(4.5, 4.5, "."),
                Segment::new(4.5, 9.0, "It begins."),
            ],
            Some(9.0),
        );
        transcript.validate()?;
        assert_eq!(transcript.final_end_seconds(), Some(9.0));
        Ok(())
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let transcript = Transcript::new(vec![Segment::new(10.0, 3.0, "broken")], None);
        let err = transcript.validate().unwrap_err();
        assert!(err.to_string().contains("malformed transcript segment 0"));
        assert!(err.to_string().contains("precedes start"));
    }

    #[test]
    fn validate_rejects_negative_and_non_finite_times() {
        let negative = Transcript::new(vec![Segment::new(-1.0, 2.0, "x")], None);
        assert!(negative.validate().is_err());

        let nan = Transcript::new(vec![Segment::new(f32::NAN, 2.0, "x")], None);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn final_end_seconds_is_none_for_empty_transcript() {
        assert_eq!(Transcript::default().final_end_seconds(), None);
    }

    #[test]
    fn segments_deserialize_from_whisper_json_shape() -> anyhow::Result<()> {
        // Whisper emits more fields than we model; unknown keys must be ignored.
        let raw = r#"{
            "segments": [
                {"id": 0, "start": 0.0, "end": 3.2, "text": " Chapter 1", "no_speech_prob": 0.01},
                {"id": 1, "start": 3.2, "end": 7.9, "text": " The sea was calm."}
            ],
            "language": "en"
        }"#;
        let transcript: Transcript = serde_json::from_str(raw)?;
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[1].text, " The sea was calm.");
        assert_eq!(transcript.duration_seconds, None);
        Ok(())
    }
}
