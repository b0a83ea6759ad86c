//! `chapterize` turns a narrated audiobook file into a chaptered m4b.
//!
//! This crate provides:
//! - Transcript scanning for spoken chapter and section markers
//! - Boundary resolution into ordered, deduplicated chapter intervals
//! - Placement checks that flag structural keywords heard out of place
//! - The ffmpeg plumbing to cut, convert, and assemble the final audiobook
//!
//! The library is usable from CLI tools and batch jobs alike; given the same
//! transcript, its segmentation decisions are deterministic.

// High-level API (most consumers should start here).
pub mod chapterize;
pub mod opts;

// The segmentation engine: transcript in, chapter decisions out.
pub mod keywords;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod segments;
pub mod titles;

// Chapter naming and interval data structures.
pub mod chapters;

// External tools: transcription and the ffmpeg/ffprobe plumbing.
pub mod ffmpeg;
pub mod process;
pub mod transcriber;

// Audio production: cutting clips, assembling the m4b, filing away.
pub mod assemble;
pub mod housekeeping;
pub mod split;

// Output selection and encoder interfaces.
pub mod chapter_encoder;
pub mod output_type;

// Output encoders that serialize chapters into various formats.
pub mod ffmeta_encoder;
pub mod json_array_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use chapterize::Chapterize;
pub use error::{Error, Result};
