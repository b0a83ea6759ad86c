/// The supported output formats for encoded chapter metadata.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps format
///   selection explicit and discoverable.
///
/// Integration notes:
/// - `ValueEnum` allows this enum to be used directly as a CLI flag with `clap`.
/// - Each variant maps to a concrete `ChapterEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Output chapters as a JSON array.
    Json,

    /// Output chapters as ffmpeg metadata (`;FFMETADATA1`) stanzas.
    Ffmeta,
}
