use std::path::PathBuf;

/// Options that control how an audiobook is produced.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (APIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Author name stamped into the m4b's `author`/`artist` tags.
    pub author: String,

    /// Whether chapter labels pull titles from the title list.
    ///
    /// When disabled, chapters are labelled by number only and the title
    /// list is neither read nor archived.
    pub use_titles: bool,

    /// Where the chapter title list lives.
    ///
    /// A missing file is not an error; chapters then carry numbers only.
    pub titles_path: PathBuf,

    /// Whisper model size (`"base"`, `"small"`, ...). Larger models hear
    /// chapter announcements more reliably at the cost of runtime.
    pub model: String,

    /// The whisper executable to invoke, overridable for wrapper scripts.
    pub program: String,

    /// Optional language hint (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, we allow whisper to auto-detect the spoken language.
    pub language: Option<String>,

    /// Keep the working directory instead of archiving and removing it.
    pub keep_workdir: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            author: String::new(),
            use_titles: true,
            titles_path: PathBuf::from("chapter_titles.txt"),
            model: "base".to_owned(),
            program: "whisper".to_owned(),
            language: None,
            keep_workdir: false,
        }
    }
}
