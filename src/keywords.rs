//! Structural section keywords and their placement policy.
//!
//! The scanner recognizes two families of markers: numbered chapters
//! (`"chapter 12"`) and the named structural sections of a book (prologue,
//! appendix, ...). Each section keyword carries exactly one placement
//! expectation, resolved here as a closed table rather than string-set
//! membership checks, so the policy is auditable and testable in one place.

/// Where a structural section is expected to sit relative to the numbered chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Expected strictly before the first numbered chapter.
    FrontMatter,
    /// Expected strictly after the last numbered chapter.
    BackMatter,
    /// Expected at either extremity, but never between the first and last chapter.
    EitherEnd,
}

/// A structural (non-chapter) section name recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKeyword {
    Introduction,
    Conclusion,
    Prologue,
    Epilogue,
    Foreword,
    Afterword,
    Dedication,
    Acknowledgement,
    Appendix,
    Addendum,
    Glossary,
    Bibliography,
    Index,
    Preface,
}

/// Every keyword the default scanner pattern recognizes.
pub const ALL_KEYWORDS: [SectionKeyword; 14] = [
    SectionKeyword::Introduction,
    SectionKeyword::Conclusion,
    SectionKeyword::Prologue,
    SectionKeyword::Epilogue,
    SectionKeyword::Foreword,
    SectionKeyword::Afterword,
    SectionKeyword::Dedication,
    SectionKeyword::Acknowledgement,
    SectionKeyword::Appendix,
    SectionKeyword::Addendum,
    SectionKeyword::Glossary,
    SectionKeyword::Bibliography,
    SectionKeyword::Index,
    SectionKeyword::Preface,
];

impl SectionKeyword {
    /// The lowercase spelling matched in transcripts and used in the scanner pattern.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Conclusion => "conclusion",
            Self::Prologue => "prologue",
            Self::Epilogue => "epilogue",
            Self::Foreword => "foreword",
            Self::Afterword => "afterword",
            Self::Dedication => "dedication",
            Self::Acknowledgement => "acknowledgement",
            Self::Appendix => "appendix",
            Self::Addendum => "addendum",
            Self::Glossary => "glossary",
            Self::Bibliography => "bibliography",
            Self::Index => "index",
            Self::Preface => "preface",
        }
    }

    /// The capitalized name used when presenting a keyword to an operator.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::Conclusion => "Conclusion",
            Self::Prologue => "Prologue",
            Self::Epilogue => "Epilogue",
            Self::Foreword => "Foreword",
            Self::Afterword => "Afterword",
            Self::Dedication => "Dedication",
            Self::Acknowledgement => "Acknowledgement",
            Self::Appendix => "Appendix",
            Self::Addendum => "Addendum",
            Self::Glossary => "Glossary",
            Self::Bibliography => "Bibliography",
            Self::Index => "Index",
            Self::Preface => "Preface",
        }
    }

    /// The placement policy table.
    pub fn placement(self) -> Placement {
        match self {
            Self::Introduction | Self::Prologue | Self::Foreword | Self::Preface => {
                Placement::FrontMatter
            }
            Self::Conclusion
            | Self::Epilogue
            | Self::Afterword
            | Self::Appendix
            | Self::Addendum
            | Self::Glossary
            | Self::Bibliography
            | Self::Index => Placement::BackMatter,
            Self::Dedication | Self::Acknowledgement => Placement::EitherEnd,
        }
    }

    /// Look a keyword up from matched text, case-insensitively.
    pub fn from_matched(text: &str) -> Option<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        ALL_KEYWORDS.into_iter().find(|kw| kw.pattern() == lowered)
    }
}
