use serde::Serialize;

/// A single highlight as rendered on the Blinkist highlights page.
///
/// Field values are kept exactly as the page renders them, surrounding
/// whitespace included. Comparisons against Readwise trim both sides.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HighlightRecord {
    /// Title of the book summary the highlight belongs to.
    pub source_title: String,
    /// Chapter heading shown under the highlight.
    pub chapter: String,
    /// The highlighted passage.
    pub text: String,
}

impl HighlightRecord {
    pub fn new(
        source_title: impl Into<String>,
        chapter: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_title: source_title.into(),
            chapter: chapter.into(),
            text: text.into(),
        }
    }
}

/// The oldest highlight currently visible in a most-recent-first listing.
pub fn oldest(records: &[HighlightRecord]) -> Option<&HighlightRecord> {
    records.last()
}
