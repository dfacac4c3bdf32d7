use std::collections::HashSet;

use crate::highlight::{oldest, HighlightRecord};
use crate::readwise::RemoteHighlight;

/// Decides whether older highlights should keep being loaded.
///
/// Called with the full set of highlights currently visible, most recent
/// first, every time that set grows.
pub trait LoadPolicy {
    fn should_continue_loading(&self, current: &[HighlightRecord]) -> bool;
}

impl<F> LoadPolicy for F
where
    F: Fn(&[HighlightRecord]) -> bool,
{
    fn should_continue_loading(&self, current: &[HighlightRecord]) -> bool {
        self(current)
    }
}

/// Stops loading once the oldest visible highlight is already in Readwise.
///
/// When everything is being downloaded locally it never stops, so the full
/// history is loaded.
#[derive(Debug, Clone)]
pub struct KnownHighlights {
    texts: HashSet<String>,
    download_local: bool,
}

impl KnownHighlights {
    pub fn new(remote: &[RemoteHighlight], download_local: bool) -> Self {
        Self {
            texts: remote.iter().map(|h| h.text.trim().to_string()).collect(),
            download_local,
        }
    }

    /// Whether a highlight with this text is already stored remotely.
    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text.trim())
    }
}

impl LoadPolicy for KnownHighlights {
    fn should_continue_loading(&self, current: &[HighlightRecord]) -> bool {
        if self.download_local {
            return true;
        }
        match oldest(current) {
            Some(record) => !self.contains(&record.text),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(texts: &[&str]) -> Vec<HighlightRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| HighlightRecord::new(format!("Book {i}"), "Chapter", *t))
            .collect()
    }

    fn remote(texts: &[&str]) -> Vec<RemoteHighlight> {
        texts.iter().map(|t| RemoteHighlight::new(*t)).collect()
    }

    #[test]
    fn test_download_local_never_stops() {
        let policy = KnownHighlights::new(&remote(&["a", "b", "c"]), true);
        for n in 1..=3 {
            let current = records(&["c", "b", "a"][..n]);
            assert!(policy.should_continue_loading(&current));
        }
    }

    #[test]
    fn test_stops_when_oldest_is_known() {
        let policy = KnownHighlights::new(&remote(&["older passage"]), false);
        assert!(!policy.should_continue_loading(&records(&["new", "older passage"])));
    }

    #[test]
    fn test_match_is_trimmed_on_both_sides() {
        let policy = KnownHighlights::new(&remote(&["  a passage\n"]), false);
        assert!(!policy.should_continue_loading(&records(&["\n  a passage  "])));
    }

    #[test]
    fn test_only_oldest_record_counts() {
        // A known highlight that is not the oldest visible one does not stop loading
        let policy = KnownHighlights::new(&remote(&["new"]), false);
        assert!(policy.should_continue_loading(&records(&["new", "unknown"])));
    }

    #[test]
    fn test_empty_remote_keeps_loading() {
        let policy = KnownHighlights::new(&[], false);
        assert!(policy.should_continue_loading(&records(&["x", "y", "z"])));
    }

    #[test]
    fn test_empty_current_keeps_loading() {
        let policy = KnownHighlights::new(&remote(&["x"]), false);
        assert!(policy.should_continue_loading(&[]));
    }

    #[test]
    fn test_growing_listing_scenario() {
        // Three unknown highlights visible; the fourth (older) one is in Readwise
        let policy = KnownHighlights::new(&remote(&["four"]), false);
        let mut visible = records(&["one", "two", "three"]);
        assert!(policy.should_continue_loading(&visible[..1]));
        assert!(policy.should_continue_loading(&visible));

        visible.push(HighlightRecord::new("Book 3", "Chapter", "four"));
        assert!(!policy.should_continue_loading(&visible));
    }

    #[test]
    fn test_closure_is_a_policy() {
        let policy = |current: &[HighlightRecord]| current.len() < 2;
        assert!(policy.should_continue_loading(&records(&["a"])));
        assert!(!policy.should_continue_loading(&records(&["a", "b"])));
    }
}
