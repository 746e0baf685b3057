//! Turning reference text into a place to navigate to

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::canon::{BookId, Canon};
use crate::insight::{Insight, Source};
use crate::reference::{ParsedReference, ReferenceParser};

/// Default depth of the back-stack
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Where the reader should land
///
/// `flash_verse` is the verse to highlight once the chapter is shown; a
/// chapter-only reference has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub book_id: BookId,
    pub chapter: u16,
    pub flash_verse: Option<u16>,
}

impl From<&ParsedReference<'_>> for NavigationTarget {
    fn from(parsed: &ParsedReference<'_>) -> Self {
        Self {
            book_id: parsed.book_id(),
            chapter: parsed.chapter,
            flash_verse: parsed.verse_start,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NavigationResolver<'c> {
    parser: ReferenceParser<'c>,
}

impl<'c> NavigationResolver<'c> {
    pub fn new(canon: &'c Canon) -> Self {
        Self {
            parser: ReferenceParser::new(canon),
        }
    }

    pub fn parser(&self) -> &ReferenceParser<'c> {
        &self.parser
    }

    /// `None` means the reference did not parse and navigation is a no-op
    pub fn resolve(&self, reference: &str) -> Option<NavigationTarget> {
        match self.parser.parse(reference) {
            Ok(parsed) => Some(NavigationTarget::from(&parsed)),
            Err(e) => {
                tracing::debug!(reference, error = %e, "reference did not resolve");
                None
            }
        }
    }

    /// Only cross-reference citations point at a passage
    pub fn resolve_source(&self, source: &Source) -> Option<NavigationTarget> {
        if !source.is_cross_reference() {
            return None;
        }
        self.resolve(&source.reference)
    }

    /// Resolvable cross-references of `insight`, in source order
    pub fn cross_references<'i>(&self, insight: &'i Insight) -> Vec<(&'i Source, NavigationTarget)> {
        insight
            .cross_references()
            .filter_map(|source| self.resolve(&source.reference).map(|target| (source, target)))
            .collect()
    }
}

/// Bounded back-stack of places the reader navigated away from
#[derive(Debug, Clone)]
pub struct NavigationHistory {
    entries: VecDeque<NavigationTarget>,
    capacity: usize,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Remember `target`; the oldest entry is dropped once full
    pub fn push(&mut self, target: NavigationTarget) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(target);
    }

    pub fn pop(&mut self) -> Option<NavigationTarget> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&NavigationTarget> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{Lens, SourceKind};

    #[test]
    fn test_resolve_verse_and_chapter() {
        let canon = Canon::standard();
        let resolver = NavigationResolver::new(&canon);

        assert_eq!(
            resolver.resolve("Genesis 1:1"),
            Some(NavigationTarget { book_id: 1, chapter: 1, flash_verse: Some(1) })
        );
        assert_eq!(
            resolver.resolve("John 3:16-18"),
            Some(NavigationTarget { book_id: 43, chapter: 3, flash_verse: Some(16) })
        );
        assert_eq!(
            resolver.resolve("Psalms 23"),
            Some(NavigationTarget { book_id: 19, chapter: 23, flash_verse: None })
        );
    }

    #[test]
    fn test_unparseable_reference_is_noop() {
        let canon = Canon::standard();
        let resolver = NavigationResolver::new(&canon);
        assert_eq!(resolver.resolve("Hezekiah 3:1"), None);
        assert_eq!(resolver.resolve("John 22:1"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_only_cross_reference_sources_resolve() {
        let canon = Canon::standard();
        let resolver = NavigationResolver::new(&canon);
        let strongs = Source {
            kind: SourceKind::Strongs,
            reference: "G3056".to_string(),
            description: None,
        };
        assert_eq!(resolver.resolve_source(&strongs), None);
        assert!(resolver.resolve_source(&Source::cross_reference("Romans 8:28")).is_some());
    }

    #[test]
    fn test_cross_references_skip_unresolvable() {
        let canon = Canon::standard();
        let resolver = NavigationResolver::new(&canon);
        let insight = Insight {
            id: "c".to_string(),
            book_id: 43,
            chapter: 1,
            verse_start: 1,
            verse_end: 1,
            lens: Lens::Connection,
            title: "Word".to_string(),
            content: String::new(),
            sources: vec![
                Source::cross_reference("Genesis 1:1"),
                Source::cross_reference("not a reference"),
                Source::cross_reference("Proverbs 8"),
            ],
            is_interpretive: false,
            content_version: 1,
            prompt_version: String::new(),
            model_version: String::new(),
            created_at: String::new(),
        };

        let targets = resolver.cross_references(&insight);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].0.reference, "Genesis 1:1");
        assert_eq!(targets[1].1, NavigationTarget { book_id: 20, chapter: 8, flash_verse: None });
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = NavigationHistory::with_capacity(2);
        for chapter in 1..=3 {
            history.push(NavigationTarget { book_id: 43, chapter, flash_verse: None });
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.peek().map(|t| t.chapter), Some(3));
        assert_eq!(history.pop().map(|t| t.chapter), Some(3));
        assert_eq!(history.pop().map(|t| t.chapter), Some(2));
        assert_eq!(history.pop(), None);

        history.push(NavigationTarget { book_id: 1, chapter: 1, flash_verse: Some(1) });
        history.clear();
        assert!(history.is_empty());
        assert_eq!(NavigationHistory::with_capacity(0).capacity(), 1);
    }
}
