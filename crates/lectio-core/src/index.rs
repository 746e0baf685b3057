//! Verse-level lookup over a sparse insight dataset
//!
//! Built once from the loaded dataset. Per-chapter verse counts are
//! precomputed so a reader can mark which verses have something to show.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::insight::Insight;
use crate::location::{ChapterRef, Location};

/// Direction for nearest-verse searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forward" | "next" => Some(Direction::Forward),
            "backward" | "previous" | "prev" => Some(Direction::Backward),
            _ => None,
        }
    }
}

pub struct InsightIndex {
    insights: Vec<Insight>,
    by_chapter: HashMap<ChapterRef, Vec<usize>>,
    counts: HashMap<ChapterRef, BTreeMap<u16, usize>>,
}

impl InsightIndex {
    pub fn new(insights: Vec<Insight>) -> Self {
        let mut by_chapter: HashMap<ChapterRef, Vec<usize>> = HashMap::new();
        let mut counts: HashMap<ChapterRef, BTreeMap<u16, usize>> = HashMap::new();

        // Dataset order is preserved within each chapter bucket
        for (i, insight) in insights.iter().enumerate() {
            let chapter = insight.chapter_ref();
            by_chapter.entry(chapter).or_default().push(i);

            let verse_counts = counts.entry(chapter).or_default();
            for verse in insight.verse_start..=insight.verse_end {
                *verse_counts.entry(verse).or_insert(0) += 1;
            }
        }

        tracing::debug!(
            insights = insights.len(),
            chapters = by_chapter.len(),
            "built insight index"
        );

        Self {
            insights,
            by_chapter,
            counts,
        }
    }

    /// Every insight whose span covers `location`, in dataset order
    pub fn insights_for(&self, location: Location) -> Vec<&Insight> {
        self.by_chapter
            .get(&location.chapter_ref())
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.insights[i])
                    .filter(|insight| insight.covers(location))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every insight anchored in `chapter`, in dataset order
    pub fn insights_in_chapter(&self, chapter: ChapterRef) -> Vec<&Insight> {
        self.by_chapter
            .get(&chapter)
            .map(|indices| indices.iter().map(|&i| &self.insights[i]).collect())
            .unwrap_or_default()
    }

    /// Verse -> number of insights covering it; verses without insights are absent
    pub fn insight_counts(&self, chapter: ChapterRef) -> BTreeMap<u16, usize> {
        self.counts.get(&chapter).cloned().unwrap_or_default()
    }

    pub fn has_insights(&self, location: Location) -> bool {
        self.counts
            .get(&location.chapter_ref())
            .and_then(|counts| counts.get(&location.verse()))
            .is_some_and(|&n| n > 0)
    }

    /// First verse after (or before) `from` in `verses` that has insights
    ///
    /// `verses` is the chapter's verse list as the reader shows it. The scan
    /// never leaves the chapter.
    pub fn nearest_verse_with_insights(
        &self,
        from: Location,
        direction: Direction,
        verses: &[u16],
    ) -> Option<u16> {
        let empty = BTreeMap::new();
        let counts = self.counts.get(&from.chapter_ref()).unwrap_or(&empty);
        nearest_verse_with_counts(counts, from.verse(), direction, verses)
    }

    /// Chapters that have at least one insight, in canonical order
    pub fn chapters(&self) -> Vec<ChapterRef> {
        let mut chapters: Vec<ChapterRef> = self.by_chapter.keys().copied().collect();
        chapters.sort();
        chapters
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}

/// Linear scan over `verses` strictly after (forward) or before (backward)
/// `from`, returning the first verse whose count is above zero
pub fn nearest_verse_with_counts(
    counts: &BTreeMap<u16, usize>,
    from: u16,
    direction: Direction,
    verses: &[u16],
) -> Option<u16> {
    let has_content = |verse: &u16| counts.get(verse).is_some_and(|&n| n > 0);
    match direction {
        Direction::Forward => verses
            .iter()
            .copied()
            .filter(|&v| v > from)
            .find(has_content),
        Direction::Backward => verses
            .iter()
            .rev()
            .copied()
            .filter(|&v| v < from)
            .find(has_content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Canon;
    use crate::insight::Lens;

    fn insight(id: &str, chapter: u16, start: u16, end: u16) -> Insight {
        Insight {
            id: id.to_string(),
            book_id: 43,
            chapter,
            verse_start: start,
            verse_end: end,
            lens: Lens::Theology,
            title: id.to_string(),
            content: String::new(),
            sources: Vec::new(),
            is_interpretive: false,
            content_version: 1,
            prompt_version: String::new(),
            model_version: String::new(),
            created_at: String::new(),
        }
    }

    fn john(canon: &Canon, chapter: u16, verse: u16) -> Location {
        Location::new(canon, 43, chapter, verse).unwrap()
    }

    #[test]
    fn test_insights_for_covers_spans_in_dataset_order() {
        let canon = Canon::standard();
        let index = InsightIndex::new(vec![
            insight("wide", 3, 14, 18),
            insight("other-chapter", 4, 16, 16),
            insight("single", 3, 16, 16),
            insight("before", 3, 1, 2),
        ]);

        let ids: Vec<&str> = index
            .insights_for(john(&canon, 3, 16))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["wide", "single"]);
        assert!(index.insights_for(john(&canon, 3, 10)).is_empty());
        assert!(index.insights_for(john(&canon, 5, 1)).is_empty());
    }

    #[test]
    fn test_insight_counts_per_verse() {
        let canon = Canon::standard();
        let index = InsightIndex::new(vec![
            insight("a", 1, 1, 3),
            insight("b", 1, 2, 2),
        ]);
        let counts = index.insight_counts(john(&canon, 1, 1).chapter_ref());
        assert_eq!(counts, BTreeMap::from([(1, 1), (2, 2), (3, 1)]));
        assert!(index.insight_counts(john(&canon, 2, 1).chapter_ref()).is_empty());
        assert!(index.has_insights(john(&canon, 1, 2)));
        assert!(!index.has_insights(john(&canon, 1, 4)));
    }

    #[test]
    fn test_nearest_with_explicit_counts() {
        let counts = BTreeMap::from([(1, 0), (2, 3), (3, 0), (4, 1)]);
        let verses = [1, 2, 3, 4];
        assert_eq!(nearest_verse_with_counts(&counts, 1, Direction::Forward, &verses), Some(2));
        assert_eq!(nearest_verse_with_counts(&counts, 2, Direction::Forward, &verses), Some(4));
        assert_eq!(nearest_verse_with_counts(&counts, 4, Direction::Forward, &verses), None);
        assert_eq!(nearest_verse_with_counts(&counts, 4, Direction::Backward, &verses), Some(2));
        assert_eq!(nearest_verse_with_counts(&counts, 2, Direction::Backward, &verses), None);
    }

    #[test]
    fn test_nearest_from_index() {
        let canon = Canon::standard();
        let index = InsightIndex::new(vec![
            insight("v2-a", 1, 2, 2),
            insight("v2-b", 1, 2, 2),
            insight("v2-c", 1, 2, 2),
            insight("v4", 1, 4, 4),
        ]);
        let verses = [1, 2, 3, 4];
        assert_eq!(
            index.nearest_verse_with_insights(john(&canon, 1, 1), Direction::Forward, &verses),
            Some(2)
        );
        assert_eq!(
            index.nearest_verse_with_insights(john(&canon, 1, 4), Direction::Forward, &verses),
            None
        );
        assert_eq!(
            index.nearest_verse_with_insights(john(&canon, 1, 3), Direction::Backward, &verses),
            Some(2)
        );
        // Nothing in chapter 2 at all
        assert_eq!(
            index.nearest_verse_with_insights(john(&canon, 2, 1), Direction::Forward, &verses),
            None
        );
    }

    #[test]
    fn test_chapters_sorted() {
        let canon = Canon::standard();
        let index = InsightIndex::new(vec![insight("b", 5, 1, 1), insight("a", 2, 1, 1)]);
        let chapters: Vec<u16> = index.chapters().iter().map(|c| c.chapter()).collect();
        assert_eq!(chapters, vec![2, 5]);
        assert_eq!(index.insights_in_chapter(john(&canon, 5, 1).chapter_ref()).len(), 1);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::from_str("Backward"), Some(Direction::Backward));
        assert_eq!(Direction::from_str("next"), Some(Direction::Forward));
        assert_eq!(Direction::from_str("sideways"), None);
    }
}
