//! Canon-validated coordinates: chapters, verses and verse ranges
//!
//! All three types order by book id, then chapter, then verse, which is the
//! canonical reading order navigation relies on. Stepping never mutates; it
//! returns a new value or `None` at the edge of the canon.

use serde::Serialize;

use crate::canon::{BookId, Canon};
use crate::error::LocationError;

/// A whole chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChapterRef {
    book_id: BookId,
    chapter: u16,
}

impl ChapterRef {
    pub fn new(canon: &Canon, book_id: BookId, chapter: u16) -> Result<Self, LocationError> {
        let book = canon
            .book(book_id)
            .ok_or(LocationError::BookOutOfRange(book_id))?;
        if !book.has_chapter(chapter) {
            return Err(LocationError::ChapterOutOfRange {
                book_id,
                chapter,
                max: book.chapter_count,
            });
        }
        Ok(Self { book_id, chapter })
    }

    /// For keys taken from data that was validated elsewhere (or is only
    /// used for lookups, where an out-of-canon key simply finds nothing)
    pub(crate) fn new_unchecked(book_id: BookId, chapter: u16) -> Self {
        Self { book_id, chapter }
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    pub fn first_verse(&self) -> Location {
        Location {
            book_id: self.book_id,
            chapter: self.chapter,
            verse: 1,
        }
    }

    /// Last verse of the chapter, or its first verse when the count is unknown
    pub fn last_verse(&self, canon: &Canon) -> Location {
        let verse = canon.verse_count(self.book_id, self.chapter).unwrap_or(1);
        Location {
            book_id: self.book_id,
            chapter: self.chapter,
            verse,
        }
    }

    /// Verse numbers of this chapter in order; empty when the count is unknown
    pub fn verses(&self, canon: &Canon) -> Vec<u16> {
        canon
            .verse_count(self.book_id, self.chapter)
            .map(|count| (1..=count).collect())
            .unwrap_or_default()
    }

    pub fn next(&self, canon: &Canon) -> Option<Self> {
        let chapters = canon.chapter_count(self.book_id)?;
        if self.chapter < chapters {
            return Some(Self {
                chapter: self.chapter + 1,
                ..*self
            });
        }
        if self.book_id < canon.last_book_id() {
            return Some(Self {
                book_id: self.book_id + 1,
                chapter: 1,
            });
        }
        None
    }

    pub fn previous(&self, canon: &Canon) -> Option<Self> {
        if self.chapter > 1 {
            return Some(Self {
                chapter: self.chapter - 1,
                ..*self
            });
        }
        let book_id = self.book_id.checked_sub(1)?;
        let chapter = canon.chapter_count(book_id)?;
        Some(Self { book_id, chapter })
    }

    pub fn display(&self, canon: &Canon) -> String {
        format!("{} {}", book_name(canon, self.book_id), self.chapter)
    }
}

/// A single verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    book_id: BookId,
    chapter: u16,
    verse: u16,
}

impl Location {
    pub fn new(canon: &Canon, book_id: BookId, chapter: u16, verse: u16) -> Result<Self, LocationError> {
        let chapter_ref = ChapterRef::new(canon, book_id, chapter)?;
        let max = canon.verse_count(book_id, chapter);
        if verse == 0 || max.is_some_and(|max| verse > max) {
            return Err(LocationError::VerseOutOfRange {
                book_id,
                chapter,
                verse,
                max,
            });
        }
        Ok(Self {
            book_id: chapter_ref.book_id,
            chapter: chapter_ref.chapter,
            verse,
        })
    }

    pub(crate) fn new_unchecked(book_id: BookId, chapter: u16, verse: u16) -> Self {
        Self {
            book_id,
            chapter,
            verse,
        }
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    pub fn verse(&self) -> u16 {
        self.verse
    }

    pub fn chapter_ref(&self) -> ChapterRef {
        ChapterRef::new_unchecked(self.book_id, self.chapter)
    }

    /// The following verse, crossing into the next chapter or book as needed
    ///
    /// Without verse-count data the chapter has no known end, so the step
    /// stays inside it until the verse number itself runs out.
    pub fn next(&self, canon: &Canon) -> Option<Self> {
        match canon.verse_count(self.book_id, self.chapter) {
            Some(max) if self.verse >= max => {
                self.chapter_ref().next(canon).map(|c| c.first_verse())
            }
            _ => self.verse.checked_add(1).map(|verse| Self { verse, ..*self }),
        }
    }

    /// The preceding verse, crossing into the previous chapter or book as needed
    pub fn previous(&self, canon: &Canon) -> Option<Self> {
        if self.verse > 1 {
            return Some(Self {
                verse: self.verse - 1,
                ..*self
            });
        }
        self.chapter_ref()
            .previous(canon)
            .map(|c| c.last_verse(canon))
    }

    pub fn display(&self, canon: &Canon) -> String {
        format!(
            "{} {}:{}",
            book_name(canon, self.book_id),
            self.chapter,
            self.verse
        )
    }
}

/// A run of verses inside one chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VerseRange {
    book_id: BookId,
    chapter: u16,
    verse_start: u16,
    verse_end: u16,
}

impl VerseRange {
    pub fn new(
        canon: &Canon,
        book_id: BookId,
        chapter: u16,
        verse_start: u16,
        verse_end: u16,
    ) -> Result<Self, LocationError> {
        if verse_end < verse_start {
            return Err(LocationError::InvertedRange {
                start: verse_start,
                end: verse_end,
            });
        }
        Location::new(canon, book_id, chapter, verse_start)?;
        Location::new(canon, book_id, chapter, verse_end)?;
        Ok(Self {
            book_id,
            chapter,
            verse_start,
            verse_end,
        })
    }

    pub fn single(location: Location) -> Self {
        Self {
            book_id: location.book_id,
            chapter: location.chapter,
            verse_start: location.verse,
            verse_end: location.verse,
        }
    }

    pub(crate) fn new_unchecked(book_id: BookId, chapter: u16, verse_start: u16, verse_end: u16) -> Self {
        Self {
            book_id,
            chapter,
            verse_start,
            verse_end,
        }
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    pub fn verse_start(&self) -> u16 {
        self.verse_start
    }

    pub fn verse_end(&self) -> u16 {
        self.verse_end
    }

    pub fn chapter_ref(&self) -> ChapterRef {
        ChapterRef::new_unchecked(self.book_id, self.chapter)
    }

    pub fn start(&self) -> Location {
        Location::new_unchecked(self.book_id, self.chapter, self.verse_start)
    }

    pub fn end(&self) -> Location {
        Location::new_unchecked(self.book_id, self.chapter, self.verse_end)
    }

    pub fn len(&self) -> usize {
        usize::from(self.verse_end.saturating_sub(self.verse_start)) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, location: Location) -> bool {
        location.book_id == self.book_id
            && location.chapter == self.chapter
            && (self.verse_start..=self.verse_end).contains(&location.verse)
    }

    pub fn verses(&self) -> impl Iterator<Item = u16> {
        self.verse_start..=self.verse_end
    }

    pub fn display(&self, canon: &Canon) -> String {
        let name = book_name(canon, self.book_id);
        if self.verse_start == self.verse_end {
            format!("{} {}:{}", name, self.chapter, self.verse_start)
        } else {
            format!(
                "{} {}:{}-{}",
                name, self.chapter, self.verse_start, self.verse_end
            )
        }
    }
}

fn book_name(canon: &Canon, book_id: BookId) -> String {
    canon
        .book(book_id)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| format!("Book {}", book_id))
}
