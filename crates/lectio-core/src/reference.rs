//! Free-text scripture reference parsing
//!
//! Accepted grammar:
//!
//! ```text
//! reference := book chapter [ clause ]
//! book      := [ordinal] word { ws word }
//! chapter   := digits
//! clause    := sep digits [ dash digits ]
//! sep       := ws* (":" | ".") ws*  |  ws+
//! dash      := ws* ("-" | en dash | em dash) ws*
//! ```
//!
//! The book is resolved first, so once a book is recognised every later
//! problem is reported against it (`MissingChapter`, `MalformedVerseRange`)
//! rather than as an unknown book. Only ASCII digits count as numbers.
//!
//! "John 1:1", "John 1.1" and "John 1 1" parse identically. Ordinals may be
//! digits, Roman numerals or words ("1 Cor", "I Cor", "First Corinthians").
//! Anything else in the verse clause is a `MalformedVerseRange`, including
//! ranges that cross a chapter boundary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::canon::{Book, BookId, Canon};
use crate::error::ParseError;
use crate::location::{ChapterRef, Location, VerseRange};

/// Verse clause after the chapter digits
static VERSE_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\s*[:.]\s*|\s+)(?P<start>[0-9]+)(?:\s*[-–—]\s*(?P<end>[0-9]+))?$").unwrap()
});

/// Reference-shaped fragments inside running prose
static EMBEDDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\b[1-3]\s?)?\b[A-Z][a-z]+\.?(?:\s(?:of\s|[1-3]\s)?[A-Z][a-z]+)*\s[0-9]+(?:\s*[:.]\s*[0-9]+(?:\s*[-–]\s*[0-9]+)?)?",
    )
    .unwrap()
});

/// A fully resolved reference
///
/// Either both verse fields are set or neither is; a single verse has
/// `verse_start == verse_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReference<'c> {
    pub book: &'c Book,
    pub chapter: u16,
    pub verse_start: Option<u16>,
    pub verse_end: Option<u16>,
}

impl<'c> ParsedReference<'c> {
    pub fn book_id(&self) -> BookId {
        self.book.id
    }

    pub fn is_chapter_only(&self) -> bool {
        self.verse_start.is_none()
    }

    pub fn chapter_ref(&self) -> ChapterRef {
        ChapterRef::new_unchecked(self.book.id, self.chapter)
    }

    /// First verse of the reference, `None` for a chapter-only reference
    pub fn location(&self) -> Option<Location> {
        self.verse_start
            .map(|verse| Location::new_unchecked(self.book.id, self.chapter, verse))
    }

    pub fn range(&self) -> Option<VerseRange> {
        match (self.verse_start, self.verse_end) {
            (Some(start), Some(end)) => Some(VerseRange::new_unchecked(
                self.book.id,
                self.chapter,
                start,
                end,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for ParsedReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book.name, self.chapter)?;
        match (self.verse_start, self.verse_end) {
            (Some(start), Some(end)) if end != start => write!(f, ":{}-{}", start, end),
            (Some(start), _) => write!(f, ":{}", start),
            _ => Ok(()),
        }
    }
}

/// Parses references against an injected canon
#[derive(Debug, Clone, Copy)]
pub struct ReferenceParser<'c> {
    canon: &'c Canon,
}

impl<'c> ReferenceParser<'c> {
    pub fn new(canon: &'c Canon) -> Self {
        Self { canon }
    }

    pub fn canon(&self) -> &'c Canon {
        self.canon
    }

    pub fn parse(&self, text: &str) -> Result<ParsedReference<'c>, ParseError> {
        let text = text.trim();
        let head = &text[..chapter_start(text)];
        let name = head.trim_end_matches(|c: char| !(c.is_alphabetic() || c == '.'));
        let (book, name_len) = self.resolve_book(name).ok_or_else(|| {
            ParseError::UnknownBook(if name.is_empty() { text } else { name }.to_string())
        })?;

        let rest = text[name_len..].trim_start();
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            // Known book, but something other than a chapter number follows it
            return Err(if rest.contains(|c: char| c.is_ascii_digit()) {
                ParseError::MalformedVerseRange(text.to_string())
            } else {
                ParseError::MissingChapter {
                    book: book.name.clone(),
                }
            });
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (chapter_text, clause) = rest.split_at(digits);
        let chapter = parse_number(chapter_text);
        if chapter == 0 || chapter > u32::from(book.chapter_count) {
            return Err(ParseError::ChapterOutOfRange {
                book: book.name.clone(),
                chapter,
                max: book.chapter_count,
            });
        }
        let chapter = chapter as u16;

        if clause.trim().is_empty() {
            return Ok(ParsedReference {
                book,
                chapter,
                verse_start: None,
                verse_end: None,
            });
        }

        let verses = VERSE_CLAUSE
            .captures(clause)
            .ok_or_else(|| ParseError::MalformedVerseRange(text.to_string()))?;
        let start = verses.name("start").map_or(0, |m| parse_number(m.as_str()));
        let end = verses
            .name("end")
            .map_or(start, |m| parse_number(m.as_str()));
        if end < start {
            return Err(ParseError::MalformedVerseRange(text.to_string()));
        }

        let max = book.verse_count(chapter);
        for verse in [start, end] {
            let past_end = max.is_some_and(|max| verse > u32::from(max));
            if verse == 0 || past_end || verse > u32::from(u16::MAX) {
                return Err(ParseError::VerseOutOfRange {
                    book: book.name.clone(),
                    chapter,
                    verse,
                    max: max.unwrap_or(u16::MAX),
                });
            }
        }

        Ok(ParsedReference {
            book,
            chapter,
            verse_start: Some(start as u16),
            verse_end: Some(end as u16),
        })
    }

    /// Longest leading run of words in `name` that names a book, with its byte length
    ///
    /// "John ch" resolves to John so the stray "ch" is reported against a
    /// known book rather than as an unknown one.
    fn resolve_book(&self, name: &str) -> Option<(&'c Book, usize)> {
        let mut candidate = name.trim_end();
        loop {
            if let Some(book) = self.canon.book_by_name(candidate) {
                return Some((book, candidate.len()));
            }
            let (shorter, _) = candidate.rsplit_once(char::is_whitespace)?;
            candidate = shorter.trim_end();
        }
    }

    /// Every parseable reference in `text`, in order of appearance
    ///
    /// Leading capitalised words that are not part of a book name ("See
    /// John 3:16") are dropped one at a time until the remainder parses.
    pub fn extract(&self, text: &str) -> Vec<ParsedReference<'c>> {
        let mut found = Vec::new();

        for candidate in EMBEDDED.find_iter(text) {
            let mut fragment = candidate.as_str();
            loop {
                match self.parse(fragment) {
                    Ok(parsed) => {
                        found.push(parsed);
                        break;
                    }
                    Err(ParseError::UnknownBook(_)) => match fragment.split_once(char::is_whitespace) {
                        Some((_, tail)) => fragment = tail.trim_start(),
                        None => break,
                    },
                    Err(e) => {
                        tracing::trace!(fragment, error = %e, "skipping reference-like text");
                        break;
                    }
                }
            }
        }

        found
    }
}

/// Byte offset of the first ASCII digit that is not a book ordinal ("1 John", "2Cor")
fn chapter_start(text: &str) -> usize {
    let skip = match text.chars().next() {
        Some('1'..='3') if text[1..].trim_start().starts_with(char::is_alphabetic) => 1,
        _ => 0,
    };
    text[skip..]
        .find(|c: char| c.is_ascii_digit())
        .map_or(text.len(), |i| i + skip)
}

/// Digits that overflow saturate so they fail the range checks
fn parse_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
