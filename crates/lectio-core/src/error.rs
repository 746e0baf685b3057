//! Error types for reference parsing, canon bounds and dataset loading
//!
//! Absence of data (no insights on a verse, no nearest verse, an unresolved
//! cross-reference) is never an error. These types only describe input that
//! was invalid.

use thiserror::Error;

use crate::canon::BookId;

/// Why a free-text reference could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The book-name portion matched no book in the canon
    #[error("Unknown book: '{0}'")]
    UnknownBook(String),

    /// The book resolved but no chapter number followed it
    #[error("Missing chapter number after {book}")]
    MissingChapter { book: String },

    /// Chapter is zero or past the end of the book
    #[error("{book} has {max} chapters, got chapter {chapter}")]
    ChapterOutOfRange { book: String, chapter: u32, max: u16 },

    /// Verse clause is not in the accepted grammar, spans chapters, or ends before it starts
    #[error("Malformed verse range: '{0}'")]
    MalformedVerseRange(String),

    /// Verse is zero or past the end of the chapter
    #[error("{book} {chapter} has {max} verses, got verse {verse}")]
    VerseOutOfRange {
        book: String,
        chapter: u16,
        verse: u32,
        max: u16,
    },
}

/// A location or range that falls outside the canon
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Book id {0} is outside the canon")]
    BookOutOfRange(BookId),

    #[error("Book {book_id} has {max} chapters, got chapter {chapter}")]
    ChapterOutOfRange { book_id: BookId, chapter: u16, max: u16 },

    /// `max` is `None` when the canon carries no verse counts for the chapter
    #[error("Verse {verse} is outside book {book_id} chapter {chapter}")]
    VerseOutOfRange {
        book_id: BookId,
        chapter: u16,
        verse: u16,
        max: Option<u16>,
    },

    #[error("Verse range ends before it starts: {start}-{end}")]
    InvertedRange { start: u16, end: u16 },
}

/// A book table that violates the canon invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    #[error("Canon is empty")]
    Empty,

    /// Book ids are a `u8`, so a canon holds at most 255 books
    #[error("Canon has {0} books, more than a book id can number")]
    TooManyBooks(usize),

    #[error("Book ids must run 1..=n in order, expected {expected} but found {found}")]
    NonContiguousId { expected: BookId, found: BookId },

    #[error("{0} has no chapters")]
    NoChapters(String),

    #[error("{book} declares {chapters} chapters but lists {counts} verse counts")]
    VerseCountMismatch {
        book: String,
        chapters: u16,
        counts: usize,
    },

    #[error("Name '{name}' is claimed by both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Failures while loading the insight dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The `sources` column of one record is not a valid JSON source list
    #[error("Invalid sources for insight {id}: {message}")]
    InvalidSources { id: String, message: String },

    #[error("Unknown insight type '{kind}' for insight {id}")]
    UnknownLens { id: String, kind: String },
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
