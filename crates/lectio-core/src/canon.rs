//! The 66-book Protestant canon with KJV versification
//!
//! Book ids are stable forever: Genesis is 1, Revelation is 66. Ids 1-39 are
//! Old Testament and 40-66 New Testament. The table is plain data; a `Canon`
//! is constructed by the caller and passed by reference to everything that
//! needs bounds or book-name resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CanonError;

pub type BookId = u8;

/// Id of Matthew, the first New Testament book
pub const FIRST_NEW_TESTAMENT_BOOK: BookId = 40;

/// Minimum normalized length before a unique-prefix match is attempted
const MIN_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    pub fn of(book_id: BookId) -> Self {
        if is_old_testament(book_id) {
            Testament::Old
        } else {
            Testament::New
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ot" | "old" | "old testament" => Some(Testament::Old),
            "nt" | "new" | "new testament" => Some(Testament::New),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Testament::Old => "Old Testament",
            Testament::New => "New Testament",
        }
    }
}

pub fn is_old_testament(book_id: BookId) -> bool {
    book_id < FIRST_NEW_TESTAMENT_BOOK
}

/// One canon entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub abbreviation: String,
    /// Alternate names accepted by `Canon::book_by_name`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub chapter_count: u16,
    /// Verses per chapter, indexed by `chapter - 1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_counts: Option<Vec<u16>>,
}

impl Book {
    pub fn new(id: BookId, name: &str, abbreviation: &str, chapter_count: u16) -> Self {
        Self {
            id,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            aliases: Vec::new(),
            chapter_count,
            verse_counts: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_verse_counts(mut self, counts: &[u16]) -> Self {
        self.verse_counts = Some(counts.to_vec());
        self
    }

    pub fn testament(&self) -> Testament {
        Testament::of(self.id)
    }

    pub fn has_chapter(&self, chapter: u16) -> bool {
        chapter >= 1 && chapter <= self.chapter_count
    }

    /// Number of verses in `chapter`, when verse-count data is present
    pub fn verse_count(&self, chapter: u16) -> Option<u16> {
        if !self.has_chapter(chapter) {
            return None;
        }
        self.verse_counts
            .as_ref()
            .and_then(|counts| counts.get(usize::from(chapter) - 1))
            .copied()
    }

    pub fn total_verses(&self) -> Option<u32> {
        self.verse_counts
            .as_ref()
            .map(|counts| counts.iter().map(|&c| u32::from(c)).sum())
    }
}

/// Ordered book table plus a normalized-name lookup
#[derive(Debug, Clone)]
pub struct Canon {
    books: Vec<Book>,
    names: HashMap<String, BookId>,
}

impl Canon {
    /// The standard 66-book canon
    pub fn standard() -> Self {
        let books = STANDARD_BOOKS
            .iter()
            .enumerate()
            .map(|(i, (name, abbreviation, aliases, counts))| {
                Book::new(i as BookId + 1, name, abbreviation, counts.len() as u16)
                    .with_aliases(aliases)
                    .with_verse_counts(counts)
            })
            .collect();
        Self::index(books)
    }

    /// Build a canon from an arbitrary book table, checking its invariants
    pub fn from_books(books: Vec<Book>) -> Result<Self, CanonError> {
        if books.is_empty() {
            return Err(CanonError::Empty);
        }
        if books.len() > usize::from(BookId::MAX) {
            return Err(CanonError::TooManyBooks(books.len()));
        }

        let mut claimed: HashMap<String, &str> = HashMap::new();
        for (i, book) in books.iter().enumerate() {
            let expected = i as BookId + 1;
            if book.id != expected {
                return Err(CanonError::NonContiguousId {
                    expected,
                    found: book.id,
                });
            }
            if book.chapter_count == 0 {
                return Err(CanonError::NoChapters(book.name.clone()));
            }
            if let Some(counts) = &book.verse_counts {
                if counts.len() != usize::from(book.chapter_count) {
                    return Err(CanonError::VerseCountMismatch {
                        book: book.name.clone(),
                        chapters: book.chapter_count,
                        counts: counts.len(),
                    });
                }
            }
            for key in lookup_keys(book) {
                match claimed.get(&key) {
                    Some(&other) if other != book.name => {
                        return Err(CanonError::DuplicateName {
                            name: key,
                            first: other.to_string(),
                            second: book.name.clone(),
                        });
                    }
                    _ => {
                        claimed.insert(key, &book.name);
                    }
                }
            }
        }

        Ok(Self::index(books))
    }

    fn index(books: Vec<Book>) -> Self {
        let mut names = HashMap::new();
        for book in &books {
            for key in lookup_keys(book) {
                names.entry(key).or_insert(book.id);
            }
        }
        Self { books, names }
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        if id == 0 {
            return None;
        }
        self.books.get(usize::from(id) - 1)
    }

    /// Resolve a book by name, abbreviation or alternate form
    ///
    /// Case-insensitive. "1 Corinthians", "1 Cor", "1Cor", "I Cor" and
    /// "First Corinthians" all resolve to the same book. Falls back to a
    /// prefix that matches exactly one book name.
    pub fn book_by_name(&self, text: &str) -> Option<&Book> {
        let normalized = normalize_name(text);
        if normalized.is_empty() {
            return None;
        }

        let compact = compact(&normalized);
        if let Some(&id) = self
            .names
            .get(&normalized)
            .or_else(|| self.names.get(&compact))
        {
            return self.book(id);
        }

        if compact.len() < MIN_PREFIX_LEN {
            return None;
        }
        let mut matches = self
            .books
            .iter()
            .filter(|book| compact_key(&book.name).starts_with(&compact));
        match (matches.next(), matches.next()) {
            (Some(book), None) => Some(book),
            _ => None,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn books_in(&self, testament: Testament) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(move |b| b.testament() == testament)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn last_book_id(&self) -> BookId {
        self.books.len() as BookId
    }

    pub fn chapter_count(&self, book_id: BookId) -> Option<u16> {
        self.book(book_id).map(|b| b.chapter_count)
    }

    pub fn verse_count(&self, book_id: BookId, chapter: u16) -> Option<u16> {
        self.book(book_id).and_then(|b| b.verse_count(chapter))
    }

    pub fn total_chapters(&self) -> u32 {
        self.books.iter().map(|b| u32::from(b.chapter_count)).sum()
    }

    /// Total verse count, `None` if any book lacks verse data
    pub fn total_verses(&self) -> Option<u32> {
        self.books.iter().map(|b| b.total_verses()).sum()
    }
}

/// Lowercase, drop periods and apostrophes, collapse whitespace, and
/// rewrite a leading ordinal ("I", "Second", "3rd", "1Cor") to a digit.
pub(crate) fn normalize_name(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c == '.' { ' ' } else { c })
        .collect();
    let mut tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();

    if let Some(first) = tokens.first().cloned() {
        let digit_len = first.chars().take_while(|c| c.is_ascii_digit()).count();
        match ordinal_digit(&first) {
            Some(digit) if tokens.len() > 1 => tokens[0] = digit.to_string(),
            _ if digit_len > 0 && digit_len < first.len() => {
                // "1cor" -> "1 cor"
                let (num, rest) = first.split_at(digit_len);
                tokens[0] = rest.to_string();
                tokens.insert(0, num.to_string());
            }
            _ => {}
        }
    }

    tokens.join(" ")
}

fn ordinal_digit(token: &str) -> Option<&'static str> {
    match token {
        "i" | "1st" | "first" => Some("1"),
        "ii" | "2nd" | "second" => Some("2"),
        "iii" | "3rd" | "third" => Some("3"),
        _ => None,
    }
}

fn compact(normalized: &str) -> String {
    normalized.replace(' ', "")
}

fn compact_key(name: &str) -> String {
    compact(&normalize_name(name))
}

fn lookup_keys(book: &Book) -> Vec<String> {
    let mut keys = Vec::new();
    for name in std::iter::once(&book.name)
        .chain(std::iter::once(&book.abbreviation))
        .chain(book.aliases.iter())
    {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            continue;
        }
        let compacted = compact(&normalized);
        if compacted != normalized && !keys.contains(&compacted) {
            keys.push(compacted);
        }
        if !keys.contains(&normalized) {
            keys.push(normalized);
        }
    }
    keys
}

type BookRow = (&'static str, &'static str, &'static [&'static str], &'static [u16]);

/// (name, abbreviation, alternate names, verses per chapter)
const STANDARD_BOOKS: &[BookRow] = &[
    ("Genesis", "Gen", &["Ge", "Gn"], &[
        31, 25, 24, 26, 32, 22, 24, 22, 29, 32, 32, 20, 18, 24, 21, 16, 27, 33, 38, 18, 34, 24, 20, 67, 34,
        35, 46, 22, 35, 43, 55, 32, 20, 31, 29, 43, 36, 30, 23, 23, 57, 38, 34, 34, 28, 34, 31, 22, 33, 26,
    ]),
    ("Exodus", "Exod", &["Ex", "Exo"], &[
        22, 25, 22, 31, 23, 30, 25, 32, 35, 29, 10, 51, 22, 31, 27, 36, 16, 27, 25, 26, 36, 31, 33, 18, 40,
        37, 21, 43, 46, 38, 18, 35, 23, 35, 35, 38, 29, 31, 43, 38,
    ]),
    ("Leviticus", "Lev", &["Lv"], &[
        17, 16, 17, 35, 19, 30, 38, 36, 24, 20, 47, 8, 59, 57, 33, 34, 16, 30, 37, 27, 24, 33, 44, 23, 55,
        46, 34,
    ]),
    ("Numbers", "Num", &["Nm", "Nb"], &[
        54, 34, 51, 49, 31, 27, 89, 26, 23, 36, 35, 16, 33, 45, 41, 50, 13, 32, 22, 29, 35, 41, 30, 25, 18,
        65, 23, 31, 40, 16, 54, 42, 56, 29, 34, 13,
    ]),
    ("Deuteronomy", "Deut", &["Dt", "Deu"], &[
        46, 37, 29, 49, 33, 25, 26, 20, 29, 22, 32, 32, 18, 29, 23, 22, 20, 22, 21, 20, 23, 30, 25, 22, 19,
        19, 26, 68, 29, 20, 30, 52, 29, 12,
    ]),
    ("Joshua", "Josh", &["Jos"], &[
        18, 24, 17, 24, 15, 27, 26, 35, 27, 43, 23, 24, 33, 15, 63, 10, 18, 28, 51, 9, 45, 34, 16, 33,
    ]),
    ("Judges", "Judg", &["Jdg", "Jdgs"], &[
        36, 23, 31, 24, 31, 40, 25, 35, 57, 18, 40, 15, 25, 20, 20, 31, 13, 31, 30, 48, 25,
    ]),
    ("Ruth", "Ruth", &["Rth", "Ru"], &[22, 23, 18, 22]),
    ("1 Samuel", "1Sam", &["1 Sa", "1 Sm"], &[
        28, 36, 21, 22, 12, 21, 17, 22, 27, 27, 15, 25, 23, 52, 35, 23, 58, 30, 24, 42, 15, 23, 29, 22, 44,
        25, 12, 25, 11, 31, 13,
    ]),
    ("2 Samuel", "2Sam", &["2 Sa", "2 Sm"], &[
        27, 32, 39, 12, 25, 23, 29, 18, 13, 19, 27, 31, 39, 33, 37, 23, 29, 33, 43, 26, 22, 51, 39, 25,
    ]),
    ("1 Kings", "1Kgs", &["1 Ki", "1 Kin"], &[
        53, 46, 28, 34, 18, 38, 51, 66, 28, 29, 43, 33, 34, 31, 34, 34, 24, 46, 21, 43, 29, 53,
    ]),
    ("2 Kings", "2Kgs", &["2 Ki", "2 Kin"], &[
        18, 25, 27, 44, 27, 33, 20, 29, 37, 36, 21, 21, 25, 29, 38, 20, 41, 37, 37, 21, 26, 20, 37, 20, 30,
    ]),
    ("1 Chronicles", "1Chr", &["1 Chron", "1 Ch"], &[
        54, 55, 24, 43, 26, 81, 40, 40, 44, 14, 47, 40, 14, 17, 29, 43, 27, 17, 19, 8, 30, 19, 32, 31, 31,
        32, 34, 21, 30,
    ]),
    ("2 Chronicles", "2Chr", &["2 Chron", "2 Ch"], &[
        17, 18, 17, 22, 14, 42, 22, 18, 31, 19, 23, 16, 22, 15, 19, 14, 19, 34, 11, 37, 20, 12, 21, 27, 28,
        23, 9, 27, 36, 27, 21, 33, 25, 33, 27, 23,
    ]),
    ("Ezra", "Ezra", &["Ezr"], &[11, 70, 13, 24, 17, 22, 28, 36, 15, 44]),
    ("Nehemiah", "Neh", &["Ne"], &[11, 20, 32, 23, 19, 19, 73, 18, 38, 39, 36, 47, 31]),
    ("Esther", "Esth", &["Est", "Es"], &[22, 23, 15, 17, 14, 14, 10, 17, 32, 3]),
    ("Job", "Job", &["Jb"], &[
        22, 13, 26, 21, 27, 30, 21, 22, 35, 22, 20, 25, 28, 22, 35, 22, 16, 21, 29, 29, 34, 30, 17, 25, 6,
        14, 23, 28, 25, 31, 40, 22, 33, 37, 16, 33, 24, 41, 30, 24, 34, 17,
    ]),
    ("Psalms", "Ps", &["Psalm", "Psa", "Pss"], &[
        6, 12, 8, 8, 12, 10, 17, 9, 20, 18, 7, 8, 6, 7, 5, 11, 15, 50, 14, 9, 13, 31, 6, 10, 22,
        12, 14, 9, 11, 12, 24, 11, 22, 22, 28, 12, 40, 22, 13, 17, 13, 11, 5, 26, 17, 11, 9, 14, 20, 23,
        19, 9, 6, 7, 23, 13, 11, 11, 17, 12, 8, 12, 11, 10, 13, 20, 7, 35, 36, 5, 24, 20, 28, 23, 10,
        12, 20, 72, 13, 19, 16, 8, 18, 12, 13, 17, 7, 18, 52, 17, 16, 15, 5, 23, 11, 13, 12, 9, 9, 5,
        8, 28, 22, 35, 45, 48, 43, 13, 31, 7, 10, 10, 9, 8, 18, 19, 2, 29, 176, 7, 8, 9, 4, 8, 5,
        6, 5, 6, 8, 8, 3, 18, 3, 3, 21, 26, 9, 8, 24, 13, 10, 7, 12, 15, 21, 10, 20, 14, 9, 6,
    ]),
    ("Proverbs", "Prov", &["Pro", "Prv", "Pr"], &[
        33, 22, 35, 27, 23, 35, 27, 36, 18, 32, 31, 28, 25, 35, 33, 33, 28, 24, 29, 30, 31, 29, 35, 34, 28,
        28, 27, 28, 27, 33, 31,
    ]),
    ("Ecclesiastes", "Eccl", &["Eccles", "Ecc", "Qoheleth"], &[
        18, 26, 22, 16, 20, 12, 29, 17, 18, 20, 10, 14,
    ]),
    ("Song of Solomon", "Song", &["Song of Songs", "SOS", "Canticles"], &[
        17, 17, 11, 16, 16, 13, 13, 14,
    ]),
    ("Isaiah", "Isa", &["Is"], &[
        31, 22, 26, 6, 30, 13, 25, 22, 21, 34, 16, 6, 22, 32, 9, 14, 14, 7, 25, 6, 17, 25, 18, 23, 12,
        21, 13, 29, 24, 33, 9, 20, 24, 17, 10, 22, 38, 22, 8, 31, 29, 25, 28, 28, 25, 13, 15, 22, 26, 11,
        23, 15, 12, 17, 13, 12, 21, 14, 21, 22, 11, 12, 19, 12, 25, 24,
    ]),
    ("Jeremiah", "Jer", &["Je", "Jr"], &[
        19, 37, 25, 31, 31, 30, 34, 22, 26, 25, 23, 17, 27, 22, 21, 21, 27, 23, 15, 18, 14, 30, 40, 10, 38,
        24, 22, 17, 32, 24, 40, 44, 26, 22, 19, 32, 21, 28, 18, 16, 18, 22, 13, 30, 5, 28, 7, 47, 39, 46,
        64, 34,
    ]),
    ("Lamentations", "Lam", &["La"], &[22, 22, 66, 22, 22]),
    ("Ezekiel", "Ezek", &["Eze", "Ezk"], &[
        28, 10, 27, 17, 17, 14, 27, 18, 11, 22, 25, 28, 23, 23, 8, 63, 24, 32, 14, 49, 32, 31, 49, 27, 17,
        21, 36, 26, 21, 26, 18, 32, 33, 31, 15, 38, 28, 23, 29, 49, 26, 20, 27, 31, 25, 24, 23, 35,
    ]),
    ("Daniel", "Dan", &["Da", "Dn"], &[21, 49, 30, 37, 31, 28, 28, 27, 27, 21, 45, 13]),
    ("Hosea", "Hos", &["Ho"], &[11, 23, 5, 19, 15, 11, 16, 14, 17, 15, 12, 14, 16, 9]),
    ("Joel", "Joel", &["Jl"], &[20, 32, 21]),
    ("Amos", "Amos", &["Am"], &[15, 16, 15, 13, 27, 14, 17, 14, 15]),
    ("Obadiah", "Obad", &["Ob"], &[21]),
    ("Jonah", "Jonah", &["Jnh", "Jon"], &[17, 10, 10, 11]),
    ("Micah", "Mic", &["Mc"], &[16, 13, 12, 13, 15, 16, 20]),
    ("Nahum", "Nah", &["Na"], &[15, 13, 19]),
    ("Habakkuk", "Hab", &["Hb"], &[17, 20, 19]),
    ("Zephaniah", "Zeph", &["Zep", "Zp"], &[18, 15, 20]),
    ("Haggai", "Hag", &["Hg"], &[15, 23]),
    ("Zechariah", "Zech", &["Zec", "Zc"], &[21, 13, 10, 14, 11, 15, 14, 23, 17, 12, 17, 14, 9, 21]),
    ("Malachi", "Mal", &["Ml"], &[14, 17, 18, 6]),
    ("Matthew", "Matt", &["Mt", "Mat"], &[
        25, 23, 17, 25, 48, 34, 29, 34, 38, 42, 30, 50, 58, 36, 39, 28, 27, 35, 30, 34, 46, 46, 39, 51, 46,
        75, 66, 20,
    ]),
    ("Mark", "Mark", &["Mk", "Mrk"], &[
        45, 28, 35, 41, 43, 56, 37, 38, 50, 52, 33, 44, 37, 72, 47, 20,
    ]),
    ("Luke", "Luke", &["Lk", "Luk"], &[
        80, 52, 38, 44, 39, 49, 50, 56, 62, 42, 54, 59, 35, 35, 32, 31, 37, 43, 48, 47, 38, 71, 56, 53,
    ]),
    ("John", "John", &["Jn", "Jhn"], &[
        51, 25, 36, 54, 47, 71, 53, 59, 41, 42, 57, 50, 38, 31, 27, 33, 26, 40, 42, 31, 25,
    ]),
    ("Acts", "Acts", &["Ac", "Act"], &[
        26, 47, 26, 37, 42, 15, 60, 40, 43, 48, 30, 25, 52, 28, 41, 40, 34, 28, 41, 38, 40, 30, 35, 27, 27,
        32, 44, 31,
    ]),
    ("Romans", "Rom", &["Ro", "Rm"], &[
        32, 29, 31, 25, 21, 23, 25, 39, 33, 21, 36, 21, 14, 23, 33, 27,
    ]),
    ("1 Corinthians", "1Cor", &["1 Co"], &[
        31, 16, 23, 21, 13, 20, 40, 13, 27, 33, 34, 31, 13, 40, 58, 24,
    ]),
    ("2 Corinthians", "2Cor", &["2 Co"], &[24, 17, 18, 18, 21, 18, 16, 24, 15, 18, 33, 21, 14]),
    ("Galatians", "Gal", &["Ga"], &[24, 21, 29, 31, 26, 18]),
    ("Ephesians", "Eph", &["Ephes"], &[23, 22, 21, 32, 33, 24]),
    ("Philippians", "Phil", &["Php", "Pp"], &[30, 30, 21, 23]),
    ("Colossians", "Col", &["Co"], &[29, 23, 25, 18]),
    ("1 Thessalonians", "1Thess", &["1 Th", "1 Thes"], &[10, 20, 13, 18, 28]),
    ("2 Thessalonians", "2Thess", &["2 Th", "2 Thes"], &[12, 17, 18]),
    ("1 Timothy", "1Tim", &["1 Ti"], &[20, 15, 16, 16, 25, 21]),
    ("2 Timothy", "2Tim", &["2 Ti"], &[18, 26, 17, 22]),
    ("Titus", "Titus", &["Tit"], &[16, 15, 15]),
    ("Philemon", "Phlm", &["Philem", "Phm"], &[25]),
    ("Hebrews", "Heb", &[], &[14, 18, 19, 16, 14, 20, 28, 13, 28, 39, 40, 29, 25]),
    ("James", "Jas", &["Jm"], &[27, 26, 18, 17, 20]),
    ("1 Peter", "1Pet", &["1 Pe", "1 Pt"], &[25, 25, 22, 19, 14]),
    ("2 Peter", "2Pet", &["2 Pe", "2 Pt"], &[21, 22, 18]),
    ("1 John", "1John", &["1 Jn", "1 Jhn"], &[10, 29, 24, 21, 21]),
    ("2 John", "2John", &["2 Jn", "2 Jhn"], &[13]),
    ("3 John", "3John", &["3 Jn", "3 Jhn"], &[14]),
    ("Jude", "Jude", &["Jud", "Jd"], &[25]),
    ("Revelation", "Rev", &["Re", "The Revelation", "Apocalypse"], &[
        20, 29, 22, 11, 14, 17, 17, 13, 21, 11, 19, 17, 18, 20, 8, 21, 18, 24, 21, 15, 27, 21,
    ]),
];
