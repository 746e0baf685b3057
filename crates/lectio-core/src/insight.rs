//! Pre-generated study insights and their citations
//!
//! Insights are read-only once loaded. Field names follow the
//! `commentary_insights` table the dataset is generated into.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::canon::{BookId, Canon};
use crate::error::LocationError;
use crate::location::{ChapterRef, Location, VerseRange};

/// The content category an insight is filed under
///
/// Serializes to the stored `insight_type` tag. Deserializing goes through
/// `Lens::from_str`, so JSON and SQLite datasets accept the same tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lens {
    Theology,
    /// Reflection prompts
    Question,
    /// Cross-references to another passage
    Connection,
    /// Original-language word studies
    #[serde(rename = "greek")]
    Lexical,
}

impl Lens {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lens::Theology => "theology",
            Lens::Question => "question",
            Lens::Connection => "connection",
            Lens::Lexical => "greek",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "theology" => Some(Lens::Theology),
            "question" | "reflection" => Some(Lens::Question),
            "connection" => Some(Lens::Connection),
            "greek" | "lexical" => Some(Lens::Lexical),
            _ => None,
        }
    }

    pub fn all() -> Vec<Lens> {
        vec![Lens::Theology, Lens::Question, Lens::Connection, Lens::Lexical]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Lens::Theology => "Theology",
            Lens::Question => "Reflection",
            Lens::Connection => "Connections",
            Lens::Lexical => "Greek & Hebrew",
        }
    }
}

impl<'de> Deserialize<'de> for Lens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Lens::from_str(&tag).ok_or_else(|| de::Error::unknown_variant(&tag, LENS_TAGS))
    }
}

const LENS_TAGS: &[&str] = &["theology", "question", "reflection", "connection", "greek", "lexical"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// Another passage; the reference is a parseable text reference
    CrossReference,
    /// A Strong's lexicon entry such as "G3056"
    Strongs,
    Commentary,
    Lexicon,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::CrossReference => "crossReference",
            SourceKind::Strongs => "strongs",
            SourceKind::Commentary => "commentary",
            SourceKind::Lexicon => "lexicon",
        }
    }
}

/// A citation attached to an insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Source {
    pub fn cross_reference(reference: &str) -> Self {
        Self {
            kind: SourceKind::CrossReference,
            reference: reference.to_string(),
            description: None,
        }
    }

    pub fn is_cross_reference(&self) -> bool {
        self.kind == SourceKind::CrossReference
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub book_id: BookId,
    pub chapter: u16,
    pub verse_start: u16,
    pub verse_end: u16,
    #[serde(rename = "insight_type")]
    pub lens: Lens,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub is_interpretive: bool,
    #[serde(default = "default_content_version")]
    pub content_version: u32,
    #[serde(default)]
    pub prompt_version: String,
    #[serde(default)]
    pub model_version: String,
    #[serde(default)]
    pub created_at: String,
}

fn default_content_version() -> u32 {
    1
}

impl Insight {
    pub fn chapter_ref(&self) -> ChapterRef {
        ChapterRef::new_unchecked(self.book_id, self.chapter)
    }

    /// The span as stored, without checking it against a canon
    pub fn span(&self) -> VerseRange {
        VerseRange::new_unchecked(self.book_id, self.chapter, self.verse_start, self.verse_end)
    }

    /// The span, checked against `canon`
    pub fn range(&self, canon: &Canon) -> Result<VerseRange, LocationError> {
        VerseRange::new(canon, self.book_id, self.chapter, self.verse_start, self.verse_end)
    }

    pub fn covers(&self, location: Location) -> bool {
        self.book_id == location.book_id()
            && self.chapter == location.chapter()
            && self.verse_start <= location.verse()
            && location.verse() <= self.verse_end
    }

    pub fn cross_references(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter().filter(|s| s.is_cross_reference())
    }

    /// The first cross-reference citation, used to place a connection in a testament
    pub fn first_cross_reference(&self) -> Option<&Source> {
        self.cross_references().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": "john-1-1-connection-1",
            "book_id": 43,
            "chapter": 1,
            "verse_start": 1,
            "verse_end": 2,
            "insight_type": "connection",
            "title": "In the beginning",
            "content": "John opens with the first words of Genesis.",
            "sources": [
                {"type": "crossReference", "reference": "Genesis 1:1", "description": "Same opening words"},
                {"type": "strongs", "reference": "G746"}
            ],
            "is_interpretive": false,
            "content_version": 1,
            "prompt_version": "v1.0",
            "model_version": "gpt-4o",
            "created_at": "2025-01-01T00:00:00"
        }"#
    }

    #[test]
    fn test_deserialize_dataset_record() {
        let insight: Insight = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(insight.lens, Lens::Connection);
        assert_eq!(insight.sources.len(), 2);
        assert_eq!(insight.sources[1].kind, SourceKind::Strongs);
        assert_eq!(
            insight.first_cross_reference().map(|s| s.reference.as_str()),
            Some("Genesis 1:1")
        );
    }

    #[test]
    fn test_lens_tags() {
        let lens: Lens = serde_json::from_str("\"greek\"").unwrap();
        assert_eq!(lens, Lens::Lexical);
        let alias: Lens = serde_json::from_str("\"lexical\"").unwrap();
        assert_eq!(alias, Lens::Lexical);
        assert_eq!(serde_json::to_string(&Lens::Lexical).unwrap(), "\"greek\"");
        assert!(serde_json::from_str::<Lens>("\"poetry\"").is_err());
        let reflection: Lens = serde_json::from_str("\"reflection\"").unwrap();
        assert_eq!(reflection, Lens::Question);
        let capitalised: Lens = serde_json::from_str("\"Theology\"").unwrap();
        assert_eq!(capitalised, Lens::Theology);
        for lens in Lens::all() {
            assert_eq!(Lens::from_str(lens.as_str()), Some(lens));
        }
    }

    #[test]
    fn test_optional_metadata_defaults() {
        let insight: Insight = serde_json::from_str(
            r#"{"id": "x", "book_id": 1, "chapter": 1, "verse_start": 1, "verse_end": 1,
                "insight_type": "theology", "title": "T", "content": "C"}"#,
        )
        .unwrap();
        assert!(insight.sources.is_empty());
        assert!(!insight.is_interpretive);
        assert_eq!(insight.content_version, 1);
    }

    #[test]
    fn test_covers_span() {
        let canon = Canon::standard();
        let insight: Insight = serde_json::from_str(sample_json()).unwrap();
        assert!(insight.covers(Location::new(&canon, 43, 1, 1).unwrap()));
        assert!(insight.covers(Location::new(&canon, 43, 1, 2).unwrap()));
        assert!(!insight.covers(Location::new(&canon, 43, 1, 3).unwrap()));
        assert!(!insight.covers(Location::new(&canon, 43, 2, 1).unwrap()));
        assert!(insight.range(&canon).is_ok());
    }
}
