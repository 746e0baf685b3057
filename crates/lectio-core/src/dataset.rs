//! Loading the bundled insight dataset
//!
//! The dataset ships either as a JSON array of insight records or as the
//! SQLite `commentary_insights` table the generation pipeline writes. Both
//! load into the same `Insight` values, in table order.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::canon::Canon;
use crate::error::{DatasetError, Result};
use crate::index::InsightIndex;
use crate::insight::{Insight, Lens, Source};

/// Read-only collection of insights, in dataset order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightDataset {
    insights: Vec<Insight>,
}

/// One `commentary_insights` row before its text columns are decoded
struct InsightRow {
    id: String,
    book_id: u8,
    chapter: u16,
    verse_start: u16,
    verse_end: u16,
    insight_type: String,
    title: String,
    content: String,
    sources: Option<String>,
    content_version: Option<u32>,
    prompt_version: Option<String>,
    model_version: Option<String>,
    created_at: Option<String>,
    is_interpretive: Option<i64>,
}

impl InsightDataset {
    pub fn new(insights: Vec<Insight>) -> Self {
        Self { insights }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let insights: Vec<Insight> = serde_json::from_str(json)?;
        Ok(Self { insights })
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), insights = dataset.len(), "loaded insight dataset");
        Ok(dataset)
    }

    pub fn load_sqlite(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(
            "SELECT id, book_id, chapter, verse_start, verse_end, insight_type, title, content,
                    sources, content_version, prompt_version, model_version, created_at, is_interpretive
             FROM commentary_insights
             ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(InsightRow {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    chapter: row.get(2)?,
                    verse_start: row.get(3)?,
                    verse_end: row.get(4)?,
                    insight_type: row.get(5)?,
                    title: row.get(6)?,
                    content: row.get(7)?,
                    sources: row.get(8)?,
                    content_version: row.get(9)?,
                    prompt_version: row.get(10)?,
                    model_version: row.get(11)?,
                    created_at: row.get(12)?,
                    is_interpretive: row.get(13)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let insights = rows
            .into_iter()
            .map(insight_from_row)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(path = %path.display(), insights = insights.len(), "loaded insight dataset");
        Ok(Self { insights })
    }

    /// Load by file extension: `.sqlite`, `.sqlite3` and `.db` are SQLite, anything else JSON
    pub fn load(path: &Path) -> Result<Self> {
        let is_sqlite = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "sqlite" | "sqlite3" | "db"))
            .unwrap_or(false);

        if is_sqlite {
            Self::load_sqlite(path)
        } else {
            Self::load_json(path)
        }
    }

    /// Drop records whose span falls outside `canon`; returns how many were dropped
    pub fn retain_valid(&mut self, canon: &Canon) -> usize {
        let before = self.insights.len();
        self.insights.retain(|insight| match insight.range(canon) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(id = %insight.id, error = %e, "dropping insight with invalid span");
                false
            }
        });
        before - self.insights.len()
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

    pub fn into_index(self) -> InsightIndex {
        InsightIndex::new(self.insights)
    }
}

fn insight_from_row(row: InsightRow) -> Result<Insight> {
    let lens = Lens::from_str(&row.insight_type).ok_or_else(|| DatasetError::UnknownLens {
        id: row.id.clone(),
        kind: row.insight_type.clone(),
    })?;

    let sources: Vec<Source> = match row.sources.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(json) => serde_json::from_str(json).map_err(|e| DatasetError::InvalidSources {
            id: row.id.clone(),
            message: e.to_string(),
        })?,
    };

    Ok(Insight {
        id: row.id,
        book_id: row.book_id,
        chapter: row.chapter,
        verse_start: row.verse_start,
        verse_end: row.verse_end,
        lens,
        title: row.title,
        content: row.content,
        sources,
        is_interpretive: row.is_interpretive.unwrap_or(0) != 0,
        content_version: row.content_version.unwrap_or(1),
        prompt_version: row.prompt_version.unwrap_or_default(),
        model_version: row.model_version.unwrap_or_default(),
        created_at: row.created_at.unwrap_or_default(),
    })
}
