//! Splits a verse's insights into the lenses a reader switches between

use serde::Serialize;

use crate::canon::Testament;
use crate::insight::{Insight, Lens, Source};
use crate::reference::ReferenceParser;

/// A verse's insights grouped by lens, each group in dataset order
#[derive(Debug, Clone, Default, Serialize)]
pub struct LensPartition<'a> {
    all: Vec<&'a Insight>,
    pub theology: Vec<&'a Insight>,
    pub question: Vec<&'a Insight>,
    pub connection: Vec<&'a Insight>,
    pub lexical: Vec<&'a Insight>,
}

/// Connection insights grouped by the testament they point into
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionSplit<'a> {
    pub old: Vec<&'a Insight>,
    pub new: Vec<&'a Insight>,
    /// No cross-reference, or the first one does not parse
    pub unresolved: Vec<&'a Insight>,
}

impl<'a> ConnectionSplit<'a> {
    pub fn get(&self, testament: Testament) -> &[&'a Insight] {
        match testament {
            Testament::Old => &self.old,
            Testament::New => &self.new,
        }
    }
}

impl<'a> LensPartition<'a> {
    pub fn classify<I>(insights: I) -> Self
    where
        I: IntoIterator<Item = &'a Insight>,
    {
        let mut partition = Self::default();
        for insight in insights {
            partition.all.push(insight);
            match insight.lens {
                Lens::Theology => partition.theology.push(insight),
                Lens::Question => partition.question.push(insight),
                Lens::Connection => partition.connection.push(insight),
                Lens::Lexical => partition.lexical.push(insight),
            }
        }
        partition
    }

    pub fn get(&self, lens: Lens) -> &[&'a Insight] {
        match lens {
            Lens::Theology => &self.theology,
            Lens::Question => &self.question,
            Lens::Connection => &self.connection,
            Lens::Lexical => &self.lexical,
        }
    }

    pub fn has_content(&self, lens: Lens) -> bool {
        !self.get(lens).is_empty()
    }

    /// Lenses with at least one insight, in display order
    pub fn available_lenses(&self) -> Vec<Lens> {
        Lens::all()
            .into_iter()
            .filter(|lens| self.has_content(*lens))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Sources of every insight outside `lens`, flattened in dataset order
    pub fn sources_excluding(&self, lens: Lens) -> Vec<&'a Source> {
        self.all
            .iter()
            .filter(|insight| insight.lens != lens)
            .flat_map(|insight| insight.sources.iter())
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connection.len()
    }

    /// Place each connection by the testament of its first cross-reference
    pub fn connection_split(&self, parser: &ReferenceParser<'_>) -> ConnectionSplit<'a> {
        let mut split = ConnectionSplit::default();
        for &insight in &self.connection {
            let target = insight
                .first_cross_reference()
                .and_then(|source| parser.parse(&source.reference).ok());

            match target.map(|parsed| Testament::of(parsed.book_id())) {
                Some(Testament::Old) => split.old.push(insight),
                Some(Testament::New) => split.new.push(insight),
                None => {
                    tracing::debug!(id = %insight.id, "connection has no resolvable cross-reference");
                    split.unresolved.push(insight);
                }
            }
        }
        split
    }
}
