//! Structural checks over a generated insight dataset
//!
//! Errors make a record unusable; warnings flag records a reader can still
//! show but that will not navigate or cite cleanly, or whose text is unusually
//! short or long.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::RangeInclusive;

use crate::canon::Canon;
use crate::insight::{Insight, Lens, SourceKind};
use crate::reference::ReferenceParser;

/// Highest Strong's number in the Greek lexicon
pub const MAX_STRONGS_GREEK: u32 = 5624;
/// Highest Strong's number in the Hebrew lexicon
pub const MAX_STRONGS_HEBREW: u32 = 8674;

/// Content outside this many characters is flagged
const CONTENT_LEN: RangeInclusive<usize> = 30..=500;
/// Titles outside this many characters are flagged
const TITLE_LEN: RangeInclusive<usize> = 3..=50;

static STRONGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([GH])([0-9]+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub insight_id: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub insights_checked: usize,
    /// Records with no errors; warnings do not count against a record
    pub insights_valid: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, insight: &Insight, severity: Severity, message: String) {
        let issue = Issue {
            insight_id: insight.id.clone(),
            severity,
            message,
        };
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }
}

pub fn validate(canon: &Canon, insights: &[Insight]) -> ValidationReport {
    let parser = ReferenceParser::new(canon);
    let mut report = ValidationReport::default();

    for insight in insights {
        let errors_before = report.errors.len();
        check_insight(&parser, insight, &mut report);
        report.insights_checked += 1;
        if report.errors.len() == errors_before {
            report.insights_valid += 1;
        }
    }

    tracing::info!(
        checked = report.insights_checked,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated insight dataset"
    );
    report
}

fn check_insight(parser: &ReferenceParser<'_>, insight: &Insight, report: &mut ValidationReport) {
    if let Err(e) = insight.range(parser.canon()) {
        report.push(insight, Severity::Error, format!("invalid span: {}", e));
    }

    if insight.lens == Lens::Connection && insight.first_cross_reference().is_none() {
        report.push(
            insight,
            Severity::Error,
            "connection insight has no cross-reference source".to_string(),
        );
    }

    check_length(insight, "content", &insight.content, CONTENT_LEN, report);
    check_length(insight, "title", &insight.title, TITLE_LEN, report);

    for source in &insight.sources {
        match source.kind {
            SourceKind::CrossReference => {
                if let Err(e) = parser.parse(&source.reference) {
                    report.push(
                        insight,
                        Severity::Warning,
                        format!("cross-reference '{}' does not resolve: {}", source.reference, e),
                    );
                }
            }
            SourceKind::Strongs => check_strongs(insight, &source.reference, report),
            SourceKind::Commentary | SourceKind::Lexicon => {}
        }
    }
}

fn check_length(
    insight: &Insight,
    field: &str,
    text: &str,
    bounds: RangeInclusive<usize>,
    report: &mut ValidationReport,
) {
    let len = text.chars().count();
    let problem = if len < *bounds.start() {
        "short"
    } else if len > *bounds.end() {
        "long"
    } else {
        return;
    };
    report.push(
        insight,
        Severity::Warning,
        format!(
            "{} too {}: {} chars (expected {}-{})",
            field,
            problem,
            len,
            bounds.start(),
            bounds.end()
        ),
    );
}

fn check_strongs(insight: &Insight, reference: &str, report: &mut ValidationReport) {
    let Some(caps) = STRONGS.captures(reference) else {
        report.push(
            insight,
            Severity::Error,
            format!("Strong's number '{}' is not of the form G123 or H123", reference),
        );
        return;
    };

    let number: u32 = caps[2].parse().unwrap_or(u32::MAX);
    let max = if &caps[1] == "G" {
        MAX_STRONGS_GREEK
    } else {
        MAX_STRONGS_HEBREW
    };
    if number == 0 || number > max {
        report.push(
            insight,
            Severity::Warning,
            format!("Strong's number '{}' is outside 1-{}", reference, max),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::Source;

    fn insight(id: &str, lens: Lens, verse_start: u16, sources: Vec<Source>) -> Insight {
        Insight {
            id: id.to_string(),
            book_id: 43,
            chapter: 1,
            verse_start,
            verse_end: verse_start,
            lens,
            title: "In the beginning".to_string(),
            content: "The Word was with God before anything was made.".to_string(),
            sources,
            is_interpretive: false,
            content_version: 1,
            prompt_version: String::new(),
            model_version: String::new(),
            created_at: String::new(),
        }
    }

    fn strongs(reference: &str) -> Source {
        Source {
            kind: SourceKind::Strongs,
            reference: reference.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_clean_dataset() {
        let canon = Canon::standard();
        let insights = vec![
            insight("c", Lens::Connection, 1, vec![Source::cross_reference("Genesis 1:1")]),
            insight("g", Lens::Lexical, 1, vec![strongs("G3056"), strongs("H7225")]),
        ];
        let report = validate(&canon, &insights);
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert_eq!(report.insights_checked, 2);
        assert_eq!(report.insights_valid, 2);
    }

    #[test]
    fn test_length_warnings() {
        let canon = Canon::standard();
        let mut short = insight("s", Lens::Theology, 1, vec![]);
        short.title = "Go".to_string();
        short.content = "Too brief.".to_string();
        let mut long = insight("l", Lens::Theology, 2, vec![]);
        long.title = "t".repeat(51);
        long.content = "w".repeat(501);
        let mut edges = insight("e", Lens::Theology, 3, vec![]);
        edges.title = "abc".to_string();
        // Counted in characters, not bytes
        edges.content = "λ".repeat(500);

        let report = validate(&canon, &[short, long, edges]);
        assert!(report.is_ok());
        assert_eq!(report.insights_valid, 3);
        let flagged: Vec<(&str, &str)> = report
            .warnings
            .iter()
            .map(|w| (w.insight_id.as_str(), w.message.as_str()))
            .collect();
        assert_eq!(
            flagged,
            vec![
                ("s", "content too short: 10 chars (expected 30-500)"),
                ("s", "title too short: 2 chars (expected 3-50)"),
                ("l", "content too long: 501 chars (expected 30-500)"),
                ("l", "title too long: 51 chars (expected 3-50)"),
            ]
        );
    }

    #[test]
    fn test_span_outside_canon() {
        let canon = Canon::standard();
        // John 1 has 51 verses
        let report = validate(&canon, &[insight("x", Lens::Theology, 52, vec![])]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.insights_valid, 0);
    }

    #[test]
    fn test_connection_needs_cross_reference() {
        let canon = Canon::standard();
        let report = validate(&canon, &[insight("c", Lens::Connection, 1, vec![strongs("G746")])]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].insight_id, "c");
    }

    #[test]
    fn test_unparseable_cross_reference_warns() {
        let canon = Canon::standard();
        let report = validate(
            &canon,
            &[insight(
                "t",
                Lens::Theology,
                1,
                vec![Source::cross_reference("Hezekiah 3:1"), Source::cross_reference("John 1:99")],
            )],
        );
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.insights_valid, 1);
    }

    #[test]
    fn test_strongs_checks() {
        let canon = Canon::standard();
        let report = validate(
            &canon,
            &[insight(
                "g",
                Lens::Lexical,
                1,
                vec![strongs("3056"), strongs("g3056"), strongs("G9999"), strongs("H8674"), strongs("H0")],
            )],
        );
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().all(|w| w.severity == Severity::Warning));
    }
}
