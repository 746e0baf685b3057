pub mod canon;
pub mod dataset;
pub mod error;
pub mod index;
pub mod insight;
pub mod lens;
pub mod location;
pub mod navigation;
pub mod reference;
pub mod validate;

// Re-export main types for convenience
pub use canon::{is_old_testament, Book, BookId, Canon, Testament};
pub use dataset::InsightDataset;
pub use error::{CanonError, DatasetError, LocationError, ParseError};
pub use index::{nearest_verse_with_counts, Direction, InsightIndex};
pub use insight::{Insight, Lens, Source, SourceKind};
pub use lens::{ConnectionSplit, LensPartition};
pub use location::{ChapterRef, Location, VerseRange};
pub use navigation::{NavigationHistory, NavigationResolver, NavigationTarget};
pub use reference::{ParsedReference, ReferenceParser};
pub use validate::{validate, Issue, Severity, ValidationReport};
