//! Data shared between the backend interfaces and the search pipelines.

mod record;
mod suggestion;

pub use record::{Category, NewRecord, RecordPatch, SourceAttribution, TranslationRecord};
pub(crate) use record::title_code;
pub use suggestion::{HistoryEntry, ScoreBreakdown, SearchSuggestion, SuggestionKind};
