//! Client-side search: suggestions while typing and the filtered listing.

mod cache;
mod config;
mod connectivity;
mod debounce;
mod filters;
mod grouping;
mod history;
mod listing;
mod pipeline;
mod query;
mod scoring;
mod suggestions;
mod worker;

pub use cache::{DEFAULT_CACHE_TTL, SuggestionCache, normalize_term};
pub use config::SearchConfig;
pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use filters::{DateRange, FilterState, SortDirection, SortField, SortSpec};
pub use grouping::{GroupedTranslation, flatten, group};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
pub use listing::{ListingRequest, ListingSearch};
pub use pipeline::{FetchRequest, PipelineState, SuggestionPipeline, build_suggestions};
pub use query::{
	ListingOutcome, SearchStats, build_listing_query, build_suggestion_query, execute_listing,
	substring_pattern,
};
pub use scoring::{ScoringInput, score};
pub use suggestions::SuggestionSession;
