use thiserror::Error;

/// Failures reported by a backend collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
	/// The backend could not be reached at all.
	#[error("backend unavailable: {0}")]
	Unavailable(String),

	/// The backend answered but rejected or failed the request.
	#[error("backend request failed: {0}")]
	Request(String),

	/// A mutation targeted a record that does not exist.
	#[error("record '{id}' not found")]
	NotFound { id: String },
}

/// Why the suggestion pipeline could not produce results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionError {
	/// Connectivity is down; no fetch was attempted.
	#[error("you appear to be offline")]
	Offline,

	/// The fetch failed and may be retried.
	#[error("failed to load suggestions: {message}")]
	Fetch { message: String },
}

impl SuggestionError {
	/// Whether [`retry`](crate::search::SuggestionPipeline::retry) can help.
	#[must_use]
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Fetch { .. })
	}
}

impl From<BackendError> for SuggestionError {
	fn from(err: BackendError) -> Self {
		Self::Fetch {
			message: err.to_string(),
		}
	}
}

/// Mutation input rejected before any backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("view count must be a non-negative whole number (got '{value}')")]
	InvalidViewCount { value: String },

	#[error("title must not be empty")]
	EmptyTitle,

	#[error("tag must not be empty")]
	EmptyTag,
}

/// A session attempted an action its role does not allow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
	#[error("sign in to perform this action")]
	NotSignedIn,

	#[error("'{email}' is not allowed to moderate translations")]
	NotAdmin { email: String },
}

/// Anything that can go wrong while moderating a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModerationError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	Authorization(#[from] AuthorizationError),

	#[error(transparent)]
	Backend(#[from] BackendError),
}
