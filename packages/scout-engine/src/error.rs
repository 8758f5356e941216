pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Reasoning engine unavailable: {message}")]
	EngineUnavailable { message: String },
	#[error("Search provider failure ({kind}): {message}")]
	Search { kind: SearchFailureKind, message: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchFailureKind {
	RateLimited,
	Timeout,
	Failed,
}
impl std::fmt::Display for SearchFailureKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::RateLimited => write!(f, "rate_limited"),
			Self::Timeout => write!(f, "timeout"),
			Self::Failed => write!(f, "failed"),
		}
	}
}

/// Reasoning engine reply that is not usable structured data. Always recovered inside the
/// engine; never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("Reply holds no JSON object.")]
	MissingObject,
	#[error("Reply JSON does not match the expected shape: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Field {field} is invalid: {message}")]
	InvalidField { field: &'static str, message: String },
}
