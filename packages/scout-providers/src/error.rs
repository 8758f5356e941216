pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Rate limited by {provider}.")]
	RateLimited { provider: String },
}
impl Error {
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Reqwest(err) if err.is_timeout())
	}

	pub fn is_rate_limited(&self) -> bool {
		match self {
			Self::RateLimited { .. } => true,
			Self::Reqwest(err) => err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS),
			_ => false,
		}
	}
}
