use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
	#[default]
	Web,
	Vector,
	Hybrid,
	None,
}
impl SearchType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Web => "web",
			Self::Vector => "vector",
			Self::Hybrid => "hybrid",
			Self::None => "none",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
	High,
	#[default]
	Medium,
	Low,
}

/// Which path produced a decision. Cached copies keep the source of the original generation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
	/// Strict parse of the reasoning engine output.
	Engine,
	/// The engine answered but its output was not usable structured data.
	ParseFallback,
	/// The engine was unavailable and the fixed rules decided.
	RuleFallback,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchDecision {
	pub should_search: bool,
	pub reasoning: String,
	/// Always within 0.0-1.0.
	pub confidence: f32,
	pub search_type: SearchType,
	pub expected_info_types: Vec<String>,
	pub urgency: Urgency,
	/// Self-determined TTL; always positive.
	pub cache_duration_seconds: i64,
	pub decision_id: String,
	pub source: DecisionSource,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl SearchDecision {
	/// `None` when the expiry falls outside the representable date range.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.created_at.checked_add(time::Duration::seconds(self.cache_duration_seconds))
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QueryPlan {
	pub primary_query: String,
	/// At most two entries.
	pub alternative_queries: Vec<String>,
	pub reasoning: String,
	pub estimated_cost: f32,
	pub plan_id: String,
}
impl QueryPlan {
	/// Primary query first, then alternatives, capped at `max_queries`.
	pub fn queries(&self, max_queries: usize) -> Vec<&str> {
		std::iter::once(self.primary_query.as_str())
			.chain(self.alternative_queries.iter().map(String::as_str))
			.filter(|query| !query.trim().is_empty())
			.take(max_queries)
			.collect()
	}
}

/// Raw hit as returned by the external search provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchHit {
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub body: String,
	#[serde(alias = "href")]
	pub url: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResult {
	pub title: String,
	pub body: String,
	pub url: String,
	pub relevance_score: f32,
}

/// Snippet produced by the internal knowledge retriever.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RetrievedSnippet {
	pub content: String,
	#[serde(default)]
	pub score: Option<f32>,
}
impl RetrievedSnippet {
	pub fn new(content: impl Into<String>) -> Self {
		Self { content: content.into(), score: None }
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ConversationTurn {
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub response: String,
}
impl ConversationTurn {
	pub fn new(message: impl Into<String>, response: impl Into<String>) -> Self {
		Self { message: message.into(), response: response.into() }
	}
}
