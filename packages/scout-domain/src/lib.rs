pub mod digest;
pub mod fallback;
pub mod json_block;
pub mod reference;
pub mod relevance;
pub mod text;
pub mod time_serde;
pub mod types;

pub use types::{
	ConversationTurn, DecisionSource, QueryPlan, RetrievedSnippet, SearchDecision, SearchHit,
	SearchResult, SearchType, Urgency,
};
