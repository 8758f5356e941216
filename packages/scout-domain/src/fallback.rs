//! Decisions produced without a usable reasoning engine answer.

use regex::Regex;
use time::OffsetDateTime;

use crate::{DecisionSource, SearchDecision, SearchType, Urgency, text};

pub const RULE_CONFIDENCE: f32 = 0.6;
pub const RULE_CACHE_SECONDS: i64 = 600;
pub const HEURISTIC_CONFIDENCE: f32 = 0.4;
pub const HEURISTIC_CACHE_SECONDS: i64 = 900;
/// Fewer retrieval results than this always warrant an external search.
pub const MIN_RETRIEVAL_RESULTS: usize = 2;
/// Price, promotion, novelty and comparison markers, Vietnamese and English.
pub const TRIGGER_PHRASES: [&str; 14] = [
	"giá",
	"khuyến mãi",
	"so sánh",
	"mới",
	"hiện tại",
	"price",
	"promotion",
	"discount",
	"sale",
	"compare",
	"comparison",
	"vs",
	"versus",
	"latest",
];
pub const GENERAL_INFO_TYPE: &str = "general";

pub fn new_decision_id() -> String {
	uuid::Uuid::new_v4().simple().to_string()
}

/// True when the question names a price, promotion, comparison, novelty or year marker.
pub fn has_trigger_terms(question: &str) -> bool {
	let folded = text::fold(question);
	let padded = text::padded_tokens(&folded);

	if TRIGGER_PHRASES.iter().any(|phrase| text::contains_phrase(&padded, phrase)) {
		return true;
	}

	text::tokens(&folded).into_iter().any(is_year_marker)
}

fn is_year_marker(token: &str) -> bool {
	token.len() == 4 && token.starts_with("20") && token.bytes().all(|b| b.is_ascii_digit())
}

pub fn rule_should_search(question: &str, retrieval_count: usize) -> bool {
	retrieval_count < MIN_RETRIEVAL_RESULTS || has_trigger_terms(question)
}

pub fn rule_decision(question: &str, retrieval_count: usize, now: OffsetDateTime) -> SearchDecision {
	let should_search = rule_should_search(question, retrieval_count);

	SearchDecision {
		should_search,
		reasoning: "Rule-based fallback decision.".to_string(),
		confidence: RULE_CONFIDENCE,
		search_type: if should_search { SearchType::Web } else { SearchType::Vector },
		expected_info_types: vec![GENERAL_INFO_TYPE.to_string()],
		urgency: Urgency::Medium,
		cache_duration_seconds: RULE_CACHE_SECONDS,
		decision_id: new_decision_id(),
		source: DecisionSource::RuleFallback,
		created_at: now,
	}
}

const SHOULD_SEARCH_TOKEN: &str = r#"should_search"?\s*[:=]\s*"?(true|false)"#;

/// Reads a search intent out of an unstructured reply.
///
/// An explicit `should_search` value wins. Otherwise any truthy token counts.
pub fn heuristic_should_search(raw: &str) -> bool {
	let folded = text::fold(raw);
	let explicit = Regex::new(SHOULD_SEARCH_TOKEN)
		.ok()
		.and_then(|re| re.captures(&folded).map(|caps| &caps[1] == "true"));

	explicit.unwrap_or_else(|| folded.contains("true") || folded.contains("search"))
}

pub fn heuristic_decision(raw: &str, now: OffsetDateTime) -> SearchDecision {
	let should_search = heuristic_should_search(raw);

	SearchDecision {
		should_search,
		reasoning: "Inferred from an unstructured reasoning engine reply.".to_string(),
		confidence: HEURISTIC_CONFIDENCE,
		search_type: if should_search { SearchType::Web } else { SearchType::Vector },
		expected_info_types: vec![GENERAL_INFO_TYPE.to_string()],
		urgency: Urgency::Medium,
		cache_duration_seconds: HEURISTIC_CACHE_SECONDS,
		decision_id: new_decision_id(),
		source: DecisionSource::ParseFallback,
		created_at: now,
	}
}

pub fn clamp_confidence(value: f32) -> f32 {
	value.clamp(0.0, 1.0)
}
