use std::time::Instant;

use serde::Deserialize;
use time::OffsetDateTime;

use scout_domain::{
	ConversationTurn, DecisionSource, RetrievedSnippet, SearchDecision, SearchType, Urgency,
	digest, fallback, json_block,
};

use crate::{
	PromptKind, Result, SearchEngine, cache, error::ParseError, prompt, stats::DecisionPath,
};

const DEFAULT_CONFIDENCE: f32 = 0.5;
const DEFAULT_REASONING: &str = "Reasoning engine decision.";
/// Upper bound for an engine-chosen cache duration, matching the range the prompt asks for.
pub const MAX_CACHE_DURATION_SECONDS: i64 = 7_200;

/// Expected shape of the reasoning engine reply. Only `should_search` is required.
#[derive(Debug, Deserialize)]
struct DecisionOutput {
	should_search: bool,
	#[serde(default)]
	reasoning: Option<String>,
	#[serde(default)]
	confidence: Option<f32>,
	#[serde(default)]
	search_type: Option<String>,
	#[serde(default)]
	expected_info_types: Option<Vec<String>>,
	#[serde(default)]
	urgency: Option<String>,
	#[serde(default, alias = "cache_duration_seconds")]
	cache_duration: Option<f64>,
}

impl SearchEngine {
	/// Decides whether `question` needs an external search.
	///
	/// Returns an error only when the reasoning engine is unavailable and
	/// `engine.fallback_enabled` is off. Unusable engine output always degrades to a heuristic
	/// decision.
	pub async fn decide_search_strategy(
		&self,
		question: &str,
		retrieval_results: &[RetrievedSnippet],
		conversation_history: &[ConversationTurn],
	) -> Result<SearchDecision> {
		let started = Instant::now();
		let retrieval_digest = digest::summarize_retrieval(retrieval_results);
		let conversation_digest = digest::summarize_conversation(conversation_history);

		if let Some(cache) = self.cache()
			&& let Some(decision) = cache.get(question, &retrieval_digest, &conversation_digest)
		{
			self.stats.record_decision(DecisionPath::Cache, started.elapsed());

			return Ok(decision);
		}

		let variables =
			prompt::decision_variables(question, &retrieval_digest, &conversation_digest);

		match self.invoke_reasoning(PromptKind::SearchDecision, &variables).await {
			Ok(raw) => {
				let now = self.now();
				let decision = parse_decision(
					&raw,
					self.cfg.engine.default_cache_duration_seconds,
					now,
				)
				.unwrap_or_else(|err| {
					tracing::warn!(
						error = %err,
						"Reasoning engine reply was not usable. Using heuristic decision."
					);

					fallback::heuristic_decision(&raw, now)
				});

				if let Some(cache) = self.cache() {
					cache.set(question, &retrieval_digest, &conversation_digest, &decision);
				}

				self.stats.record_decision(DecisionPath::Engine, started.elapsed());

				let key = cache::cache_key(question, &retrieval_digest, &conversation_digest);

				tracing::info!(
					decision_id = %decision.decision_id,
					should_search = decision.should_search,
					source = ?decision.source,
					cache_key_prefix = cache::cache_key_prefix(&key),
					latency_ms = started.elapsed().as_millis() as u64,
					"Search decision made."
				);

				Ok(decision)
			},
			Err(err) if self.cfg.engine.fallback_enabled => {
				let decision =
					fallback::rule_decision(question, retrieval_results.len(), self.now());

				self.stats.record_decision(DecisionPath::Fallback, started.elapsed());

				tracing::warn!(
					error = %err,
					decision_id = %decision.decision_id,
					should_search = decision.should_search,
					"Reasoning engine unavailable. Using rule-based decision."
				);

				Ok(decision)
			},
			Err(err) => {
				self.stats.record_decision(DecisionPath::Failed, started.elapsed());

				tracing::error!(
					error = %err,
					"Reasoning engine unavailable and fallback is disabled."
				);

				Err(err)
			},
		}
	}
}

/// Parses a decision reply. `default_ttl` applies when the reply omits a usable cache
/// duration; longer durations are clamped to [`MAX_CACHE_DURATION_SECONDS`].
///
/// Fails only when no object is found or `should_search` is not a boolean. Unknown
/// `search_type` or `urgency` values fall back to their defaults.
pub fn parse_decision(
	raw: &str,
	default_ttl: i64,
	now: OffsetDateTime,
) -> Result<SearchDecision, ParseError> {
	let object = json_block::extract_object(raw).ok_or(ParseError::MissingObject)?;
	let output: DecisionOutput = serde_json::from_str(object)?;
	let search_type = output
		.search_type
		.as_deref()
		.map(|value| parse_search_type(value).unwrap_or_else(default_on_invalid))
		.unwrap_or_default();
	let urgency = output
		.urgency
		.as_deref()
		.map(|value| parse_urgency(value).unwrap_or_else(default_on_invalid))
		.unwrap_or_default();
	let expected_info_types = output
		.expected_info_types
		.map(|types| {
			types
				.into_iter()
				.map(|value| value.trim().to_string())
				.filter(|value| !value.is_empty())
				.collect::<Vec<_>>()
		})
		.filter(|types| !types.is_empty())
		.unwrap_or_else(|| vec![fallback::GENERAL_INFO_TYPE.to_string()]);
	let cache_duration_seconds = match output.cache_duration {
		Some(seconds) if seconds.is_finite() && seconds >= 1.0 =>
			seconds.min(MAX_CACHE_DURATION_SECONDS as f64).round() as i64,
		_ => default_ttl,
	};
	let reasoning = output
		.reasoning
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.unwrap_or_else(|| DEFAULT_REASONING.to_string());

	Ok(SearchDecision {
		should_search: output.should_search,
		reasoning,
		confidence: fallback::clamp_confidence(output.confidence.unwrap_or(DEFAULT_CONFIDENCE)),
		search_type,
		expected_info_types,
		urgency,
		cache_duration_seconds,
		decision_id: fallback::new_decision_id(),
		source: DecisionSource::Engine,
		created_at: now,
	})
}

fn default_on_invalid<T: Default>(err: ParseError) -> T {
	tracing::warn!(error = %err, "Decision field was not recognized. Using its default.");

	T::default()
}

fn parse_search_type(value: &str) -> Result<SearchType, ParseError> {
	match value.trim().to_lowercase().as_str() {
		"web" => Ok(SearchType::Web),
		"vector" => Ok(SearchType::Vector),
		"hybrid" => Ok(SearchType::Hybrid),
		"none" => Ok(SearchType::None),
		other => Err(ParseError::InvalidField {
			field: "search_type",
			message: format!("Unknown search type {other:?}."),
		}),
	}
}

fn parse_urgency(value: &str) -> Result<Urgency, ParseError> {
	match value.trim().to_lowercase().as_str() {
		"high" => Ok(Urgency::High),
		"medium" => Ok(Urgency::Medium),
		"low" => Ok(Urgency::Low),
		other => Err(ParseError::InvalidField {
			field: "urgency",
			message: format!("Unknown urgency {other:?}."),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn now() -> OffsetDateTime {
		OffsetDateTime::UNIX_EPOCH
	}

	#[test]
	fn parses_fenced_reply_with_prose() {
		let raw = "Sure.\n```json\n{\"should_search\": true, \"confidence\": 0.9, \"search_type\": \"Hybrid\", \"urgency\": \"high\", \"expected_info_types\": [\"price\"], \"cache_duration\": 300}\n```";
		let decision = parse_decision(raw, 3_600, now()).expect("Reply should parse.");

		assert!(decision.should_search);
		assert_eq!(decision.search_type, SearchType::Hybrid);
		assert_eq!(decision.urgency, Urgency::High);
		assert_eq!(decision.expected_info_types, vec!["price".to_string()]);
		assert_eq!(decision.cache_duration_seconds, 300);
		assert_eq!(decision.source, DecisionSource::Engine);
	}

	#[test]
	fn missing_optional_fields_take_defaults() {
		let decision = parse_decision("{\"should_search\": false}", 3_600, now())
			.expect("Minimal reply should parse.");

		assert_eq!(decision.confidence, DEFAULT_CONFIDENCE);
		assert_eq!(decision.cache_duration_seconds, 3_600);
		assert_eq!(decision.expected_info_types, vec!["general".to_string()]);
		assert_eq!(decision.search_type, SearchType::Web);
		assert_eq!(decision.urgency, Urgency::Medium);
	}

	#[test]
	fn out_of_range_values_are_normalized() {
		let decision = parse_decision(
			"{\"should_search\": true, \"confidence\": 1.7, \"cache_duration\": -5}",
			3_600,
			now(),
		)
		.expect("Reply should parse.");

		assert_eq!(decision.confidence, 1.0);
		assert_eq!(decision.cache_duration_seconds, 3_600);
	}

	#[test]
	fn rejects_unusable_replies() {
		assert!(matches!(
			parse_decision("I think we should search.", 3_600, now()),
			Err(ParseError::MissingObject)
		));
		assert!(matches!(
			parse_decision("{\"confidence\": 0.8}", 3_600, now()),
			Err(ParseError::Json(_))
		));
		assert!(matches!(
			parse_decision("{\"should_search\": \"yes\"}", 3_600, now()),
			Err(ParseError::Json(_))
		));
	}

	#[test]
	fn unknown_enum_values_keep_the_answer() {
		let decision = parse_decision(
			"{\"should_search\": false, \"search_type\": \"vector\", \"urgency\": \"normal\"}",
			3_600,
			now(),
		)
		.expect("Reply should parse.");

		assert!(!decision.should_search);
		assert_eq!(decision.search_type, SearchType::Vector);
		assert_eq!(decision.urgency, Urgency::Medium);

		let decision = parse_decision(
			"{\"should_search\": true, \"search_type\": \"intranet\"}",
			3_600,
			now(),
		)
		.expect("Reply should parse.");

		assert_eq!(decision.search_type, SearchType::Web);
	}

	#[test]
	fn long_cache_durations_are_clamped() {
		let decision =
			parse_decision("{\"should_search\": true, \"cache_duration\": 1e12}", 3_600, now())
				.expect("Reply should parse.");

		assert_eq!(decision.cache_duration_seconds, MAX_CACHE_DURATION_SECONDS);
	}
}
