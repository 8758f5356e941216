use serde::Deserialize;

use scout_domain::{ConversationTurn, QueryPlan, digest, fallback, json_block, reference};

use crate::{PromptKind, SearchEngine, error::ParseError, prompt};

pub const MAX_ALTERNATIVE_QUERIES: usize = 2;
pub const FALLBACK_PLAN_COST: f32 = 0.05;

const DEFAULT_PLAN_COST: f32 = 0.1;
const DEFAULT_PLAN_REASONING: &str = "Reasoning engine query plan.";

#[derive(Debug, Deserialize)]
struct PlanOutput {
	#[serde(default)]
	primary_query: Option<String>,
	#[serde(default)]
	alternative_queries: Option<Vec<String>>,
	#[serde(default, alias = "query_reasoning")]
	reasoning: Option<String>,
	#[serde(default)]
	estimated_cost: Option<f64>,
}

impl SearchEngine {
	/// Builds the queries for an external search. Never fails: engine failures and unusable
	/// replies fall back to the question with references resolved from `conversation_history`.
	pub async fn generate_search_queries(
		&self,
		question: &str,
		expected_info_types: &[String],
		conversation_history: &[ConversationTurn],
	) -> QueryPlan {
		let conversation_digest = digest::summarize_conversation(conversation_history);
		let variables = prompt::plan_variables(question, &conversation_digest, expected_info_types);
		let plan = match self.invoke_reasoning(PromptKind::QueryPlan, &variables).await {
			Ok(raw) => parse_plan(&raw, question).unwrap_or_else(|err| {
				tracing::warn!(
					error = %err,
					"Query plan reply was not usable. Using fallback plan."
				);

				fallback_plan(question, conversation_history)
			}),
			Err(err) => {
				tracing::warn!(error = %err, "Query planner unavailable. Using fallback plan.");

				fallback_plan(question, conversation_history)
			},
		};

		tracing::debug!(
			plan_id = %plan.plan_id,
			primary_query = %plan.primary_query,
			alternatives = plan.alternative_queries.len(),
			"Query plan ready."
		);

		plan
	}
}

pub fn parse_plan(raw: &str, question: &str) -> Result<QueryPlan, ParseError> {
	let object = json_block::extract_object(raw).ok_or(ParseError::MissingObject)?;
	let output: PlanOutput = serde_json::from_str(object)?;
	let estimated_cost = match output.estimated_cost {
		Some(cost) if !cost.is_finite() => {
			return Err(ParseError::InvalidField {
				field: "estimated_cost",
				message: "Cost must be a finite number.".to_string(),
			});
		},
		Some(cost) => cost.max(0.0) as f32,
		None => DEFAULT_PLAN_COST,
	};
	let primary_query = output
		.primary_query
		.map(|query| query.trim().to_string())
		.filter(|query| !query.is_empty())
		.unwrap_or_else(|| question.to_string());
	let alternative_queries =
		normalize_alternatives(&primary_query, output.alternative_queries.unwrap_or_default());
	let reasoning = output
		.reasoning
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.unwrap_or_else(|| DEFAULT_PLAN_REASONING.to_string());

	Ok(QueryPlan {
		primary_query,
		alternative_queries,
		reasoning,
		estimated_cost,
		plan_id: fallback::new_decision_id(),
	})
}

/// The question itself, with demonstrative references rewritten to the latest product named in
/// the history when both exist.
pub fn fallback_plan(question: &str, conversation_history: &[ConversationTurn]) -> QueryPlan {
	let resolved = reference::resolve_references(question, conversation_history);
	let (primary_query, reasoning) = match resolved {
		Some(resolved) => (resolved, "Fallback plan with references resolved from history."),
		None => (question.to_string(), "Fallback plan using the original question."),
	};

	QueryPlan {
		primary_query,
		alternative_queries: Vec::new(),
		reasoning: reasoning.to_string(),
		estimated_cost: FALLBACK_PLAN_COST,
		plan_id: fallback::new_decision_id(),
	}
}

fn normalize_alternatives(primary_query: &str, alternatives: Vec<String>) -> Vec<String> {
	let mut seen = vec![primary_query.to_lowercase()];
	let mut out = Vec::new();

	for query in alternatives {
		let query = query.trim();

		if query.is_empty() {
			continue;
		}

		let folded = query.to_lowercase();

		if seen.contains(&folded) {
			continue;
		}

		seen.push(folded);
		out.push(query.to_string());

		if out.len() == MAX_ALTERNATIVE_QUERIES {
			break;
		}
	}

	out
}
