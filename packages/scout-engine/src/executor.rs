use std::collections::HashSet;

use serde::Serialize;

use scout_domain::{
	ConversationTurn, QueryPlan, RetrievedSnippet, SearchDecision, SearchResult, relevance,
};

use crate::{Result, SearchEngine};

/// Cost of the first query issued. Query `i` (zero-based) costs `(i + 1)` times this.
pub const QUERY_COST_STEP: f64 = 0.05;

#[derive(Clone, Debug, Serialize)]
pub struct SearchOutcome {
	pub results: Vec<SearchResult>,
	pub decision: SearchDecision,
	/// `None` when no external search was attempted.
	pub plan: Option<QueryPlan>,
}

impl SearchEngine {
	/// Decides, plans, runs at most `engine.max_queries_per_decision` queries and returns the
	/// unique results ranked by relevance.
	///
	/// Per-query provider failures are logged and skipped. The only error is the one
	/// [`SearchEngine::decide_search_strategy`] surfaces when the fallback is disabled.
	pub async fn execute_complete_search(
		&self,
		question: &str,
		retrieval_results: &[RetrievedSnippet],
		conversation_history: &[ConversationTurn],
	) -> Result<SearchOutcome> {
		let decision =
			self.decide_search_strategy(question, retrieval_results, conversation_history).await?;

		if !decision.should_search {
			return Ok(SearchOutcome { results: Vec::new(), decision, plan: None });
		}
		if !self.providers.search.is_available() {
			tracing::info!(
				decision_id = %decision.decision_id,
				"Search provider unavailable. Returning no external results."
			);

			return Ok(SearchOutcome { results: Vec::new(), decision, plan: None });
		}

		let plan = self
			.generate_search_queries(question, &decision.expected_info_types, conversation_history)
			.await;
		let max_queries = self.cfg.engine.max_queries_per_decision as usize;
		let max_results = self.cfg.engine.max_results_returned as usize;
		let queries = plan.queries(max_queries);
		let mut collected = Vec::new();

		for (idx, query) in queries.iter().enumerate() {
			self.stats.add_cost(QUERY_COST_STEP * (idx + 1) as f64);

			match self.run_search(query).await {
				Ok(hits) => {
					tracing::debug!(query, hits = hits.len(), "Search query finished.");

					collected.extend(hits.into_iter().map(|hit| relevance::score_hit(hit, query)));
				},
				Err(err) => {
					tracing::warn!(query, error = %err, "Search query failed. Skipping.");
				},
			}

			if collected.len() >= max_results {
				break;
			}
		}

		let raw_results = collected.len();
		let results = dedupe_and_rank(collected, max_results);

		tracing::info!(
			decision_id = %decision.decision_id,
			plan_id = %plan.plan_id,
			queries = queries.len(),
			raw_results,
			results = results.len(),
			"Complete search finished."
		);

		Ok(SearchOutcome { results, decision, plan: Some(plan) })
	}
}

/// Keeps the first result per url, sorts by relevance descending and truncates to `limit`.
/// Equal scores keep their arrival order.
pub fn dedupe_and_rank(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
	let mut seen = HashSet::new();
	let mut unique: Vec<SearchResult> =
		results.into_iter().filter(|result| seen.insert(result.url.clone())).collect();

	unique.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
	unique.truncate(limit);

	unique
}
