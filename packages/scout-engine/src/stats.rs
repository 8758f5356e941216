use std::{
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{CacheStats, SearchEngine};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecisionPath {
	Cache,
	Engine,
	Fallback,
	/// Engine failure surfaced to the caller because the fallback is disabled.
	Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EngineStatistics {
	pub total_decisions: u64,
	pub cache_decisions: u64,
	pub engine_decisions: u64,
	pub fallback_decisions: u64,
	pub failed_decisions: u64,
	pub cache_hits: u64,
	pub cache_misses: u64,
	pub average_decision_latency_ms: f64,
	pub cumulative_estimated_cost: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemStats {
	pub statistics: EngineStatistics,
	pub cache: Option<CacheStats>,
	pub fallback_enabled: bool,
	pub search_available: bool,
	pub reasoning_model: String,
	pub uptime_seconds: i64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OptimizeReport {
	pub purged_entries: usize,
	pub counters_reset: bool,
}

/// Engine-wide counters. Every update happens under one lock so a snapshot never shows a
/// decision counted in `total_decisions` but not in its path counter.
#[derive(Default)]
pub(crate) struct Statistics {
	counters: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
	total_decisions: u64,
	cache_decisions: u64,
	engine_decisions: u64,
	fallback_decisions: u64,
	failed_decisions: u64,
	average_decision_latency_ms: f64,
	cumulative_estimated_cost: f64,
}

impl Statistics {
	pub(crate) fn record_decision(&self, path: DecisionPath, latency: Duration) {
		let mut counters = self.lock();

		counters.total_decisions += 1;

		match path {
			DecisionPath::Cache => counters.cache_decisions += 1,
			DecisionPath::Engine => counters.engine_decisions += 1,
			DecisionPath::Fallback => counters.fallback_decisions += 1,
			DecisionPath::Failed => counters.failed_decisions += 1,
		}

		let latency_ms = latency.as_secs_f64() * 1_000.0;
		let mean = counters.average_decision_latency_ms;

		counters.average_decision_latency_ms =
			mean + (latency_ms - mean) / counters.total_decisions as f64;
	}

	pub(crate) fn add_cost(&self, cost: f64) {
		self.lock().cumulative_estimated_cost += cost;
	}

	pub(crate) fn snapshot(&self) -> EngineStatistics {
		let counters = self.lock();

		EngineStatistics {
			total_decisions: counters.total_decisions,
			cache_decisions: counters.cache_decisions,
			engine_decisions: counters.engine_decisions,
			fallback_decisions: counters.fallback_decisions,
			failed_decisions: counters.failed_decisions,
			cache_hits: 0,
			cache_misses: 0,
			average_decision_latency_ms: counters.average_decision_latency_ms,
			cumulative_estimated_cost: counters.cumulative_estimated_cost,
		}
	}

	pub(crate) fn total_decisions(&self) -> u64 {
		self.lock().total_decisions
	}

	pub(crate) fn reset(&self) {
		*self.lock() = Counters::default();
	}

	fn lock(&self) -> MutexGuard<'_, Counters> {
		self.counters.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl SearchEngine {
	/// Counter snapshot. `cache_hits` and `cache_misses` mirror the decision cache.
	pub fn statistics(&self) -> EngineStatistics {
		let mut snapshot = self.stats.snapshot();

		if let Some(cache) = self.cache() {
			let cache_stats = cache.stats();

			snapshot.cache_hits = cache_stats.hits;
			snapshot.cache_misses = cache_stats.misses;
		}

		snapshot
	}

	pub fn system_stats(&self) -> SystemStats {
		SystemStats {
			statistics: self.statistics(),
			cache: self.cache().map(|cache| cache.stats()),
			fallback_enabled: self.cfg.engine.fallback_enabled,
			search_available: self.providers.search.is_available(),
			reasoning_model: self.cfg.providers.reasoning.model.clone(),
			uptime_seconds: (self.now() - self.started_at).whole_seconds().max(0),
		}
	}

	/// Sweeps expired cache entries and resets all counters once `total_decisions` passes
	/// `engine.stats_reset_threshold`.
	pub fn optimize(&self) -> OptimizeReport {
		let purged_entries = self.cache().map(|cache| cache.purge_expired()).unwrap_or(0);
		let total_decisions = self.stats.total_decisions();
		let counters_reset = total_decisions > self.cfg.engine.stats_reset_threshold;

		if counters_reset {
			self.stats.reset();

			if let Some(cache) = self.cache() {
				cache.reset_counters();
			}
		}

		tracing::info!(purged_entries, counters_reset, total_decisions, "Engine optimized.");

		OptimizeReport { purged_entries, counters_reset }
	}
}

/// Runs [`SearchEngine::optimize`] every `engine.optimize_interval_seconds` until the handle is
/// aborted or the runtime shuts down.
pub fn spawn_optimizer(engine: Arc<SearchEngine>) -> JoinHandle<()> {
	let period = Duration::from_secs(engine.cfg.engine.optimize_interval_seconds);

	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(period);

		// The first tick completes immediately.
		ticker.tick().await;

		loop {
			ticker.tick().await;
			engine.optimize();
		}
	})
}
