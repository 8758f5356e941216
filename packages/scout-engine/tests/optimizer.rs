use std::{sync::Arc, time::Duration as StdDuration};

use time::Duration;

use scout_config::Config;
use scout_engine::{EngineStatistics, PromptKind, SearchEngine, stats};
use scout_testkit::{ManualClock, Reply, ScriptedReasoning, ScriptedSearch};

const SHORT_DECISION: &str = r#"{"should_search": true, "cache_duration": 300}"#;

fn build(cfg: Config) -> (SearchEngine, Arc<ScriptedReasoning>, Arc<ManualClock>) {
	let reasoning = Arc::new(ScriptedReasoning::new());
	let clock = Arc::new(ManualClock::default());
	let engine = scout_testkit::engine(
		cfg,
		reasoning.clone(),
		Arc::new(ScriptedSearch::new()),
		clock.clone(),
	);

	(engine, reasoning, clock)
}

#[tokio::test]
async fn optimize_purges_expired_decisions() {
	let (engine, reasoning, clock) = build(scout_testkit::test_config());

	reasoning.always(PromptKind::SearchDecision, Reply::text(SHORT_DECISION));
	engine.decide_search_strategy("Giá iPhone 15?", &[], &[]).await.expect("Decision failed.");
	engine.decide_search_strategy("Giá Galaxy S24?", &[], &[]).await.expect("Decision failed.");
	clock.advance(Duration::seconds(301));

	let report = engine.optimize();

	assert_eq!(report.purged_entries, 2);
	assert!(!report.counters_reset);
	assert_eq!(engine.statistics().total_decisions, 2);
}

#[tokio::test]
async fn optimize_resets_counters_past_threshold() {
	let mut cfg = scout_testkit::test_config();

	cfg.engine.stats_reset_threshold = 2;

	let (engine, reasoning, _clock) = build(cfg);

	reasoning.always(PromptKind::SearchDecision, Reply::text(SHORT_DECISION));

	for _ in 0..3 {
		engine.decide_search_strategy("Giá iPhone 15?", &[], &[]).await.expect("Decision failed.");
	}

	let report = engine.optimize();

	assert!(report.counters_reset);
	assert_eq!(report.purged_entries, 0);
	assert_eq!(engine.statistics(), EngineStatistics::default());
	assert_eq!(
		engine.cache().expect("Cache should be enabled.").len(),
		1,
		"Resetting counters keeps cached decisions."
	);
}

#[tokio::test]
async fn system_stats_report_configuration_and_uptime() {
	let (engine, reasoning, clock) = build(scout_testkit::test_config());

	reasoning.push(PromptKind::SearchDecision, Reply::text(SHORT_DECISION));
	engine.decide_search_strategy("Giá iPhone 15?", &[], &[]).await.expect("Decision failed.");
	clock.advance(Duration::seconds(42));

	let report = engine.system_stats();
	let cache = report.cache.expect("Cache stats should be present.");

	assert_eq!(report.uptime_seconds, 42);
	assert_eq!(report.reasoning_model, "test-model");
	assert!(report.fallback_enabled);
	assert!(report.search_available);
	assert_eq!(cache.size, 1);
	assert_eq!(cache.max_size, 1_000);
	assert_eq!(report.statistics.engine_decisions, 1);
}

#[tokio::test]
async fn background_optimizer_sweeps_periodically() {
	let mut cfg = scout_testkit::test_config();

	cfg.engine.optimize_interval_seconds = 1;

	let (engine, reasoning, clock) = build(cfg);
	let engine = Arc::new(engine);

	reasoning.push(PromptKind::SearchDecision, Reply::text(SHORT_DECISION));
	engine.decide_search_strategy("Giá iPhone 15?", &[], &[]).await.expect("Decision failed.");
	clock.advance(Duration::seconds(600));

	let handle = stats::spawn_optimizer(engine.clone());

	tokio::time::sleep(StdDuration::from_millis(1_500)).await;
	handle.abort();

	assert!(engine.cache().expect("Cache should be enabled.").is_empty());
}
