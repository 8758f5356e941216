use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use scout_config::{Config, Engine};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn sample_with(section: &[&str], key: &str, value: Value) -> String {
	let mut root = sample_value();
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for name in section {
		table = table
			.get_mut(*name)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{name}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("scout_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> scout_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = scout_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Expected sample to load.");

	assert_eq!(cfg.engine.cache_max_size, 1_000);
	assert_eq!(cfg.providers.search.time_limit.as_deref(), Some("m"));
	assert!(cfg.providers.reasoning.default_headers.is_empty());
}

#[test]
fn engine_section_defaults_when_omitted() {
	let mut root = sample_value();

	root.as_table_mut().expect("Sample config must be a table.").remove("engine");

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg = load_payload(payload).expect("Expected config without [engine] to load.");
	let defaults = Engine::default();

	assert_eq!(cfg.engine.cache_max_size, 1_000);
	assert_eq!(cfg.engine.default_cache_duration_seconds, 3_600);
	assert!(cfg.engine.fallback_enabled);
	assert!(cfg.engine.cache_enabled);
	assert_eq!(cfg.engine.max_queries_per_decision, defaults.max_queries_per_decision);
	assert_eq!(cfg.engine.max_results_returned, 5);
}

#[test]
fn cache_max_size_must_be_positive() {
	let payload = sample_with(&["engine"], "cache_max_size", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected cache size validation error.");

	assert!(
		err.to_string().contains("engine.cache_max_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_cache_duration_must_be_positive() {
	let payload = sample_with(&["engine"], "default_cache_duration_seconds", Value::Integer(-5));
	let err = load_payload(payload).expect_err("Expected cache duration validation error.");

	assert!(
		err.to_string()
			.contains("engine.default_cache_duration_seconds must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn zero_timeouts_are_rejected() {
	let payload = sample_with(&["engine"], "search_timeout_ms", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("engine.search_timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn reasoning_api_key_required_when_enabled() {
	let payload =
		sample_with(&["providers", "reasoning"], "api_key", Value::String("  ".to_string()));
	let err = load_payload(payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("providers.reasoning.api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn offline_reasoning_does_not_need_api_key() {
	let mut cfg = base_config();

	cfg.providers.reasoning.enabled = false;
	cfg.providers.reasoning.api_key = String::new();

	assert!(scout_config::validate(&cfg).is_ok());
}

#[test]
fn temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.reasoning.temperature = 2.5;

	let err = scout_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string().contains("providers.reasoning.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);

	cfg.providers.reasoning.temperature = f32::NAN;

	let err = scout_config::validate(&cfg).expect_err("Expected finite temperature error.");

	assert!(err.to_string().contains("must be a finite number."), "Unexpected error: {err}");
}

#[test]
fn safesearch_must_be_known() {
	let payload =
		sample_with(&["providers", "search"], "safesearch", Value::String("strict".to_string()));
	let err = load_payload(payload).expect_err("Expected safesearch validation error.");

	assert!(
		err.to_string().contains("providers.search.safesearch must be one of on, moderate, or off."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_time_limit_is_normalized_away() {
	let payload =
		sample_with(&["providers", "search"], "time_limit", Value::String("  ".to_string()));
	let cfg = load_payload(payload).expect("Expected blank time_limit to load.");

	assert_eq!(cfg.providers.search.time_limit, None);
}

#[test]
fn unknown_time_limit_is_rejected() {
	let payload =
		sample_with(&["providers", "search"], "time_limit", Value::String("h".to_string()));
	let err = load_payload(payload).expect_err("Expected time_limit validation error.");

	assert!(
		err.to_string().contains("providers.search.time_limit must be one of d, w, m, or y."),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("scout_config_missing_file.toml");
	let err = scout_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, scout_config::Error::ReadConfig { .. }));
	assert!(err.to_string().contains("scout_config_missing_file.toml"), "Unexpected error: {err}");
}
