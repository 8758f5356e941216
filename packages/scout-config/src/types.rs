use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub engine: Engine,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Engine {
	pub cache_enabled: bool,
	pub cache_max_size: usize,
	/// Used only when a decision omits its own cache duration.
	pub default_cache_duration_seconds: i64,
	pub fallback_enabled: bool,
	pub max_queries_per_decision: u32,
	pub max_results_returned: u32,
	pub decision_timeout_ms: u64,
	/// Applied to each external search query separately.
	pub search_timeout_ms: u64,
	/// The optimizer resets engine counters once `total_decisions` passes this value.
	pub stats_reset_threshold: u64,
	pub optimize_interval_seconds: u64,
}
impl Default for Engine {
	fn default() -> Self {
		Self {
			cache_enabled: true,
			cache_max_size: 1_000,
			default_cache_duration_seconds: 3_600,
			fallback_enabled: true,
			max_queries_per_decision: 2,
			max_results_returned: 5,
			decision_timeout_ms: 15_000,
			search_timeout_ms: 10_000,
			stats_reset_threshold: 10_000,
			optimize_interval_seconds: 300,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub reasoning: ReasoningProviderConfig,
	pub search: SearchProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ReasoningProviderConfig {
	/// `false` selects the offline engine, which always defers to the rule-based fallback.
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchProviderConfig {
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub region: String,
	#[serde(default = "default_safesearch")]
	pub safesearch: String,
	pub max_results: u32,
	/// One of "d", "w", "m", "y". Blank values are normalized to `None`.
	pub time_limit: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_enabled() -> bool {
	true
}

fn default_max_tokens() -> u32 {
	800
}

fn default_safesearch() -> String {
	"moderate".to_string()
}
