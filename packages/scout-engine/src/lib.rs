pub mod cache;
pub mod clock;
pub mod decision;
pub mod executor;
pub mod planner;
pub mod prompt;
pub mod stats;

mod error;

pub use cache::{CacheStats, DecisionCache};
pub use clock::{Clock, SystemClock};
pub use error::{Error, ParseError, Result, SearchFailureKind};
pub use executor::SearchOutcome;
pub use prompt::PromptKind;
pub use stats::{EngineStatistics, OptimizeReport, SystemStats};

use std::{
	collections::BTreeMap,
	future::Future,
	pin::Pin,
	sync::Arc,
	time::{Duration, Instant},
};

use time::OffsetDateTime;

use scout_config::{Config, ReasoningProviderConfig, SearchProviderConfig};
use scout_domain::SearchHit;
use stats::Statistics;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Named prompt variables. Ordered so rendering is deterministic.
pub type Variables = BTreeMap<String, String>;

pub trait ReasoningEngine
where
	Self: Send + Sync,
{
	fn invoke<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		prompt: PromptKind,
		variables: &'a Variables,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn is_available(&self) -> bool;

	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub reasoning: Arc<dyn ReasoningEngine>,
	pub search: Arc<dyn SearchProvider>,
}
impl Providers {
	pub fn new(reasoning: Arc<dyn ReasoningEngine>, search: Arc<dyn SearchProvider>) -> Self {
		Self { reasoning, search }
	}

	/// Live collaborators, replaced by the offline engine or the disabled provider when the
	/// matching `enabled` flag is off.
	pub fn from_config(cfg: &Config) -> Self {
		let reasoning: Arc<dyn ReasoningEngine> = if cfg.providers.reasoning.enabled {
			Arc::new(DefaultProviders)
		} else {
			Arc::new(OfflineReasoning)
		};
		let search: Arc<dyn SearchProvider> = if cfg.providers.search.enabled {
			Arc::new(DefaultProviders)
		} else {
			Arc::new(DisabledSearch)
		};

		Self { reasoning, search }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { reasoning: provider.clone(), search: provider }
	}
}

/// Reasoning engine that is never reachable. Every decision goes through the rule fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineReasoning;
impl ReasoningEngine for OfflineReasoning {
	fn invoke<'a>(
		&'a self,
		_cfg: &'a ReasoningProviderConfig,
		prompt: PromptKind,
		_variables: &'a Variables,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			Err(Error::EngineUnavailable {
				message: format!("Reasoning engine is offline; {} was not sent.", prompt.name()),
			})
		})
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledSearch;
impl SearchProvider for DisabledSearch {
	fn is_available(&self) -> bool {
		false
	}

	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		Box::pin(async move {
			Err(Error::Search {
				kind: SearchFailureKind::Failed,
				message: format!("Search provider {} is disabled.", cfg.provider_id),
			})
		})
	}
}

pub struct SearchEngine {
	pub cfg: Config,
	pub providers: Providers,
	cache: Option<DecisionCache>,
	stats: Statistics,
	clock: Arc<dyn Clock>,
	started_at: OffsetDateTime,
}
impl SearchEngine {
	pub fn new(cfg: Config) -> Self {
		let providers = Providers::from_config(&cfg);

		Self::with_providers(cfg, providers)
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self::with_clock(cfg, providers, Arc::new(SystemClock))
	}

	pub fn with_clock(cfg: Config, providers: Providers, clock: Arc<dyn Clock>) -> Self {
		let cache = cfg
			.engine
			.cache_enabled
			.then(|| DecisionCache::new(cfg.engine.cache_max_size, clock.clone()));
		let started_at = clock.now();

		Self { cfg, providers, cache, stats: Statistics::default(), clock, started_at }
	}

	/// `None` when `engine.cache_enabled` is off.
	pub fn cache(&self) -> Option<&DecisionCache> {
		self.cache.as_ref()
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}

	/// Reasoning engine call bounded by `engine.decision_timeout_ms`. A timeout drops the
	/// in-flight call and reports the engine as unavailable.
	pub(crate) async fn invoke_reasoning(
		&self,
		prompt: PromptKind,
		variables: &Variables,
	) -> Result<String> {
		let limit = Duration::from_millis(self.cfg.engine.decision_timeout_ms);
		let started = Instant::now();
		let call = self.providers.reasoning.invoke(&self.cfg.providers.reasoning, prompt, variables);

		match tokio::time::timeout(limit, call).await {
			Ok(result) => {
				tracing::debug!(
					prompt = prompt.name(),
					latency_ms = started.elapsed().as_millis() as u64,
					ok = result.is_ok(),
					"Reasoning engine call finished."
				);

				result
			},
			Err(_) => Err(Error::EngineUnavailable {
				message: format!(
					"Reasoning engine did not answer {} within {} ms.",
					prompt.name(),
					limit.as_millis()
				),
			}),
		}
	}

	/// Single search query bounded by `engine.search_timeout_ms`.
	pub(crate) async fn run_search(&self, query: &str) -> Result<Vec<SearchHit>> {
		let limit = Duration::from_millis(self.cfg.engine.search_timeout_ms);
		let call = self.providers.search.search(&self.cfg.providers.search, query);

		tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
			Err(Error::Search {
				kind: SearchFailureKind::Timeout,
				message: format!("Search query did not finish within {} ms.", limit.as_millis()),
			})
		})
	}
}

struct DefaultProviders;
impl ReasoningEngine for DefaultProviders {
	fn invoke<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		prompt: PromptKind,
		variables: &'a Variables,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			let messages = prompt::render(prompt, variables);

			scout_providers::reasoning::complete(cfg, &messages)
				.await
				.map_err(|err| Error::EngineUnavailable { message: err.to_string() })
		})
	}
}
impl SearchProvider for DefaultProviders {
	fn is_available(&self) -> bool {
		true
	}

	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		Box::pin(async move {
			scout_providers::search::search(cfg, query).await.map_err(search_failure)
		})
	}
}

fn search_failure(err: scout_providers::Error) -> Error {
	let kind = if err.is_rate_limited() {
		SearchFailureKind::RateLimited
	} else if err.is_timeout() {
		SearchFailureKind::Timeout
	} else {
		SearchFailureKind::Failed
	};

	Error::Search { kind, message: err.to_string() }
}
