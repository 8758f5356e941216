//! Deterministic collaborators for engine tests: a settable clock, a scripted reasoning engine,
//! and a scripted search provider.

use std::{
	collections::{HashMap, VecDeque},
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use serde_json::Map;
use time::OffsetDateTime;

use scout_config::{
	Config, Engine, Providers as ProviderConfigs, ReasoningProviderConfig, SearchProviderConfig,
	Service,
};
use scout_domain::SearchHit;
use scout_engine::{
	BoxFuture, Clock, Error, PromptKind, Providers, ReasoningEngine, Result, SearchEngine,
	SearchFailureKind, SearchProvider, Variables,
};

/// Clock that only moves when told to.
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
}
impl ManualClock {
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: time::Duration) {
		let mut now = lock(&self.now);

		*now += by;
	}

	pub fn set(&self, at: OffsetDateTime) {
		*lock(&self.now) = at;
	}
}
impl Default for ManualClock {
	fn default() -> Self {
		Self::new(OffsetDateTime::UNIX_EPOCH)
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*lock(&self.now)
	}
}

#[derive(Clone, Debug)]
pub enum Reply {
	Text(String),
	/// Fails with `Error::EngineUnavailable`.
	Fail(String),
	/// Never resolves. Dropping the pending call is counted by [`ScriptedReasoning::abandoned`].
	Hang,
}
impl Reply {
	pub fn text(raw: impl Into<String>) -> Self {
		Self::Text(raw.into())
	}
}

/// Reasoning engine that replays queued replies per prompt.
///
/// Queued replies are consumed first; afterwards the reply set with [`ScriptedReasoning::always`]
/// repeats. With neither, calls fail as unavailable.
#[derive(Default)]
pub struct ScriptedReasoning {
	queued: Mutex<HashMap<PromptKind, VecDeque<Reply>>>,
	repeated: Mutex<HashMap<PromptKind, Reply>>,
	calls: Mutex<Vec<(PromptKind, Variables)>>,
	abandoned: Arc<AtomicUsize>,
}
impl ScriptedReasoning {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&self, prompt: PromptKind, reply: Reply) -> &Self {
		lock(&self.queued).entry(prompt).or_default().push_back(reply);

		self
	}

	pub fn always(&self, prompt: PromptKind, reply: Reply) -> &Self {
		lock(&self.repeated).insert(prompt, reply);

		self
	}

	pub fn calls(&self) -> Vec<(PromptKind, Variables)> {
		lock(&self.calls).clone()
	}

	pub fn call_count(&self, prompt: PromptKind) -> usize {
		lock(&self.calls).iter().filter(|(kind, _)| *kind == prompt).count()
	}

	/// Hanging calls that were dropped before resolving.
	pub fn abandoned(&self) -> usize {
		self.abandoned.load(Ordering::SeqCst)
	}

	fn next_reply(&self, prompt: PromptKind) -> Option<Reply> {
		if let Some(reply) = lock(&self.queued).get_mut(&prompt).and_then(VecDeque::pop_front) {
			return Some(reply);
		}

		lock(&self.repeated).get(&prompt).cloned()
	}
}
impl ReasoningEngine for ScriptedReasoning {
	fn invoke<'a>(
		&'a self,
		_cfg: &'a ReasoningProviderConfig,
		prompt: PromptKind,
		variables: &'a Variables,
	) -> BoxFuture<'a, Result<String>> {
		lock(&self.calls).push((prompt, variables.clone()));

		let reply = self.next_reply(prompt);
		let abandoned = self.abandoned.clone();

		Box::pin(async move {
			match reply {
				Some(Reply::Text(raw)) => Ok(raw),
				Some(Reply::Fail(message)) => Err(Error::EngineUnavailable { message }),
				Some(Reply::Hang) => {
					let _guard = AbandonGuard(abandoned);

					std::future::pending::<Result<String>>().await
				},
				None => Err(Error::EngineUnavailable {
					message: format!("No scripted reply for {}.", prompt.name()),
				}),
			}
		})
	}
}

struct AbandonGuard(Arc<AtomicUsize>);
impl Drop for AbandonGuard {
	fn drop(&mut self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

#[derive(Clone, Debug)]
pub enum SearchReply {
	Hits(Vec<SearchHit>),
	Fail(SearchFailureKind),
	Hang,
}

/// Search provider answering from a per-query table. Unknown queries return no hits.
pub struct ScriptedSearch {
	available: AtomicBool,
	replies: Mutex<HashMap<String, SearchReply>>,
	calls: Mutex<Vec<String>>,
}
impl ScriptedSearch {
	pub fn new() -> Self {
		Self {
			available: AtomicBool::new(true),
			replies: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn unavailable() -> Self {
		let search = Self::new();

		search.available.store(false, Ordering::SeqCst);

		search
	}

	pub fn reply(&self, query: impl Into<String>, reply: SearchReply) -> &Self {
		lock(&self.replies).insert(query.into(), reply);

		self
	}

	pub fn calls(&self) -> Vec<String> {
		lock(&self.calls).clone()
	}
}
impl Default for ScriptedSearch {
	fn default() -> Self {
		Self::new()
	}
}
impl SearchProvider for ScriptedSearch {
	fn is_available(&self) -> bool {
		self.available.load(Ordering::SeqCst)
	}

	fn search<'a>(
		&'a self,
		_cfg: &'a SearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchHit>>> {
		lock(&self.calls).push(query.to_string());

		let reply = lock(&self.replies).get(query).cloned();

		Box::pin(async move {
			match reply {
				Some(SearchReply::Hits(hits)) => Ok(hits),
				Some(SearchReply::Fail(kind)) => Err(Error::Search {
					kind,
					message: format!("Scripted {kind} failure for {query:?}."),
				}),
				Some(SearchReply::Hang) => std::future::pending().await,
				None => Ok(Vec::new()),
			}
		})
	}
}

pub fn hit(title: &str, body: &str, url: &str) -> SearchHit {
	SearchHit { title: title.to_string(), body: body.to_string(), url: url.to_string() }
}

/// Valid configuration pointing at unroutable endpoints. Engine options take their defaults.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "debug".to_string() },
		engine: Engine::default(),
		providers: ProviderConfigs {
			reasoning: ReasoningProviderConfig {
				enabled: true,
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-model".to_string(),
				temperature: 0.1,
				max_tokens: 800,
				default_headers: Map::new(),
			},
			search: SearchProviderConfig {
				enabled: true,
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: String::new(),
				path: "/search".to_string(),
				region: "vn-vi".to_string(),
				safesearch: "moderate".to_string(),
				max_results: 5,
				time_limit: None,
				default_headers: Map::new(),
			},
		},
	}
}

/// Engine wired to the given doubles.
pub fn engine(
	cfg: Config,
	reasoning: Arc<ScriptedReasoning>,
	search: Arc<ScriptedSearch>,
	clock: Arc<ManualClock>,
) -> SearchEngine {
	SearchEngine::with_clock(cfg, Providers::new(reasoning, search), clock)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
