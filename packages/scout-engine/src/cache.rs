use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
};

use serde::Serialize;
use time::OffsetDateTime;

use scout_domain::SearchDecision;

use crate::clock::Clock;

pub const DEFAULT_MAX_SIZE: usize = 1_000;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub hit_rate: f64,
	pub size: usize,
	pub max_size: usize,
}

/// Bounded decision store with per-entry expiry.
///
/// When full, the entry that expires soonest is evicted, so volatile short-TTL decisions go
/// before stable ones. Entries sharing an expiry are evicted in insertion order.
pub struct DecisionCache {
	max_size: usize,
	clock: Arc<dyn Clock>,
	state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
	entries: HashMap<String, CacheEntry>,
	hits: u64,
	misses: u64,
	next_seq: u64,
}

struct CacheEntry {
	decision: SearchDecision,
	expires_at: OffsetDateTime,
	seq: u64,
}

impl DecisionCache {
	pub fn new(max_size: usize, clock: Arc<dyn Clock>) -> Self {
		Self { max_size: max_size.max(1), clock, state: Mutex::new(CacheState::default()) }
	}

	pub fn get(
		&self,
		question: &str,
		retrieval_digest: &str,
		conversation_digest: &str,
	) -> Option<SearchDecision> {
		let key = cache_key(question, retrieval_digest, conversation_digest);
		let now = self.clock.now();
		let mut state = self.lock();
		let cached =
			state.entries.get(&key).map(|entry| (entry.expires_at, entry.decision.clone()));

		match cached {
			Some((expires_at, decision)) if now < expires_at => {
				state.hits += 1;

				tracing::debug!(
					cache_key_prefix = cache_key_prefix(&key),
					decision_id = %decision.decision_id,
					hit = true,
					"Decision cache hit."
				);

				return Some(decision);
			},
			Some(_) => {
				state.entries.remove(&key);

				tracing::debug!(
					cache_key_prefix = cache_key_prefix(&key),
					"Decision cache entry expired."
				);
			},
			None => {},
		}

		state.misses += 1;

		None
	}

	pub fn set(
		&self,
		question: &str,
		retrieval_digest: &str,
		conversation_digest: &str,
		decision: &SearchDecision,
	) {
		if decision.cache_duration_seconds <= 0 {
			tracing::warn!(
				decision_id = %decision.decision_id,
				cache_duration_seconds = decision.cache_duration_seconds,
				"Decision with a non-positive cache duration was not cached."
			);

			return;
		}

		let key = cache_key(question, retrieval_digest, conversation_digest);
		let Some(expires_at) =
			self.clock.now().checked_add(time::Duration::seconds(decision.cache_duration_seconds))
		else {
			tracing::warn!(
				decision_id = %decision.decision_id,
				cache_duration_seconds = decision.cache_duration_seconds,
				"Decision expiry is out of range. Decision was not cached."
			);

			return;
		};
		let mut state = self.lock();

		if !state.entries.contains_key(&key) {
			while state.entries.len() >= self.max_size {
				let Some(victim) = soonest_expiring(&state.entries) else {
					break;
				};

				state.entries.remove(&victim);

				tracing::debug!(
					cache_key_prefix = cache_key_prefix(&victim),
					"Decision cache entry evicted."
				);
			}
		}

		let seq = state.next_seq;

		state.next_seq += 1;
		state.entries.insert(key, CacheEntry { decision: decision.clone(), expires_at, seq });
	}

	/// Looks up an entry without touching hit or miss counters or removing expired entries.
	pub fn peek(
		&self,
		question: &str,
		retrieval_digest: &str,
		conversation_digest: &str,
	) -> Option<SearchDecision> {
		let key = cache_key(question, retrieval_digest, conversation_digest);

		self.lock().entries.get(&key).map(|entry| entry.decision.clone())
	}

	pub fn stats(&self) -> CacheStats {
		let state = self.lock();
		let lookups = state.hits + state.misses;

		CacheStats {
			hits: state.hits,
			misses: state.misses,
			hit_rate: state.hits as f64 / lookups.max(1) as f64,
			size: state.entries.len(),
			max_size: self.max_size,
		}
	}

	pub fn clear(&self) {
		let mut state = self.lock();

		state.entries.clear();
		state.hits = 0;
		state.misses = 0;
	}

	/// Zeroes hit and miss counters, keeping entries.
	pub fn reset_counters(&self) {
		let mut state = self.lock();

		state.hits = 0;
		state.misses = 0;
	}

	/// Drops every expired entry and returns how many were removed.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut state = self.lock();
		let before = state.entries.len();

		state.entries.retain(|_, entry| now < entry.expires_at);

		before - state.entries.len()
	}

	pub fn len(&self) -> usize {
		self.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn max_size(&self) -> usize {
		self.max_size
	}

	fn lock(&self) -> MutexGuard<'_, CacheState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

pub fn cache_key(question: &str, retrieval_digest: &str, conversation_digest: &str) -> String {
	let combined = format!("{question}||{retrieval_digest}||{conversation_digest}");

	blake3::hash(combined.as_bytes()).to_hex().to_string()
}

pub fn cache_key_prefix(key: &str) -> &str {
	let len = key.len().min(12);

	&key[..len]
}

fn soonest_expiring(entries: &HashMap<String, CacheEntry>) -> Option<String> {
	entries
		.iter()
		.min_by_key(|(_, entry)| (entry.expires_at, entry.seq))
		.map(|(key, _)| key.clone())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cache_key_is_deterministic_and_separates_parts() {
		assert_eq!(cache_key("q", "r", "c"), cache_key("q", "r", "c"));
		assert_ne!(cache_key("q", "r", "c"), cache_key("q", "rc", ""));
		assert_eq!(cache_key("q", "r", "c").len(), 64);
	}

	#[test]
	fn cache_key_prefix_is_stable() {
		assert_eq!(cache_key_prefix("abcd1234efgh5678"), "abcd1234efgh");
		assert_eq!(cache_key_prefix("short"), "short");
	}
}
