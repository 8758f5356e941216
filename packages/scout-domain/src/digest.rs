//! Compact, deterministic summaries of retrieval results and conversation history.
//!
//! Both digests feed the decision cache key, so equal inputs must always render identically.

use std::collections::BTreeSet;

use crate::{ConversationTurn, RetrievedSnippet, text};

/// Brand keywords recognized in retrieval snippets.
pub const ENTITY_KEYWORDS: [&str; 7] =
	["iphone", "samsung", "galaxy", "xiaomi", "oppo", "vivo", "realme"];
pub const MAX_DIGEST_ENTITIES: usize = 3;
pub const CONVERSATION_EXCHANGES: usize = 2;
pub const MESSAGE_CHAR_BUDGET: usize = 100;
pub const EMPTY_RETRIEVAL: &str = "retrieval: none";
pub const EMPTY_CONVERSATION: &str = "history: none";

pub fn summarize_retrieval(results: &[RetrievedSnippet]) -> String {
	if results.is_empty() {
		return EMPTY_RETRIEVAL.to_string();
	}

	let total_chars: usize = results.iter().map(|snippet| snippet.content.chars().count()).sum();
	let mut entities = BTreeSet::new();

	for snippet in results {
		let folded = text::fold(&snippet.content);

		for keyword in ENTITY_KEYWORDS {
			if folded.contains(keyword) {
				entities.insert(keyword);
			}
		}
	}

	let mut summary = format!("retrieval: {} results, {total_chars} chars", results.len());

	if !entities.is_empty() {
		let listed: Vec<&str> = entities.into_iter().take(MAX_DIGEST_ENTITIES).collect();

		summary.push_str(", entities: ");
		summary.push_str(&listed.join(", "));
	}

	summary
}

pub fn summarize_conversation(history: &[ConversationTurn]) -> String {
	let start = history.len().saturating_sub(CONVERSATION_EXCHANGES);
	let parts: Vec<String> = history[start..]
		.iter()
		.map(|turn| turn.message.trim())
		.filter(|message| !message.is_empty())
		.map(|message| format!("Q: {}", text::truncate_chars(message, MESSAGE_CHAR_BUDGET)))
		.collect();

	if parts.is_empty() {
		return EMPTY_CONVERSATION.to_string();
	}

	parts.join(" | ")
}
