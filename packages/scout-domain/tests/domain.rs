use time::OffsetDateTime;

use scout_domain::{
	ConversationTurn, DecisionSource, QueryPlan, RetrievedSnippet, SearchType, digest, fallback,
	json_block, reference,
};

fn snippets(contents: &[&str]) -> Vec<RetrievedSnippet> {
	contents.iter().map(|content| RetrievedSnippet::new(*content)).collect()
}

#[test]
fn retrieval_digest_encodes_count_length_and_entities() {
	let results = snippets(&["Xiaomi 14 battery", "Galaxy S24 camera", "OPPO Reno", "Vivo X100"]);
	let summary = digest::summarize_retrieval(&results);

	assert!(summary.starts_with("retrieval: 4 results, "), "Unexpected digest: {summary}");
	assert!(summary.ends_with("entities: galaxy, oppo, vivo"), "Unexpected digest: {summary}");
}

#[test]
fn empty_inputs_have_stable_digests() {
	assert_eq!(digest::summarize_retrieval(&[]), digest::EMPTY_RETRIEVAL);
	assert_eq!(digest::summarize_conversation(&[]), digest::EMPTY_CONVERSATION);
	assert_eq!(
		digest::summarize_conversation(&[ConversationTurn::new("   ", "only a response")]),
		digest::EMPTY_CONVERSATION
	);
}

#[test]
fn conversation_digest_truncates_messages() {
	let long = "a".repeat(250);
	let summary = digest::summarize_conversation(&[ConversationTurn::new(long, "")]);

	assert_eq!(summary.chars().count(), "Q: ".len() + digest::MESSAGE_CHAR_BUDGET);
}

#[test]
fn rule_fallback_searches_on_thin_retrieval() {
	let now = OffsetDateTime::now_utc();
	let decision = fallback::rule_decision("giá sản phẩm X hiện tại?", 0, now);

	assert!(decision.should_search);
	assert_eq!(decision.confidence, fallback::RULE_CONFIDENCE);
	assert_eq!(decision.cache_duration_seconds, fallback::RULE_CACHE_SECONDS);
	assert_eq!(decision.source, DecisionSource::RuleFallback);
	assert_eq!(decision.search_type, SearchType::Web);
}

#[test]
fn rule_fallback_skips_search_with_rich_retrieval_and_no_triggers() {
	let now = OffsetDateTime::now_utc();
	let decision = fallback::rule_decision("Pin của Galaxy S24 dung lượng bao nhiêu?", 3, now);

	assert!(!decision.should_search);
	assert_eq!(decision.search_type, SearchType::Vector);
}

#[test]
fn rule_fallback_searches_on_trigger_terms_despite_retrieval() {
	assert!(fallback::rule_should_search("So sánh iPhone 15 và Galaxy S24", 5));
	assert!(fallback::rule_should_search("What is the price of the Pixel 9?", 5));
	assert!(fallback::rule_should_search("Điện thoại tốt nhất 2025", 5));
}

#[test]
fn heuristic_decision_reads_truthy_tokens() {
	let now = OffsetDateTime::now_utc();
	let yes = fallback::heuristic_decision("I think should_search is TRUE here", now);
	let no = fallback::heuristic_decision("No lookup needed.", now);

	assert!(yes.should_search);
	assert!(!no.should_search);
	assert_eq!(yes.confidence, fallback::HEURISTIC_CONFIDENCE);
	assert!(yes.cache_duration_seconds <= 900);
	assert_ne!(yes.decision_id, no.decision_id);
}

#[test]
fn expires_at_adds_cache_duration() {
	let now = OffsetDateTime::from_unix_timestamp(1_000).expect("Valid timestamp.");
	let decision = fallback::rule_decision("q", 0, now);

	let expires_at = decision.expires_at().expect("Expiry should be representable.");

	assert_eq!(expires_at.unix_timestamp(), 1_000 + fallback::RULE_CACHE_SECONDS);
}

#[test]
fn expires_at_is_none_past_the_date_range() {
	let mut decision = fallback::rule_decision("q", 0, OffsetDateTime::UNIX_EPOCH);

	decision.cache_duration_seconds = i64::MAX;

	assert!(decision.expires_at().is_none());
}

#[test]
fn json_block_handles_fenced_replies() {
	let raw = "Sure.\n```json\n{\"should_search\": true}\n```";

	assert_eq!(json_block::extract_object(raw), Some("{\"should_search\": true}"));
}

#[test]
fn resolves_vietnamese_reference_to_latest_product() {
	let history = vec![
		ConversationTurn::new("Xiaomi 14 có tốt không?", "Xiaomi 14 rất tốt."),
		ConversationTurn::new("Còn iPhone 15 Pro thì sao?", "iPhone 15 Pro có camera tốt."),
	];
	let resolved = reference::resolve_references("Giá điện thoại trên là bao nhiêu?", &history);

	assert_eq!(resolved.as_deref(), Some("Giá iPhone 15 Pro là bao nhiêu?"));
}

#[test]
fn resolves_english_reference() {
	let history = vec![ConversationTurn::new("Is the Galaxy S24 good?", "Yes.")];
	let resolved = reference::resolve_references("How much is that phone now?", &history);

	assert_eq!(resolved.as_deref(), Some("How much is Galaxy S24 now?"));
}

#[test]
fn reference_without_product_is_unresolved() {
	let history = vec![ConversationTurn::new("hello", "hi")];

	assert!(reference::has_reference("Sản phẩm này giá bao nhiêu?"));
	assert_eq!(reference::resolve_references("Sản phẩm này giá bao nhiêu?", &history), None);
	assert_eq!(reference::resolve_references("Giá iPhone 15?", &history), None);
}

#[test]
fn plan_queries_respect_limit_and_skip_blanks() {
	let plan = QueryPlan {
		primary_query: "iphone 15 giá".to_string(),
		alternative_queries: vec!["  ".to_string(), "iphone 15 khuyến mãi".to_string()],
		reasoning: "r".to_string(),
		estimated_cost: 0.1,
		plan_id: "p".to_string(),
	};

	assert_eq!(plan.queries(2), vec!["iphone 15 giá", "iphone 15 khuyến mãi"]);
	assert_eq!(plan.queries(1), vec!["iphone 15 giá"]);
}

#[test]
fn decision_serializes_created_at_as_rfc3339() {
	let now = OffsetDateTime::from_unix_timestamp(0).expect("Valid timestamp.");
	let decision = fallback::rule_decision("q", 0, now);
	let json = serde_json::to_value(&decision).expect("Failed to encode decision.");

	assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
	assert_eq!(json["search_type"], "web");
	assert_eq!(json["source"], "rule_fallback");
}
