//! Prompt templates sent to the reasoning engine.

use serde_json::Value;

use crate::Variables;

const DECISION_SYSTEM_TEMPLATE: &str = "\
Bạn là chuyên gia chiến lược tìm kiếm cho chatbot tư vấn sản phẩm điện tử.
You decide whether a question needs a live web search in addition to the internal knowledge base.

Use WEB search when:
- the question is about prices or promotions, which change often;
- the question compares products and needs current data;
- the question is about new products, trends, or years such as 2024-2025;
- the internal retrieval results are thin or missing;
- the user wants to buy or needs market advice.

Use VECTOR only when:
- the question is about stable technical specifications;
- the retrieval results are sufficient and precise;
- the question is about features of a product already covered.

Urgency levels:
- high: prices, promotions, buying right now;
- medium: comparisons, general advice;
- low: specifications, features.

Question: {question}
Retrieval summary: {retrieval_digest}
Conversation context: {conversation_digest}

Answer with one JSON object only:
{\"should_search\": true, \"reasoning\": \"2-3 sentences\", \"confidence\": 0.0-1.0, \
\"search_type\": \"web|vector|hybrid|none\", \"expected_info_types\": [\"price\", \"specs\", \"reviews\"], \
\"urgency\": \"high|medium|low\", \"cache_duration\": 300-7200}";

const DECISION_USER_MESSAGE: &str = "Hãy quyết định chiến lược tìm kiếm cho câu hỏi này.";

const PLAN_SYSTEM_TEMPLATE: &str = "\
Bạn là chuyên gia tạo truy vấn tìm kiếm cho sản phẩm điện tử.
You write web search queries for the question below.

Rules:
1. Keep each query short, 5-12 words.
2. Name the concrete product.
3. Replace references such as \"điện thoại trên\", \"sản phẩm đó\" or \"máy này\" with the product named in the conversation.
4. Prefer Vietnamese plus the key terms.
5. Give at most two alternative queries.

Original question: {question}
Conversation context: {conversation_digest}
Information needed: {expected_info_types}

Answer with one JSON object only:
{\"primary_query\": \"main query\", \"alternative_queries\": [\"alternative 1\", \"alternative 2\"], \
\"query_reasoning\": \"why these queries\", \"estimated_cost\": 0.1-0.5}";

const PLAN_USER_MESSAGE: &str = "Tạo truy vấn tìm kiếm tối ưu cho yêu cầu này.";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PromptKind {
	SearchDecision,
	QueryPlan,
}
impl PromptKind {
	pub fn name(self) -> &'static str {
		match self {
			Self::SearchDecision => "search_decision",
			Self::QueryPlan => "query_plan",
		}
	}

	fn templates(self) -> (&'static str, &'static str) {
		match self {
			Self::SearchDecision => (DECISION_SYSTEM_TEMPLATE, DECISION_USER_MESSAGE),
			Self::QueryPlan => (PLAN_SYSTEM_TEMPLATE, PLAN_USER_MESSAGE),
		}
	}
}

pub fn decision_variables(
	question: &str,
	retrieval_digest: &str,
	conversation_digest: &str,
) -> Variables {
	Variables::from([
		("question".to_string(), question.to_string()),
		("retrieval_digest".to_string(), retrieval_digest.to_string()),
		("conversation_digest".to_string(), conversation_digest.to_string()),
	])
}

pub fn plan_variables(
	question: &str,
	conversation_digest: &str,
	expected_info_types: &[String],
) -> Variables {
	Variables::from([
		("question".to_string(), question.to_string()),
		("conversation_digest".to_string(), conversation_digest.to_string()),
		("expected_info_types".to_string(), expected_info_types.join(", ")),
	])
}

/// Chat messages for `prompt`, system template first.
pub fn render(prompt: PromptKind, variables: &Variables) -> Vec<Value> {
	let (system_template, user_message) = prompt.templates();

	vec![
		serde_json::json!({ "role": "system", "content": fill(system_template, variables) }),
		serde_json::json!({ "role": "user", "content": user_message }),
	]
}

/// Substitutes `{name}` placeholders in one pass. Unknown names and unmatched braces are kept
/// verbatim, and substituted values are never rescanned.
pub fn fill(template: &str, variables: &Variables) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);

		let tail = &rest[open..];
		let name_end = tail[1..].find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'));
		let Some(close) = name_end.map(|idx| idx + 1).filter(|idx| tail[*idx..].starts_with('}'))
		else {
			out.push('{');
			rest = &tail[1..];

			continue;
		};

		match variables.get(&tail[1..close]) {
			Some(value) if close > 1 => out.push_str(value),
			_ => out.push_str(&tail[..=close]),
		}

		rest = &tail[close + 1..];
	}

	out.push_str(rest);

	out
}
