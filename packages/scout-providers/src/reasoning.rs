use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{Error, Result};

/// Single-shot chat completion against an OpenAI-compatible endpoint. Returns the raw text of
/// the first choice; interpreting it is the caller's concern.
pub async fn complete(
	cfg: &scout_config::ReasoningProviderConfig,
	messages: &[Value],
) -> Result<String> {
	let client = Client::builder().build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;

	if res.status() == StatusCode::TOO_MANY_REQUESTS {
		return Err(Error::RateLimited { provider: cfg.provider_id.clone() });
	}

	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_text(&json)
}

fn parse_completion_text(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(ToString::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})
}
