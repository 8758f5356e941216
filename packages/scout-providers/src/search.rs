use reqwest::{Client, StatusCode};
use serde_json::Value;

use scout_domain::SearchHit;

use crate::{Error, Result};

/// Queries a JSON web-search endpoint.
///
/// The endpoint receives `q`, `region`, `safesearch`, `max_results` and, when configured,
/// `timelimit`, and answers either with an array of `{title, body, url|href}` objects or with
/// an object holding that array under `results`.
pub async fn search(cfg: &scout_config::SearchProviderConfig, query: &str) -> Result<Vec<SearchHit>> {
	let client = Client::builder().build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut params = vec![
		("q", query.to_string()),
		("region", cfg.region.clone()),
		("safesearch", cfg.safesearch.clone()),
		("max_results", cfg.max_results.to_string()),
	];

	if let Some(limit) = cfg.time_limit.as_ref() {
		params.push(("timelimit", limit.clone()));
	}

	let res = client
		.get(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.query(&params)
		.send()
		.await?;

	if res.status() == StatusCode::TOO_MANY_REQUESTS {
		return Err(Error::RateLimited { provider: cfg.provider_id.clone() });
	}

	let json: Value = res.error_for_status()?.json().await?;
	let mut hits = parse_hits(json)?;

	hits.truncate(cfg.max_results as usize);

	Ok(hits)
}

pub fn parse_hits(json: Value) -> Result<Vec<SearchHit>> {
	let items = match json {
		Value::Array(items) => items,
		Value::Object(mut map) => match map.remove("results") {
			Some(Value::Array(items)) => items,
			_ =>
				return Err(Error::InvalidResponse {
					message: "Search response is missing a results array.".to_string(),
				}),
		},
		_ =>
			return Err(Error::InvalidResponse {
				message: "Search response must be an array or an object.".to_string(),
			}),
	};
	let mut hits = Vec::with_capacity(items.len());

	for item in items {
		let hit: SearchHit = serde_json::from_value(item)?;

		if !hit.url.trim().is_empty() {
			hits.push(hit);
		}
	}

	Ok(hits)
}
