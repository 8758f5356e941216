use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

#[test]
fn builds_bearer_auth_header() {
	let headers =
		scout_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn blank_key_sends_no_authorization() {
	let headers =
		scout_providers::auth_headers("  ", &Map::new()).expect("Failed to build headers.");

	assert!(headers.get(AUTHORIZATION).is_none());
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let err = scout_providers::auth_headers("secret", &defaults)
		.expect_err("Expected invalid header config.");

	assert!(matches!(err, scout_providers::Error::InvalidConfig { .. }));
}

#[test]
fn parses_hits_from_array_and_results_object() {
	let array = serde_json::json!([
		{ "title": "iPhone 15", "body": "Giá mới", "href": "https://a.example/1" },
		{ "title": "No url", "body": "", "url": "  " }
	]);
	let object = serde_json::json!({
		"results": [{ "title": "Galaxy", "url": "https://b.example/2" }]
	});
	let from_array = scout_providers::search::parse_hits(array).expect("Array should parse.");
	let from_object = scout_providers::search::parse_hits(object).expect("Object should parse.");

	assert_eq!(from_array.len(), 1);
	assert_eq!(from_array[0].url, "https://a.example/1");
	assert_eq!(from_object[0].title, "Galaxy");
	assert_eq!(from_object[0].body, "");
}

#[test]
fn rejects_unexpected_search_payload() {
	let err = scout_providers::search::parse_hits(serde_json::json!("nope"))
		.expect_err("Expected invalid response.");

	assert!(matches!(err, scout_providers::Error::InvalidResponse { .. }));
	assert!(!err.is_timeout());
	assert!(!err.is_rate_limited());
}
