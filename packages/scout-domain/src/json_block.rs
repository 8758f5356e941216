/// Locates the JSON object inside a reasoning engine reply that may wrap it in prose or a code
/// fence.
///
/// A ```` ```json ```` fence wins when present; otherwise a bare ```` ``` ```` fence holding an
/// object is used, and finally the span from the first `{` to the last `}`.
pub fn extract_object(raw: &str) -> Option<&str> {
	if let Some(body) = fenced_body(raw, "```json") {
		return Some(body);
	}
	if let Some(body) = fenced_body(raw, "```")
		&& body.starts_with('{')
	{
		return Some(body);
	}

	let start = raw.find('{')?;
	let end = raw.rfind('}')?;

	if end < start {
		return None;
	}

	Some(&raw[start..=end])
}

fn fenced_body<'a>(raw: &'a str, opener: &str) -> Option<&'a str> {
	let open = raw.find(opener)? + opener.len();
	let rest = &raw[open..];
	let close = rest.find("```").unwrap_or(rest.len());
	let body = rest[..close].trim();

	if body.is_empty() { None } else { Some(body) }
}
