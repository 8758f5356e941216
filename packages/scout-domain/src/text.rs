use unicode_normalization::UnicodeNormalization;

/// NFC-composed, lowercased copy of `text`, so precomposed and decomposed Vietnamese diacritics
/// compare equal.
pub fn fold(text: &str) -> String {
	text.nfc().collect::<String>().to_lowercase()
}

pub fn tokens(folded: &str) -> Vec<&str> {
	folded.split(|c: char| !c.is_alphanumeric()).filter(|token| !token.is_empty()).collect()
}

/// Space-padded token stream, for whole-word phrase matching with `contains(" phrase ")`.
pub fn padded_tokens(folded: &str) -> String {
	let mut out = String::with_capacity(folded.len() + 2);

	out.push(' ');

	for token in tokens(folded) {
		out.push_str(token);
		out.push(' ');
	}

	out
}

pub fn contains_phrase(padded: &str, phrase: &str) -> bool {
	padded.contains(&format!(" {phrase} "))
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
