//! Naive resolution of demonstrative product references ("điện thoại trên", "that phone")
//! against earlier conversation turns.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::ConversationTurn;

const DEMONSTRATIVE_PATTERN: &str = r"(?i)\b(?:điện thoại|sản phẩm|máy|mẫu)\s+(?:trên|đó|này|kia)\b|\b(?:this|that|the same)\s+(?:phone|product|device|model)\b";
const PRODUCT_PATTERN: &str = r"(?i)\b(?:iphone|galaxy|samsung|xiaomi|redmi|oppo|vivo|realme)\b(?:\s+(?:galaxy|[a-z]{0,2}\d[a-z0-9+]*|pro|max|plus|ultra|mini|lite|note|fe)\b)*";

pub fn has_reference(question: &str) -> bool {
	let normalized: String = question.nfc().collect();

	Regex::new(DEMONSTRATIVE_PATTERN).map(|re| re.is_match(&normalized)).unwrap_or(false)
}

/// Most recent product name in the history, scanning turns newest first and, within a turn,
/// taking the right-most mention.
pub fn latest_product_mention(history: &[ConversationTurn]) -> Option<String> {
	let re = Regex::new(PRODUCT_PATTERN).ok()?;

	history.iter().rev().find_map(|turn| {
		let combined: String = format!("{} {}", turn.message, turn.response).nfc().collect();

		re.find_iter(&combined).last().map(|found| found.as_str().trim().to_string())
	})
}

/// Rewrites every demonstrative reference in `question` to the latest product mention.
///
/// Returns `None` when the question holds no reference or the history names no product.
pub fn resolve_references(question: &str, history: &[ConversationTurn]) -> Option<String> {
	let normalized: String = question.nfc().collect();
	let re = Regex::new(DEMONSTRATIVE_PATTERN).ok()?;

	if !re.is_match(&normalized) {
		return None;
	}

	let product = latest_product_mention(history)?;

	Some(re.replace_all(&normalized, regex::NoExpand(&product)).into_owned())
}
