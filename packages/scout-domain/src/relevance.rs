use crate::{SearchHit, SearchResult, text};

pub const TITLE_WEIGHT: f32 = 0.6;
pub const BODY_WEIGHT: f32 = 0.4;
pub const PRODUCT_TERM_BONUS: f32 = 0.1;
pub const MAX_PRODUCT_TERM_BONUS: f32 = 0.2;
pub const PRODUCT_TERMS: [&str; 10] = [
	"sản phẩm",
	"giá",
	"thông số",
	"đánh giá",
	"review",
	"mua",
	"bán",
	"price",
	"specs",
	"buy",
];

/// Scores a hit against the query that produced it. Always within 0.0-1.0.
pub fn score(title: &str, body: &str, query: &str) -> f32 {
	let folded_query = text::fold(query);
	let terms = text::tokens(&folded_query);

	if terms.is_empty() {
		return 0.0;
	}

	let title = text::fold(title);
	let body = text::fold(body);
	let total = terms.len() as f32;
	let title_matches = terms.iter().filter(|term| title.contains(**term)).count() as f32;
	let body_matches = terms.iter().filter(|term| body.contains(**term)).count() as f32;
	let product_matches = PRODUCT_TERMS
		.iter()
		.filter(|term| title.contains(**term) || body.contains(**term))
		.count() as f32;
	let score = title_matches / total * TITLE_WEIGHT
		+ body_matches / total * BODY_WEIGHT
		+ (product_matches * PRODUCT_TERM_BONUS).min(MAX_PRODUCT_TERM_BONUS);

	score.clamp(0.0, 1.0)
}

pub fn score_hit(hit: SearchHit, query: &str) -> SearchResult {
	let relevance_score = score(&hit.title, &hit.body, query);

	SearchResult { title: hit.title, body: hit.body, url: hit.url, relevance_score }
}
