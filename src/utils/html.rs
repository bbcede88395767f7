// src/utils/html.rs

/// True when `input` holds HTML tags or comments.
///
/// Bare `<`, `>` and `&` in prose are not markup, so `x < y` and
/// `Tom & Jerry` pass. Question content is stored as plain text and
/// escaped by whoever renders it.
pub fn contains_markup(input: &str) -> bool {
    ammonia::is_html(input)
}
