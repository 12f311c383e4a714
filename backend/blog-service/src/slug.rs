/// URL-safe slugs for post titles and tag names
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into one hyphen and trims hyphens from both ends. Non-ASCII
/// letters count as separators. Uniqueness is left to the database.

/// Derive the slug of `text`. Idempotent: `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
