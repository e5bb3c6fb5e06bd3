//! Slug derivation for posts, questions, categories and tags.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^\p{L}\p{N}]+").unwrap()
});

/// Maximum slug length before any suffix is appended.
pub const MAX_SLUG_LEN: usize = 80;

/// Derive a URL-safe slug from arbitrary text.
///
/// Letters are lowercased, every run of other characters becomes a single
/// hyphen, and leading/trailing hyphens are trimmed. Unicode letters are kept.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced = NON_ALNUM.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');

    let mut slug = String::with_capacity(trimmed.len().min(MAX_SLUG_LEN));
    for c in trimmed.chars() {
        if slug.len() + c.len_utf8() > MAX_SLUG_LEN {
            break;
        }
        slug.push(c);
    }
    slug.trim_end_matches('-').to_string()
}

/// Append a suffix to a slug, e.g. when deriving a unique username.
#[must_use]
pub fn slug_with_suffix(slug: &str, suffix: &str) -> String {
    if slug.is_empty() {
        suffix.to_string()
    } else {
        format!("{slug}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Rust --- and   SQL  "), "rust-and-sql");
    }

    #[test]
    fn test_slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Café Été"), "café-été");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(200);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_slug_with_suffix() {
        assert_eq!(slug_with_suffix("post", "a1b2c3"), "post-a1b2c3");
        assert_eq!(slug_with_suffix("", "a1b2c3"), "a1b2c3");
    }
}
