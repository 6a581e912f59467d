use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Slug used when a title contains no word characters at all
pub const FALLBACK_SLUG: &str = "course";

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[-\s_]+").unwrap();
}

/// Turns a human-readable title into a URL-safe slug
///
/// Lowercases, drops anything that is not a word character, whitespace or
/// hyphen, then collapses runs of whitespace, underscores and hyphens into a
/// single hyphen.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(cleaned.trim(), "-");

    joined.trim_matches('-').to_owned()
}

/// Like [`slugify`], but never returns an empty string
pub fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// Candidate slugs in the order they are tried: `base`, `base-2`, `base-3`, ...
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_owned()).chain((2u32..).map(move |n| format!("{base}-{n}")))
}

/// First candidate derived from `base` that is not already taken
pub fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    candidates(base)
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// The uniqueness scope of a course slug: the calendar month it was created in
pub fn slug_month(created: &DateTime<Utc>) -> String {
    created.format("%Y-%m").to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Django for Beginners"), "django-for-beginners");
        assert_eq!(slugify("  Rust: the Book!  "), "rust-the-book");
        assert_eq!(slugify("a -- b__c"), "a-b-c");
        assert_eq!(slugify("Основы Python"), "основы-python");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_base_slug_falls_back() {
        assert_eq!(base_slug("???"), FALLBACK_SLUG);
        assert_eq!(base_slug("Intro"), "intro");
    }

    #[test]
    fn test_unique_slug_skips_taken_candidates() {
        let mut taken = HashSet::new();
        assert_eq!(unique_slug("python", &taken), "python");

        taken.insert("python".to_owned());
        assert_eq!(unique_slug("python", &taken), "python-2");

        taken.insert("python-2".to_owned());
        taken.insert("python-3".to_owned());
        assert_eq!(unique_slug("python", &taken), "python-4");
    }

    #[test]
    fn test_slug_month() {
        let at = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 0).unwrap();
        assert_eq!(slug_month(&at), "2024-03");
    }
}
