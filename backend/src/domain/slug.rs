//! Slug derivation for organization names.
//!
//! Slugs are lowercase ASCII letters, digits, underscores and single hyphens,
//! with no leading or trailing separators, at most [`NAME_MAX`] characters
//! long. Collisions are resolved by appending `-2`, `-3`, and so on.

use unicode_normalization::UnicodeNormalization;

use super::organization::NAME_MAX;

/// Fallback used when a name contains no sluggable characters.
const EMPTY_SLUG_FALLBACK: &str = "organization";

/// Widest suffix [`unique_slug`] appends: a hyphen plus a `u32`.
const SUFFIX_MAX: usize = 11;

/// Derive a slug from `name`.
///
/// The name is NFKD-decomposed and non-ASCII code points are discarded, so
/// accented letters keep their base letter. Remaining characters other than
/// word characters, whitespace and hyphens are dropped; runs of whitespace
/// and hyphens collapse to one `-`.
///
/// # Examples
/// ```
/// use employee_backend::domain::slugify;
///
/// assert_eq!(slugify("Test Organization"), "test-organization");
/// assert_eq!(slugify("Test Organization(Owner)"), "test-organizationowner");
/// assert_eq!(slugify("Café Society"), "cafe-society");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.nfkd().filter(char::is_ascii) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }
    let trimmed = slug.trim_matches(|ch| ch == '-' || ch == '_');
    if trimmed.is_empty() {
        EMPTY_SLUG_FALLBACK.to_owned()
    } else {
        truncate(trimmed, NAME_MAX).to_owned()
    }
}

/// Cut `slug` to at most `width` characters without leaving a trailing `-`.
fn truncate(slug: &str, width: usize) -> &str {
    let end = slug
        .char_indices()
        .nth(width)
        .map_or(slug.len(), |(index, _)| index);
    slug[..end].trim_end_matches('-')
}

/// Pick the first slug derived from `base` not present in `taken`.
///
/// Suffixed candidates shorten `base` so they never exceed [`NAME_MAX`].
///
/// # Examples
/// ```
/// use employee_backend::domain::unique_slug;
///
/// let taken = vec!["acme".to_owned(), "acme-2".to_owned()];
/// assert_eq!(unique_slug("acme", &taken), "acme-3");
/// ```
pub fn unique_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|slug| slug == base) {
        return base.to_owned();
    }
    (2_u32..)
        .map(|n| {
            let suffix = format!("-{n}");
            let room = NAME_MAX.saturating_sub(suffix.len());
            format!("{}{suffix}", truncate(base, room))
        })
        .find(|candidate| !taken.iter().any(|slug| slug == candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// Prefix shared by `base` and every candidate [`unique_slug`] derives from it.
pub(crate) fn slug_stem(base: &str) -> &str {
    truncate(base, NAME_MAX - SUFFIX_MAX)
}

/// Return `true` when `value` is a well-formed slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}
