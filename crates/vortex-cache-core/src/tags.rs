//! Tag helpers.

use indexmap::IndexSet;

/// Implicit tags produced by Next.js style hosts start with this prefix.
pub const DEFAULT_IMPLICIT_TAG_PREFIX: &str = "_N_T_";

/// Returns true if `tag` follows the implicit tag naming convention.
///
/// # Example
///
/// ```
/// use vortex_cache_core::tags::{DEFAULT_IMPLICIT_TAG_PREFIX, is_implicit_tag};
///
/// assert!(is_implicit_tag("_N_T_/blog", DEFAULT_IMPLICIT_TAG_PREFIX));
/// assert!(!is_implicit_tag("posts", DEFAULT_IMPLICIT_TAG_PREFIX));
/// ```
pub fn is_implicit_tag(tag: &str, prefix: &str) -> bool {
    !prefix.is_empty() && tag.starts_with(prefix)
}

/// Union of an entry's own tags and the caller's implicit tags.
///
/// Keeps first-seen order and drops duplicates.
pub fn combined_tags<'a>(entry_tags: &'a [String], implicit_tags: &'a [String]) -> Vec<&'a str> {
    entry_tags
        .iter()
        .chain(implicit_tags.iter())
        .map(String::as_str)
        .collect::<IndexSet<&str>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_combined_tags_dedupes() {
        let own = strings(&["posts", "posts", "authors"]);
        let implicit = strings(&["_N_T_/blog", "posts"]);

        assert_eq!(
            combined_tags(&own, &implicit),
            vec!["posts", "authors", "_N_T_/blog"]
        );
    }

    #[test]
    fn test_combined_tags_empty() {
        assert!(combined_tags(&[], &[]).is_empty());
    }

    #[test]
    fn test_empty_prefix_never_matches() {
        assert!(!is_implicit_tag("_N_T_/", ""));
    }
}
