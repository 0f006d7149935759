//! Public slug generation for retainer clients.
//!
//! A slug is the client's public, URL-safe lookup key: the ASCII-normalized
//! name plus a short random suffix (e.g. `acme-corp-x9z2k`). Uniqueness is
//! enforced by the database; creation retries with a fresh suffix on
//! collision, up to `SLUG_RETRY_LIMIT`.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Number of characters in the random suffix.
pub const SLUG_SUFFIX_LEN: usize = 5;

/// Maximum slug-generation attempts before creation fails with a conflict.
pub const SLUG_RETRY_LIMIT: u32 = 5;

/// Normalizes a name into a lower-case, URL-safe base slug.
///
/// Non-ASCII-alphanumeric runs collapse into single hyphens; leading and
/// trailing hyphens are stripped. An unusable name falls back to `client`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("client");
    }

    slug
}

/// Generates a candidate slug: normalized name plus a random suffix.
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}", slugify(name), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme Corp", "acme-corp")]
    #[case("  spaced   out  ", "spaced-out")]
    #[case("Ümlaut & Sons!", "mlaut-sons")]
    #[case("UPPER", "upper")]
    #[case("---", "client")]
    #[case("", "client")]
    fn test_slugify(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slugify(name), expected);
    }

    #[test]
    fn test_generated_slug_shape() {
        let slug = generate_slug("Acme Corp");
        let (base, suffix) = slug.rsplit_once('-').expect("suffix separator");
        assert_eq!(base, "acme-corp");
        assert_eq!(suffix.len(), SLUG_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generated_slugs_differ() {
        // Collisions are possible in principle, just not 20 in a row.
        let slugs: std::collections::HashSet<_> =
            (0..20).map(|_| generate_slug("acme")).collect();
        assert!(slugs.len() > 1);
    }

    #[test]
    fn test_slug_is_url_safe() {
        let slug = generate_slug("Crème Brûlée & Co.");
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }
}
