//! Album name matching.
//!
//! Catalog search results rarely spell an album exactly the way the video
//! platform does ("Abbey Road (Remastered)", "Abbey Road [Deluxe Edition]").
//! Both sides are normalized and then compared in decreasing order of
//! strictness; the first tier that holds is reported as the confidence.

use std::collections::HashSet;

use super::domain::MatchConfidence;

/// Minimum shared-word ratio for a word-overlap match
pub const WORD_OVERLAP_RATIO: f64 = 0.5;

/// Normalize an album name for comparison.
///
/// Trims, drops everything from the first `(` or `[` (edition and remaster
/// suffixes), and lower-cases.
pub fn normalize_album_name(name: &str) -> String {
    let name = name.trim();
    let cut = name.find(['(', '[']).unwrap_or(name.len());
    name[..cut].trim().to_lowercase()
}

/// Score how well a catalog album title matches the album we expect.
///
/// Returns whether it is a match and the confidence tier.
pub fn match_album(candidate: &str, expected: &str) -> (bool, MatchConfidence) {
    if expected.trim().is_empty() {
        return (true, MatchConfidence::NoAlbumExpected);
    }

    let expected = normalize_album_name(expected);
    let candidate = normalize_album_name(candidate);

    if expected == candidate {
        return (true, MatchConfidence::Exact);
    }

    // An empty side would be "contained" in anything
    if !expected.is_empty()
        && !candidate.is_empty()
        && (candidate.contains(&expected) || expected.contains(&candidate))
    {
        return (true, MatchConfidence::Partial);
    }

    if word_overlap_ratio(&candidate, &expected) >= WORD_OVERLAP_RATIO {
        return (true, MatchConfidence::WordOverlap);
    }

    (false, MatchConfidence::None)
}

/// |shared words| / max(|words a|, |words b|), 0.0 when either side has no words
fn word_overlap_ratio(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let shared = words_a.intersection(&words_b).count();
    shared as f64 / words_a.len().max(words_b.len()) as f64
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Album-ish words without brackets
    fn word() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-z]{1,8}").unwrap()
    }

    fn title() -> impl Strategy<Value = String> {
        prop::collection::vec(word(), 1..5).prop_map(|w| w.join(" "))
    }

    proptest! {
        /// Containment is symmetric: whichever side is "expected", a strict
        /// substring relation yields a partial match.
        #[test]
        fn containment_is_symmetric(base in title(), extra in word()) {
            let longer = format!("{} {}", base, extra);
            prop_assert_eq!(match_album(&longer, &base), (true, MatchConfidence::Partial));
            prop_assert_eq!(match_album(&base, &longer), (true, MatchConfidence::Partial));
        }

        /// Parenthetical and bracket suffixes never affect the normalized name
        #[test]
        fn suffixes_are_stripped(base in title(), suffix in title()) {
            let normalized = normalize_album_name(&base);
            prop_assert_eq!(normalize_album_name(&format!("{} ({})", base, suffix)), normalized.clone());
            prop_assert_eq!(normalize_album_name(&format!("{} [{}]", base, suffix)), normalized);
        }

        /// A name always matches itself exactly, whatever the casing
        #[test]
        fn self_match_is_exact(base in title()) {
            prop_assert_eq!(
                match_album(&base.to_uppercase(), &base),
                (true, MatchConfidence::Exact)
            );
        }

        /// Matching is a pure function of its inputs
        #[test]
        fn match_is_deterministic(a in title(), b in title()) {
            prop_assert_eq!(match_album(&a, &b), match_album(&a, &b));
        }
    }
}
