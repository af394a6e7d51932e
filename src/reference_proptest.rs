//! Property-based tests for the reference grammar.
//!
//! These tests use proptest to generate random inputs and verify that
//! boundary and exactness invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::reference::{ReferencePattern, DEFAULT_PREFIX};
    use proptest::prelude::*;

    fn pattern() -> ReferencePattern {
        ReferencePattern::new(DEFAULT_PREFIX).unwrap()
    }

    proptest! {
        /// Property: a reference surrounded by whitespace is found with its exact parts
        #[test]
        fn reference_is_found_verbatim(
            before in "[ -~]{0,20}",
            path in "[a-z0-9][a-z0-9._-]{0,15}(/[a-z0-9._-]{1,8}){0,2}",
            revision in "[a-f0-9]{40}",
            after in "[ -~]{0,20}",
        ) {
            let reference = format!("XRPLF/actions/{}@{}", path, revision);
            let text = format!("{} {} {}", before, reference, after);
            let found: Vec<_> = pattern()
                .find_iter(&text)
                .filter(|m| m.start == before.len() + 1)
                .collect();
            prop_assert_eq!(found.len(), 1);
            prop_assert_eq!(found[0].path, path.as_str());
            prop_assert_eq!(found[0].revision, revision.as_str());
            prop_assert_eq!(found[0].text, reference.as_str());
        }

        /// Property: a hex run longer than a revision is never treated as one
        #[test]
        fn overlong_hex_never_matches(
            path in "[a-z0-9-]{1,12}",
            revision in "[a-f0-9]{41,60}",
        ) {
            let text = format!("uses: XRPLF/actions/{}@{}", path, revision);
            prop_assert_eq!(pattern().find_iter(&text).count(), 0);
        }

        /// Property: a prefix glued to a preceding word character never matches
        #[test]
        fn glued_prefix_never_matches(
            glue in "[A-Za-z0-9_./-]",
            path in "[a-z0-9-]{1,12}",
            revision in "[a-f0-9]{40}",
        ) {
            let text = format!("{}XRPLF/actions/{}@{}", glue, path, revision);
            prop_assert_eq!(pattern().find_iter(&text).count(), 0);
        }

        /// Property: text without the prefix yields no references
        #[test]
        fn unrelated_text_never_matches(text in "[^X]*") {
            prop_assert_eq!(pattern().find_iter(&text).count(), 0);
        }

        /// Property: matches are ordered and never overlap
        #[test]
        fn matches_never_overlap(
            parts in proptest::collection::vec(("[a-z0-9-]{1,8}", "[a-f0-9]{40}"), 1..6),
            sep in "[ \n,;]{1,3}",
        ) {
            let text = parts
                .iter()
                .map(|(p, r)| format!("XRPLF/actions/{}@{}", p, r))
                .collect::<Vec<_>>()
                .join(&sep);
            let matches: Vec<_> = pattern().find_iter(&text).collect();
            prop_assert_eq!(matches.len(), parts.len());
            for pair in matches.windows(2) {
                prop_assert!(pair[0].start + pair[0].text.len() <= pair[1].start);
            }
        }
    }
}
