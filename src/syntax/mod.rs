//! Address grammar check, run before any network I/O.
//!
//! The grammar is deliberately conservative: dot-separated local segments of
//! `[A-Za-z0-9_-]`, dot-separated domain labels and a final alphabetic label of
//! two to four characters. Quoted local parts, `+` tags and longer TLDs are
//! rejected.

mod types;

pub use types::{EmailAddress, SyntaxError};

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

const ADDRESS_PATTERN: &str =
    r"^[_a-z0-9-]+(\.[_a-z0-9-]+)*@[a-z0-9-]+(\.[a-z0-9-]+)*(\.[a-z]{2,4})$";

// ASCII-only: with Unicode case folding `[a-z]` would also match the Kelvin sign.
static ADDRESS_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(ADDRESS_PATTERN)
        .case_insensitive(true)
        .unicode(false)
        .build()
        .expect("address grammar compiles")
});

/// Returns `true` when `address` matches the address grammar.
pub fn validate(address: &str) -> bool {
    ADDRESS_GRAMMAR.is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        assert!(validate("alice@example.com"));
        assert!(validate("first.last@mail.example.org"));
        assert!(validate("under_score-dash@sub-domain.example.info"));
        assert!(validate("ALICE@EXAMPLE.COM"));
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "",
            "not-an-email",
            "@example.com",
            "alice@",
            "alice@@example.com",
            "alice@example",
            ".alice@example.com",
            "alice.@example.com",
            "al..ice@example.com",
            "alice@example..com",
            "alice@example.c",
            "alice@example.museum",
            "alice@example.c0m",
            "alice+tag@example.com",
            "\"alice\"@example.com",
            "alice @example.com",
            "alice@example.com\n",
            "alice@exämple.com",
        ] {
            assert!(!validate(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn unicode_case_folding_does_not_leak_in() {
        // U+212A KELVIN SIGN folds to 'k' under Unicode rules.
        assert!(!validate("alice@example.\u{212A}r"));
    }

    proptest! {
        #[test]
        fn strings_without_at_sign_never_match(s in "[^@]*") {
            prop_assert!(!validate(&s));
        }

        #[test]
        fn generated_addresses_match(
            local in "[a-z0-9_-]{1,10}(\\.[a-z0-9_-]{1,10}){0,2}",
            label in "[a-z0-9-]{1,12}",
            tld in "[a-zA-Z]{2,4}",
        ) {
            let address = format!("{local}@{label}.{tld}");
            prop_assert!(validate(&address), "{}", address);
        }

        #[test]
        fn long_tlds_never_match(tld in "[a-z]{5,10}") {
            let address = format!("user@example.{tld}");
            prop_assert!(!validate(&address));
        }
    }
}
