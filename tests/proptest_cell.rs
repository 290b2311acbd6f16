//! Property-based tests for disclosure and masking.
//!
//! Uses proptest to check the reveal and mask rules across many inputs.

use cypher_cell::{CellOptions, CypherCell, CypherCellError, REDACTED};
use proptest::prelude::*;

fn cell(secret: &[u8], volatile: bool) -> CypherCell {
    CypherCell::with_options(
        secret,
        CellOptions::new().volatile(volatile).lock_memory(false),
    )
}

proptest! {
    /// Property: non-volatile reveal returns the decoded text, every time.
    #[test]
    fn prop_reveal_is_repeatable(secret in ".*") {
        let c = cell(secret.as_bytes(), false);
        prop_assert_eq!(c.reveal().unwrap(), secret.clone());
        prop_assert_eq!(c.reveal().unwrap(), secret);
    }

    /// Property: a volatile cell discloses exactly once.
    #[test]
    fn prop_volatile_reveals_once(secret in ".*") {
        let c = cell(secret.as_bytes(), true);
        prop_assert_eq!(c.reveal().unwrap(), secret);
        prop_assert!(matches!(c.reveal(), Err(CypherCellError::EmptyCell)));
    }

    /// Property: masking keeps the last `n` chars and hides the rest.
    #[test]
    fn prop_mask_shape(secret in "\\PC{0,40}", n in 0usize..50) {
        let c = cell(secret.as_bytes(), false);
        let masked = c.reveal_masked(n).unwrap();

        let chars: Vec<char> = secret.chars().collect();
        let len = chars.len();
        if n >= len {
            prop_assert_eq!(masked, secret);
        } else {
            let expected: String = std::iter::repeat('*')
                .take(len - n)
                .chain(chars[len - n..].iter().copied())
                .collect();
            prop_assert_eq!(masked, expected);
        }
    }

    /// Property: the string forms never depend on the contents.
    #[test]
    fn prop_redacted_display(secret in proptest::collection::vec(any::<u8>(), 0..64)) {
        let c = cell(&secret, false);
        prop_assert_eq!(format!("{c}"), REDACTED);
        prop_assert_eq!(format!("{c:?}"), REDACTED);
        c.dispose();
        prop_assert_eq!(format!("{c:?}"), REDACTED);
    }

    /// Property: raw bytes survive unchanged, valid UTF-8 or not.
    #[test]
    fn prop_reveal_bytes_roundtrip(secret in proptest::collection::vec(any::<u8>(), 0..64)) {
        let c = cell(&secret, false);
        let raw = c.reveal_bytes().unwrap();
        prop_assert_eq!(raw.as_slice(), secret.as_slice());
        prop_assert!(c.verify(&secret).unwrap());
    }
}
