//! Key comparators.
//!
//! The default ordering is plain lexicographic byte comparison. `REVERSEKEY`
//! databases compare keys right-to-left instead, which is also the trick used
//! to order fixed-width little-endian integer keys correctly (`INTEGERKEY`) —
//! but only on little-endian hosts, since the byte-reversal makes the most
//! significant byte the last one compared.

use std::cmp::Ordering;

/// A key comparator usable by a database.
pub trait Comparator: Send + Sync + 'static {
    /// Compare two keys and return their ordering.
    fn compare(a: &[u8], b: &[u8]) -> Ordering;

    /// Name for this comparator, used in diagnostics.
    fn name() -> &'static str;
}

/// Default byte-wise lexicographic comparator.
pub struct LexicographicComparator;

impl Comparator for LexicographicComparator {
    #[inline(always)]
    fn compare(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn name() -> &'static str {
        "lexicographic"
    }
}

/// Right-to-left byte comparator used by `REVERSEKEY` databases.
///
/// On little-endian hosts this also yields the correct ordering for
/// fixed-width little-endian integer keys (`INTEGERKEY`), since comparing
/// bytes from the end starts with the integer's most significant byte.
pub struct ReverseKeyComparator;

impl Comparator for ReverseKeyComparator {
    fn compare(a: &[u8], b: &[u8]) -> Ordering {
        for (x, y) in a.iter().rev().zip(b.iter().rev()) {
            match x.cmp(y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        a.len().cmp(&b.len())
    }

    fn name() -> &'static str {
        "reverse-key"
    }
}

/// Returns true if this host's native integer representation makes the
/// `INTEGERKEY`-as-`REVERSEKEY` trick valid.
pub const fn integerkey_via_reverse_is_valid() -> bool {
    cfg!(target_endian = "little")
}

/// Compares two keys under the comparator selected by a database's flags.
pub fn compare_for_flags(flags: crate::db::DatabaseFlags, a: &[u8], b: &[u8]) -> Ordering {
    use crate::db::DatabaseFlags;
    if flags.contains(DatabaseFlags::REVERSE_KEY) || flags.contains(DatabaseFlags::INTEGER_KEY) {
        ReverseKeyComparator::compare(a, b)
    } else {
        LexicographicComparator::compare(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_orders_bytes_left_to_right() {
        assert_eq!(LexicographicComparator::compare(b"abc", b"abd"), Ordering::Less);
        assert_eq!(LexicographicComparator::compare(b"abc", b"ab"), Ordering::Greater);
        assert_eq!(LexicographicComparator::compare(b"abc", b"abc"), Ordering::Equal);
    }

    #[test]
    fn reverse_key_orders_bytes_right_to_left() {
        // Equal last bytes, differ earlier: lexicographic would say Less, reverse says Equal-until-tiebreak.
        assert_eq!(ReverseKeyComparator::compare(&[1, 2, 9], &[5, 2, 9]), Ordering::Less);
        assert_eq!(ReverseKeyComparator::compare(&[1, 2, 9], &[1, 2, 1]), Ordering::Greater);
    }

    #[test]
    fn reverse_key_sorts_little_endian_integers_numerically() {
        let mut keys: Vec<u32> = vec![300, 1, 65536, 2];
        keys.sort_by(|a, b| ReverseKeyComparator::compare(&a.to_le_bytes(), &b.to_le_bytes()));
        assert_eq!(keys, vec![1, 2, 300, 65536]);
    }

    proptest::proptest! {
        /// Both comparators must be a strict total order: exactly one of
        /// `<`, `==`, `>` holds, and swapping the arguments reverses it.
        #[test]
        fn lexicographic_is_antisymmetric(a: Vec<u8>, b: Vec<u8>) {
            let fwd = LexicographicComparator::compare(&a, &b);
            let rev = LexicographicComparator::compare(&b, &a);
            proptest::prop_assert_eq!(fwd, rev.reverse());
        }

        #[test]
        fn reverse_key_is_antisymmetric(a: Vec<u8>, b: Vec<u8>) {
            let fwd = ReverseKeyComparator::compare(&a, &b);
            let rev = ReverseKeyComparator::compare(&b, &a);
            proptest::prop_assert_eq!(fwd, rev.reverse());
        }

        /// Equal-length keys under `ReverseKeyComparator` must match plain
        /// lexicographic comparison on the byte-reversed keys: this is the
        /// property `INTEGERKEY`-as-`REVERSEKEY` relies on.
        #[test]
        fn reverse_key_matches_lexicographic_on_reversed_bytes(
            a in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..16),
            b in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..16),
        ) {
            let ra: Vec<u8> = a.iter().rev().copied().collect();
            let rb: Vec<u8> = b.iter().rev().copied().collect();
            if a.len() == b.len() {
                proptest::prop_assert_eq!(
                    ReverseKeyComparator::compare(&a, &b),
                    LexicographicComparator::compare(&ra, &rb)
                );
            }
        }

        /// Sorting by the flag-selected comparator must agree with sorting by
        /// whichever concrete comparator those flags resolve to.
        #[test]
        fn compare_for_flags_matches_resolved_comparator(a: Vec<u8>, b: Vec<u8>, reverse in proptest::prelude::any::<bool>()) {
            let flags = if reverse {
                crate::db::DatabaseFlags::REVERSE_KEY
            } else {
                crate::db::DatabaseFlags::empty()
            };
            let expected = if reverse {
                ReverseKeyComparator::compare(&a, &b)
            } else {
                LexicographicComparator::compare(&a, &b)
            };
            proptest::prop_assert_eq!(compare_for_flags(flags, &a, &b), expected);
        }
    }
}
