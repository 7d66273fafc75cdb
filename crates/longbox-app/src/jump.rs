// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::model::Volume;

/// The bucket digits collapse into on the jump bar.
pub const DIGIT_BUCKET: char = '#';

/// Normalized first character of a sort key: uppercased, digits collapsed
/// into [`DIGIT_BUCKET`]. Empty strings have no bucket.
pub fn bucket_character(text: &str) -> Option<char> {
    let first = text.chars().next()?;
    if first.is_ascii_digit() {
        return Some(DIGIT_BUCKET);
    }
    first.to_uppercase().next()
}

/// Position of the first item whose title bucket equals `target`, in the
/// order given. A linear scan on purpose: custom comparators make the
/// bucket function non-monotonic, so binary search is unsound here.
pub fn index_of_first_character(items: &[Volume], target: char) -> Option<usize> {
    items
        .iter()
        .position(|item| bucket_character(&item.title) == Some(target))
}

/// Every bucket present in the collection, for rendering the jump bar.
pub fn available_buckets(items: &[Volume]) -> BTreeSet<char> {
    items
        .iter()
        .filter_map(|item| bucket_character(&item.title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{available_buckets, bucket_character, index_of_first_character};
    use crate::testutil::volume;

    #[test]
    fn buckets_uppercase_and_collapse_digits() {
        assert_eq!(bucket_character("beta"), Some('B'));
        assert_eq!(bucket_character("Zen"), Some('Z'));
        assert_eq!(bucket_character("7th Voyage"), Some('#'));
        assert_eq!(bucket_character(""), None);
    }

    #[test]
    fn locator_finds_first_match_in_current_order() {
        let items = vec![
            volume(1, "Alpha", true, 1, 0),
            volume(2, "beta", true, 1, 0),
            volume(3, "7th Voyage", true, 1, 0),
            volume(4, "Zen", true, 1, 0),
        ];

        assert_eq!(index_of_first_character(&items, 'B'), Some(1));
        assert_eq!(index_of_first_character(&items, '#'), Some(2));
        assert_eq!(index_of_first_character(&items, 'Q'), None);
    }

    #[test]
    fn locator_respects_arbitrary_order() {
        // Reverse order; the scan must return the first position in the
        // order given, not the alphabetically first item.
        let items = vec![
            volume(4, "Zen", true, 1, 0),
            volume(3, "Zodiac", true, 1, 0),
            volume(2, "beta", true, 1, 0),
        ];
        assert_eq!(index_of_first_character(&items, 'Z'), Some(0));
    }

    #[test]
    fn available_buckets_deduplicate() {
        let items = vec![
            volume(1, "Alpha", true, 1, 0),
            volume(2, "Aster", true, 1, 0),
            volume(3, "8-Bit", true, 1, 0),
        ];
        let buckets = available_buckets(&items);
        assert_eq!(buckets.into_iter().collect::<Vec<_>>(), vec!['#', 'A']);
    }

    #[test]
    fn empty_collection_has_no_buckets() {
        assert_eq!(index_of_first_character(&[], 'A'), None);
        assert!(available_buckets(&[]).is_empty());
    }
}
