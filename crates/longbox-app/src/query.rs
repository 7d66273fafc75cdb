// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use thiserror::Error;

use crate::model::{ColumnKey, SortDirection, Volume};

/// Sort and filter keys form a closed set driven by the column
/// descriptors; an unknown key is a programmer error, not user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewQueryError {
    #[error("invalid filter kind {0:?}")]
    InvalidFilterKind(String),
    #[error("invalid sort kind {0:?}")]
    InvalidSortKind(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    All,
    Monitored,
    Wanted,
}

impl FilterKind {
    pub const ALL: [Self; 3] = [Self::All, Self::Monitored, Self::Wanted];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Monitored => "monitored",
            Self::Wanted => "wanted",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ViewQueryError> {
        match value {
            "" => Ok(Self::All),
            "monitored" => Ok(Self::Monitored),
            "wanted" => Ok(Self::Wanted),
            other => Err(ViewQueryError::InvalidFilterKind(other.to_owned())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Monitored => "monitored",
            Self::Wanted => "wanted",
        }
    }

    fn matches(self, volume: &Volume) -> bool {
        match self {
            Self::All => true,
            Self::Monitored => volume.monitored,
            Self::Wanted => volume.is_wanted(),
        }
    }
}

pub fn sort_key_from_str(value: &str) -> Result<ColumnKey, ViewQueryError> {
    ColumnKey::parse(value).ok_or_else(|| ViewQueryError::InvalidSortKind(value.to_owned()))
}

fn compare_titles(left: &Volume, right: &Volume) -> Ordering {
    left.title
        .to_lowercase()
        .cmp(&right.title.to_lowercase())
}

/// Primary comparison for one column. Numbers compare numerically,
/// strings case-insensitively, booleans as 0/1. Issue progress sorts by
/// downloaded fraction rather than raw counts.
fn compare_by_key(left: &Volume, right: &Volume, key: ColumnKey) -> Ordering {
    match key {
        ColumnKey::Title => compare_titles(left, right),
        ColumnKey::Year => left.year.cmp(&right.year),
        ColumnKey::Publisher => left
            .publisher
            .to_lowercase()
            .cmp(&right.publisher.to_lowercase()),
        ColumnKey::VolumeNumber => left.volume_number.cmp(&right.volume_number),
        ColumnKey::IssueProgress => left.progress().total_cmp(&right.progress()),
        ColumnKey::Monitored => left.monitored.cmp(&right.monitored),
        ColumnKey::Size => left.total_size.cmp(&right.total_size),
        ColumnKey::Folder => left.folder.to_lowercase().cmp(&right.folder.to_lowercase()),
        ColumnKey::AddedAt => left.added_at.cmp(&right.added_at),
    }
}

/// Returns a new vector ordered by `key`. Ties break on title, always
/// ascending; a descending direction reverses the primary comparison
/// only, so tied items keep the same relative order either way.
pub fn sort_volumes(items: &[Volume], key: ColumnKey, direction: SortDirection) -> Vec<Volume> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|left, right| {
        let primary = match direction {
            SortDirection::Ascending => compare_by_key(left, right, key),
            SortDirection::Descending => compare_by_key(left, right, key).reverse(),
        };
        primary.then_with(|| compare_titles(left, right))
    });
    sorted
}

/// Returns the subset matching `kind` without disturbing order. The
/// empty filter returns the input unchanged.
pub fn filter_volumes(items: &[Volume], kind: FilterKind) -> Vec<Volume> {
    items
        .iter()
        .filter(|volume| kind.matches(volume))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{FilterKind, ViewQueryError, filter_volumes, sort_key_from_str, sort_volumes};
    use crate::model::{ColumnKey, SortDirection};
    use crate::testutil::volume;

    #[test]
    fn unknown_filter_kind_is_a_typed_error() {
        assert_eq!(
            FilterKind::parse("downloaded"),
            Err(ViewQueryError::InvalidFilterKind("downloaded".to_owned()))
        );
        assert_eq!(FilterKind::parse(""), Ok(FilterKind::All));
    }

    #[test]
    fn unknown_sort_kind_is_a_typed_error() {
        assert_eq!(
            sort_key_from_str("rating"),
            Err(ViewQueryError::InvalidSortKind("rating".to_owned()))
        );
        assert_eq!(sort_key_from_str("year"), Ok(ColumnKey::Year));
    }

    #[test]
    fn sort_by_title_is_case_insensitive_and_non_mutating() {
        let items = vec![
            volume(1, "zenith", true, 10, 3),
            volume(2, "Alpha", true, 10, 3),
            volume(3, "beta", false, 10, 3),
        ];
        let before = items.clone();

        let sorted = sort_volumes(&items, ColumnKey::Title, SortDirection::Ascending);
        let titles: Vec<&str> = sorted.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "zenith"]);
        assert_eq!(items, before);
    }

    #[test]
    fn sorting_is_idempotent() {
        let items = vec![
            volume(1, "Saga", true, 60, 60),
            volume(2, "Paper Girls", true, 30, 12),
            volume(3, "Monstress", false, 45, 45),
        ];
        let once = sort_volumes(&items, ColumnKey::Size, SortDirection::Descending);
        let twice = sort_volumes(&once, ColumnKey::Size, SortDirection::Descending);
        assert_eq!(once, twice);
    }

    #[test]
    fn reversing_direction_twice_restores_order() {
        let items = vec![
            volume(1, "Saga", true, 60, 60),
            volume(2, "Paper Girls", true, 30, 12),
            volume(3, "Monstress", false, 45, 45),
        ];
        let ascending = sort_volumes(&items, ColumnKey::Year, SortDirection::Ascending);
        let descending = sort_volumes(&ascending, ColumnKey::Year, SortDirection::Descending);
        let restored = sort_volumes(&descending, ColumnKey::Year, SortDirection::Ascending);
        assert_eq!(ascending, restored);
    }

    #[test]
    fn ties_break_on_title_ascending_in_both_directions() {
        let mut a = volume(1, "Beta", true, 10, 5);
        let mut b = volume(2, "Alpha", true, 10, 5);
        a.total_size = 1_000;
        b.total_size = 1_000;
        let items = vec![a, b];

        let asc = sort_volumes(&items, ColumnKey::Size, SortDirection::Ascending);
        let desc = sort_volumes(&items, ColumnKey::Size, SortDirection::Descending);
        assert_eq!(asc[0].title, "Alpha");
        assert_eq!(desc[0].title, "Alpha");
    }

    #[test]
    fn issue_progress_sorts_by_fraction_not_count() {
        // 3/10 is further along than 4/40.
        let items = vec![
            volume(1, "Low", true, 40, 4),
            volume(2, "High", true, 10, 3),
        ];
        let sorted = sort_volumes(&items, ColumnKey::IssueProgress, SortDirection::Ascending);
        assert_eq!(sorted[0].title, "Low");
        assert_eq!(sorted[1].title, "High");
    }

    #[test]
    fn empty_and_single_inputs_pass_through() {
        assert!(sort_volumes(&[], ColumnKey::Title, SortDirection::Ascending).is_empty());
        let one = vec![volume(1, "Solo", true, 1, 0)];
        assert_eq!(
            sort_volumes(&one, ColumnKey::Title, SortDirection::Descending),
            one
        );
    }

    #[test]
    fn filter_is_pure_and_idempotent() {
        let items = vec![
            volume(1, "Saga", true, 60, 60),
            volume(2, "Paper Girls", false, 30, 12),
            volume(3, "Monstress", true, 45, 40),
        ];
        let before = items.clone();

        let once = filter_volumes(&items, FilterKind::Monitored);
        let twice = filter_volumes(&once, FilterKind::Monitored);
        assert_eq!(items, before);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn empty_filter_returns_input_in_order() {
        let items = vec![
            volume(2, "Zed", false, 5, 1),
            volume(1, "Alpha", true, 5, 1),
        ];
        assert_eq!(filter_volumes(&items, FilterKind::All), items);
    }

    #[test]
    fn wanted_filter_selects_incomplete_volumes() {
        let items = vec![
            volume(1, "Done", true, 10, 10),
            volume(2, "Partial", true, 10, 4),
            volume(3, "Empty", false, 0, 0),
        ];
        let wanted = filter_volumes(&items, FilterKind::Wanted);
        assert_eq!(wanted.len(), 1);
        assert_eq!(wanted[0].title, "Partial");
    }
}
