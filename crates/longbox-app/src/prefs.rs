// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::model::{ColumnKey, PosterSize, ShowOptions, SortDirection, ViewKind, default_columns};

/// Client-persisted UI preferences. Every field has a total default so a
/// missing or corrupt preference file degrades to defaults instead of
/// failing startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub view: ViewKind,
    pub poster_size: PosterSize,
    pub show: ShowOptions,
    pub sort_key: ColumnKey,
    pub sort_direction: SortDirection,
    pub column_order: Vec<ColumnKey>,
    pub hidden_columns: Vec<ColumnKey>,
    pub last_scroll_offset: u32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            view: ViewKind::PosterGrid,
            poster_size: PosterSize::Medium,
            show: ShowOptions::default(),
            sort_key: ColumnKey::Title,
            sort_direction: SortDirection::Ascending,
            column_order: default_columns().iter().map(|c| c.name).collect(),
            hidden_columns: Vec::new(),
            last_scroll_offset: 0,
        }
    }
}

impl UiPreferences {
    /// Column descriptors with preference order and visibility applied.
    /// Unknown keys in the stored order are ignored; keys missing from it
    /// keep their default position at the end.
    pub fn columns(&self) -> Vec<crate::model::ColumnDescriptor> {
        let defaults = default_columns();
        let mut ordered = Vec::with_capacity(defaults.len());
        for key in &self.column_order {
            if let Some(descriptor) = defaults.iter().find(|c| c.name == *key) {
                ordered.push(*descriptor);
            }
        }
        for descriptor in &defaults {
            if !ordered.iter().any(|c| c.name == descriptor.name) {
                ordered.push(*descriptor);
            }
        }
        for descriptor in &mut ordered {
            if self.hidden_columns.contains(&descriptor.name) {
                descriptor.is_visible = false;
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::UiPreferences;
    use crate::model::{ColumnKey, default_columns};

    #[test]
    fn defaults_cover_every_column() {
        let prefs = UiPreferences::default();
        assert_eq!(prefs.columns().len(), default_columns().len());
    }

    #[test]
    fn stored_order_wins_and_unknown_keys_are_ignored() {
        let prefs = UiPreferences {
            column_order: vec![ColumnKey::Size, ColumnKey::Title],
            ..UiPreferences::default()
        };
        let columns = prefs.columns();
        assert_eq!(columns[0].name, ColumnKey::Size);
        assert_eq!(columns[1].name, ColumnKey::Title);
        assert_eq!(columns.len(), default_columns().len());
    }

    #[test]
    fn hidden_columns_lose_visibility() {
        let prefs = UiPreferences {
            hidden_columns: vec![ColumnKey::Year],
            ..UiPreferences::default()
        };
        let year = prefs
            .columns()
            .into_iter()
            .find(|c| c.name == ColumnKey::Year)
            .expect("year column exists");
        assert!(!year.is_visible);
    }
}
