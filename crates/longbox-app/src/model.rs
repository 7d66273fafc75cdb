// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: VolumeId,
    pub title: String,
    pub year: Option<i32>,
    pub publisher: String,
    pub description: String,
    pub monitored: bool,
    pub root_folder_id: RootFolderId,
    pub folder: String,
    pub volume_number: Option<i32>,
    pub issue_count: i64,
    pub issues_downloaded: i64,
    pub total_size: i64,
    pub added_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Volume {
    /// Downloaded fraction in [0, 1]; empty volumes count as complete.
    pub fn progress(&self) -> f64 {
        if self.issue_count == 0 {
            return 1.0;
        }
        self.issues_downloaded as f64 / self.issue_count as f64
    }

    pub fn is_wanted(&self) -> bool {
        self.issues_downloaded < self.issue_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub volume_id: VolumeId,
    pub issue_number: f64,
    pub title: String,
    pub date: Option<Date>,
    pub monitored: bool,
    pub files: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub id: RootFolderId,
    pub path: String,
    pub free_space: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Queued,
    Downloading,
    Importing,
    Failed,
}

impl QueueStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Importing => "importing",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "queued" => Some(Self::Queued),
            "downloading" => Some(Self::Downloading),
            "importing" => Some(Self::Importing),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub volume_id: VolumeId,
    pub title: String,
    pub size: i64,
    pub progress: f64,
    pub status: QueueStatus,
}

/// The fixed enumeration of bulk actions the mass editor can run. Push
/// events are correlated against these identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassEditAction {
    Update,
    Delete,
    Rename,
    Search,
    Monitor,
    Unmonitor,
    RootFolder,
}

impl MassEditAction {
    pub const ALL: [Self; 7] = [
        Self::Update,
        Self::Delete,
        Self::Rename,
        Self::Search,
        Self::Monitor,
        Self::Unmonitor,
        Self::RootFolder,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Rename => "rename",
            Self::Search => "search",
            Self::Monitor => "monitor",
            Self::Unmonitor => "unmonitor",
            Self::RootFolder => "root_folder",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "rename" => Some(Self::Rename),
            "search" => Some(Self::Search),
            "monitor" => Some(Self::Monitor),
            "unmonitor" => Some(Self::Unmonitor),
            "root_folder" => Some(Self::RootFolder),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Update => "update all",
            Self::Delete => "delete",
            Self::Rename => "rename",
            Self::Search => "search wanted",
            Self::Monitor => "monitor",
            Self::Unmonitor => "unmonitor",
            Self::RootFolder => "move root folder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    PosterGrid,
    Table,
}

impl ViewKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PosterGrid => "posters",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "posters" => Some(Self::PosterGrid),
            "table" => Some(Self::Table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosterSize {
    Small,
    Medium,
    Large,
}

impl PosterSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }

    /// How many extra columns the grid may squeeze in when the container
    /// width does not divide evenly. Smaller posters tolerate more
    /// narrowing, so the remainder is spread over more columns.
    pub const fn extra_column_allowance(self) -> u16 {
        match self {
            Self::Small => 3,
            Self::Medium => 2,
            Self::Large => 1,
        }
    }

    pub const fn max_column_width(self) -> u16 {
        match self {
            Self::Small => 20,
            Self::Medium => 28,
            Self::Large => 36,
        }
    }

    pub const fn poster_height(self) -> u16 {
        match self {
            Self::Small => 8,
            Self::Medium => 11,
            Self::Large => 14,
        }
    }
}

/// Per-cell display toggles. Each enabled label adds one line to the
/// composed row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowOptions {
    pub show_title: bool,
    pub show_year: bool,
    pub show_publisher: bool,
    pub show_folder: bool,
    pub show_size: bool,
    pub show_progress: bool,
    pub detailed_progress: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            show_title: true,
            show_year: true,
            show_publisher: false,
            show_folder: false,
            show_size: false,
            show_progress: true,
            detailed_progress: false,
        }
    }
}

impl ShowOptions {
    pub fn label_line_count(&self) -> u16 {
        u16::from(self.show_title)
            + u16::from(self.show_year)
            + u16::from(self.show_publisher)
            + u16::from(self.show_folder)
            + u16::from(self.show_size)
    }

    pub const fn progress_height(&self) -> u16 {
        if !self.show_progress {
            0
        } else if self.detailed_progress {
            2
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Title,
    Year,
    Publisher,
    VolumeNumber,
    IssueProgress,
    Monitored,
    Size,
    Folder,
    AddedAt,
}

impl ColumnKey {
    pub const ALL: [Self; 9] = [
        Self::Title,
        Self::Year,
        Self::Publisher,
        Self::VolumeNumber,
        Self::IssueProgress,
        Self::Monitored,
        Self::Size,
        Self::Folder,
        Self::AddedAt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Publisher => "publisher",
            Self::VolumeNumber => "volume_number",
            Self::IssueProgress => "issue_progress",
            Self::Monitored => "monitored",
            Self::Size => "size",
            Self::Folder => "folder",
            Self::AddedAt => "added_at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "year" => Some(Self::Year),
            "publisher" => Some(Self::Publisher),
            "volume_number" => Some(Self::VolumeNumber),
            "issue_progress" => Some(Self::IssueProgress),
            "monitored" => Some(Self::Monitored),
            "size" => Some(Self::Size),
            "folder" => Some(Self::Folder),
            "added_at" => Some(Self::AddedAt),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Publisher => "publisher",
            Self::VolumeNumber => "volume",
            Self::IssueProgress => "issues",
            Self::Monitored => "monitored",
            Self::Size => "size",
            Self::Folder => "folder",
            Self::AddedAt => "added",
        }
    }
}

/// Static column configuration; only visibility and order are mutated at
/// runtime, through preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: ColumnKey,
    pub is_visible: bool,
    pub is_sortable: bool,
    pub is_modifiable: bool,
}

pub fn default_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor {
            name: ColumnKey::Title,
            is_visible: true,
            is_sortable: true,
            is_modifiable: false,
        },
        ColumnDescriptor {
            name: ColumnKey::Year,
            is_visible: true,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::Publisher,
            is_visible: true,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::VolumeNumber,
            is_visible: false,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::IssueProgress,
            is_visible: true,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::Monitored,
            is_visible: true,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::Size,
            is_visible: true,
            is_sortable: true,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::Folder,
            is_visible: false,
            is_sortable: false,
            is_modifiable: true,
        },
        ColumnDescriptor {
            name: ColumnKey::AddedAt,
            is_visible: false,
            is_sortable: true,
            is_modifiable: true,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ascending" => Some(Self::Ascending),
            "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnKey, MassEditAction, PosterSize, QueueStatus, ShowOptions, SortDirection};

    #[test]
    fn mass_edit_action_round_trips() {
        for action in MassEditAction::ALL {
            assert_eq!(MassEditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(MassEditAction::parse("defrag"), None);
    }

    #[test]
    fn column_key_round_trips() {
        for key in ColumnKey::ALL {
            assert_eq!(ColumnKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ColumnKey::parse("rating"), None);
    }

    #[test]
    fn queue_status_round_trips() {
        for status in [
            QueueStatus::Queued,
            QueueStatus::Downloading,
            QueueStatus::Importing,
            QueueStatus::Failed,
        ] {
            assert_eq!(QueueStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn extra_column_allowance_shrinks_with_poster_size() {
        assert_eq!(PosterSize::Small.extra_column_allowance(), 3);
        assert_eq!(PosterSize::Medium.extra_column_allowance(), 2);
        assert_eq!(PosterSize::Large.extra_column_allowance(), 1);
    }

    #[test]
    fn label_line_count_tracks_enabled_toggles() {
        let defaults = ShowOptions::default();
        assert_eq!(defaults.label_line_count(), 2);

        let all = ShowOptions {
            show_title: true,
            show_year: true,
            show_publisher: true,
            show_folder: true,
            show_size: true,
            show_progress: true,
            detailed_progress: true,
        };
        assert_eq!(all.label_line_count(), 5);
        assert_eq!(all.progress_height(), 2);
    }

    #[test]
    fn sort_direction_reversal_is_involutive() {
        assert_eq!(
            SortDirection::Ascending.reversed().reversed(),
            SortDirection::Ascending
        );
    }
}
