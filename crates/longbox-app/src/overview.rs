// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{ColumnKey, ShowOptions, Volume};

/// Flat, fully-resolved projection of one volume for a grid cell. All
/// conditional logic happens here so render code only draws lines.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeOverview {
    pub id: crate::ids::VolumeId,
    pub monitored: bool,
    pub label_lines: Vec<String>,
    pub sort_line: Option<String>,
    pub progress: Option<ProgressLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLine {
    pub downloaded: i64,
    pub total: i64,
    pub fraction: f64,
    pub detailed: bool,
}

/// Whether the active sort key's value already appears among the enabled
/// label toggles. When it does not, the cell grows one line to show it.
pub fn sort_line_needed(options: &ShowOptions, sort_key: ColumnKey) -> bool {
    match sort_key {
        ColumnKey::Title => !options.show_title,
        ColumnKey::Year => !options.show_year,
        ColumnKey::Publisher => !options.show_publisher,
        ColumnKey::Folder => !options.show_folder,
        ColumnKey::Size => !options.show_size,
        ColumnKey::IssueProgress => !options.show_progress,
        ColumnKey::VolumeNumber | ColumnKey::Monitored | ColumnKey::AddedAt => true,
    }
}

pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn sort_value(volume: &Volume, sort_key: ColumnKey) -> String {
    match sort_key {
        ColumnKey::Title => volume.title.clone(),
        ColumnKey::Year => volume.year.map(|y| y.to_string()).unwrap_or_default(),
        ColumnKey::Publisher => volume.publisher.clone(),
        ColumnKey::VolumeNumber => volume
            .volume_number
            .map(|n| format!("vol {n}"))
            .unwrap_or_default(),
        ColumnKey::IssueProgress => {
            format!("{}/{}", volume.issues_downloaded, volume.issue_count)
        }
        ColumnKey::Monitored => if volume.monitored {
            "monitored"
        } else {
            "unmonitored"
        }
        .to_owned(),
        ColumnKey::Size => format_size(volume.total_size),
        ColumnKey::Folder => volume.folder.clone(),
        ColumnKey::AddedAt => volume.added_at.date().to_string(),
    }
}

impl VolumeOverview {
    pub fn project(volume: &Volume, options: &ShowOptions, sort_key: ColumnKey) -> Self {
        let mut label_lines = Vec::new();
        if options.show_title {
            label_lines.push(volume.title.clone());
        }
        if options.show_year {
            label_lines.push(volume.year.map(|y| y.to_string()).unwrap_or_default());
        }
        if options.show_publisher {
            label_lines.push(volume.publisher.clone());
        }
        if options.show_folder {
            label_lines.push(volume.folder.clone());
        }
        if options.show_size {
            label_lines.push(format_size(volume.total_size));
        }

        let sort_line = sort_line_needed(options, sort_key).then(|| sort_value(volume, sort_key));

        let progress = options.show_progress.then(|| ProgressLine {
            downloaded: volume.issues_downloaded,
            total: volume.issue_count,
            fraction: volume.progress(),
            detailed: options.detailed_progress,
        });

        Self {
            id: volume.id,
            monitored: volume.monitored,
            label_lines,
            sort_line,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{VolumeOverview, format_size, sort_line_needed};
    use crate::model::{ColumnKey, ShowOptions};
    use crate::testutil::volume;

    #[test]
    fn projection_resolves_enabled_labels_only() {
        let item = volume(1, "Saga", true, 60, 54);
        let overview =
            VolumeOverview::project(&item, &ShowOptions::default(), ColumnKey::Title);

        // Defaults: title + year labels, progress bar, no sort line.
        assert_eq!(overview.label_lines.len(), 2);
        assert_eq!(overview.label_lines[0], "Saga");
        assert_eq!(overview.sort_line, None);

        let progress = overview.progress.expect("progress enabled by default");
        assert_eq!(progress.downloaded, 54);
        assert_eq!(progress.total, 60);
        assert!(!progress.detailed);
    }

    #[test]
    fn sort_line_appears_when_value_not_shown() {
        let options = ShowOptions::default();
        assert!(!sort_line_needed(&options, ColumnKey::Title));
        assert!(sort_line_needed(&options, ColumnKey::Publisher));
        assert!(sort_line_needed(&options, ColumnKey::AddedAt));

        let item = volume(2, "Monstress", true, 45, 10);
        let overview = VolumeOverview::project(&item, &options, ColumnKey::Size);
        assert!(overview.sort_line.is_some());
    }

    #[test]
    fn size_formatting_picks_sensible_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(25_000_000), "23.8 MB");
    }
}
