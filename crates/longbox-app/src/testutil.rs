// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::ids::{RootFolderId, VolumeId};
use crate::model::Volume;

pub(crate) fn volume(
    id: i64,
    title: &str,
    monitored: bool,
    issue_count: i64,
    issues_downloaded: i64,
) -> Volume {
    Volume {
        id: VolumeId::new(id),
        title: title.to_owned(),
        year: Some(2000 + id as i32),
        publisher: "Image".to_owned(),
        description: String::new(),
        monitored,
        root_folder_id: RootFolderId::new(1),
        folder: format!("/comics/{}", title.to_lowercase().replace(' ', "-")),
        volume_number: Some(1),
        issue_count,
        issues_downloaded,
        total_size: issues_downloaded * 25_000_000,
        added_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}
