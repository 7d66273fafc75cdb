// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use longbox_app::{
    Issue, IssueId, QueueItem, QueueItemId, QueueStatus, RootFolder, RootFolderId, Volume,
    VolumeId,
};
use time::{Month, OffsetDateTime, Time};

const SERIES_TITLES: [&str; 24] = [
    "Astro City",
    "Black Hammer",
    "Bone",
    "Chew",
    "Criminal",
    "Daredevil",
    "Descender",
    "East of West",
    "Fables",
    "Gotham Central",
    "Hellboy",
    "Invincible",
    "Lazarus",
    "Locke & Key",
    "Monstress",
    "Paper Girls",
    "Planetary",
    "Saga",
    "Southern Bastards",
    "The Wicked + The Divine",
    "Transmetropolitan",
    "Usagi Yojimbo",
    "Velvet",
    "Y: The Last Man",
];

const PUBLISHERS: [&str; 8] = [
    "Image",
    "Dark Horse",
    "Vertigo",
    "Marvel",
    "DC",
    "IDW",
    "Boom! Studios",
    "Oni Press",
];

struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Deterministic volume generator. Same seed, same library, so tests can
/// assert on exact contents.
pub struct LibraryFaker {
    rng: DeterministicRng,
}

impl LibraryFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn volume(&mut self, id: i64) -> Volume {
        let title = SERIES_TITLES[self.rng.int_n(SERIES_TITLES.len())];
        let publisher = PUBLISHERS[self.rng.int_n(PUBLISHERS.len())];
        let year = 1990 + self.rng.int_n(35) as i32;
        let issue_count = 6 + self.rng.int_n(60) as i64;
        let issues_downloaded = self.rng.int_n(issue_count as usize + 1) as i64;
        let added = midnight_utc(year, Month::March, 1 + self.rng.int_n(27) as u8);

        Volume {
            id: VolumeId::new(id),
            title: title.to_owned(),
            year: Some(year),
            publisher: publisher.to_owned(),
            description: format!("{title} ({year}), published by {publisher}."),
            monitored: self.rng.bool(),
            root_folder_id: RootFolderId::new(1),
            folder: format!("/comics/{}", title.to_lowercase().replace(' ', "-")),
            volume_number: Some(1 + self.rng.int_n(4) as i32),
            issue_count,
            issues_downloaded,
            total_size: issues_downloaded * 40_000_000,
            added_at: added,
            updated_at: added,
        }
    }

    pub fn queue_item(&mut self, id: i64, volume: &Volume) -> QueueItem {
        let statuses = [
            QueueStatus::Queued,
            QueueStatus::Downloading,
            QueueStatus::Importing,
            QueueStatus::Failed,
        ];
        QueueItem {
            id: QueueItemId::new(id),
            volume_id: volume.id,
            title: format!("{} #{:03}", volume.title, 1 + self.rng.int_n(99)),
            size: 20_000_000 + self.rng.int_n(60_000_000) as i64,
            progress: self.rng.int_n(101) as f64 / 100.0,
            status: statuses[self.rng.int_n(statuses.len())],
        }
    }
}

pub fn sample_volumes(count: usize) -> Vec<Volume> {
    let mut faker = LibraryFaker::new(42);
    (0..count)
        .map(|index| faker.volume(index as i64 + 1))
        .collect()
}

pub fn sample_root_folders() -> Vec<RootFolder> {
    vec![
        RootFolder {
            id: RootFolderId::new(1),
            path: "/comics".to_owned(),
            free_space: 250_000_000_000,
        },
        RootFolder {
            id: RootFolderId::new(2),
            path: "/archive/comics".to_owned(),
            free_space: 1_500_000_000_000,
        },
    ]
}

pub fn sample_queue() -> Vec<QueueItem> {
    let volumes = sample_volumes(4);
    let mut faker = LibraryFaker::new(7);
    volumes
        .iter()
        .enumerate()
        .map(|(index, volume)| faker.queue_item(index as i64 + 1, volume))
        .collect()
}

/// Hand-picked 12-volume library with known properties: exactly five
/// monitored volumes and two digit-led titles. Browse tests that need
/// stable filter counts and jump buckets use this instead of the faker.
pub fn scenario_volumes() -> Vec<Volume> {
    let entries: [(i64, &str, i32, &str, bool, i64, i64); 12] = [
        (1, "100 Bullets", 1999, "Vertigo", true, 100, 100),
        (2, "7th Voyage", 2008, "Oni Press", false, 12, 3),
        (3, "Alpha Flight", 1983, "Marvel", true, 130, 40),
        (4, "Black Hammer", 2016, "Dark Horse", false, 25, 25),
        (5, "Criminal", 2006, "Image", true, 40, 12),
        (6, "Daredevil", 1998, "Marvel", false, 65, 65),
        (7, "East of West", 2013, "Image", false, 45, 45),
        (8, "Fables", 2002, "Vertigo", false, 150, 150),
        (9, "Monstress", 2015, "Image", true, 45, 10),
        (10, "Paper Girls", 2015, "Image", false, 30, 30),
        (11, "Saga", 2012, "Image", true, 66, 54),
        (12, "Zenith", 1987, "IDW", false, 26, 26),
    ];

    entries
        .into_iter()
        .map(
            |(id, title, year, publisher, monitored, issue_count, issues_downloaded)| {
                let added = midnight_utc(2024, Month::January, id as u8);
                Volume {
                    id: VolumeId::new(id),
                    title: title.to_owned(),
                    year: Some(year),
                    publisher: publisher.to_owned(),
                    description: format!("{title} ({year})."),
                    monitored,
                    root_folder_id: RootFolderId::new(1),
                    folder: format!("/comics/{}", title.to_lowercase().replace(' ', "-")),
                    volume_number: Some(1),
                    issue_count,
                    issues_downloaded,
                    total_size: issues_downloaded * 40_000_000,
                    added_at: added,
                    updated_at: added,
                }
            },
        )
        .collect()
}

/// Issue list implied by a volume's counts: the first
/// `issues_downloaded` entries have a file on disk, the rest are bare
/// metadata.
pub fn issues_for(volume: &Volume) -> Vec<Issue> {
    (1..=volume.issue_count)
        .map(|number| Issue {
            id: IssueId::new(volume.id.get() * 1_000 + number),
            volume_id: volume.id,
            issue_number: number as f64,
            title: format!("{} #{number}", volume.title),
            date: Some(volume.added_at.date()),
            monitored: volume.monitored,
            files: i64::from(number <= volume.issues_downloaded),
        })
        .collect()
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = time::Date::from_calendar_date(year, month, day)
        .unwrap_or(time::Date::MIN)
        .with_time(Time::MIDNIGHT);
    date.assume_utc()
}
