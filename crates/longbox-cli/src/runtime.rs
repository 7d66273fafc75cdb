// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use longbox_api::{Client, SearchResult};
use longbox_app::{
    Issue, MassEditAction, QueueItem, RootFolder, RootFolderId, UiPreferences, Volume, VolumeId,
};
use longbox_tui::InternalEvent;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{info, warn};

use crate::prefs;

/// Runtime backed by a running server over HTTP. Preferences stay
/// local; everything else round-trips through the API client.
pub struct HttpRuntime {
    client: Client,
    prefs_path: PathBuf,
}

impl HttpRuntime {
    pub fn new(client: Client, prefs_path: PathBuf) -> Self {
        Self { client, prefs_path }
    }
}

impl longbox_tui::AppRuntime for HttpRuntime {
    fn load_library(&mut self) -> Result<Vec<Volume>> {
        Ok(self.client.list_volumes()?)
    }

    fn load_root_folders(&mut self) -> Result<Vec<RootFolder>> {
        Ok(self.client.root_folders()?)
    }

    fn load_queue(&mut self) -> Result<Vec<QueueItem>> {
        Ok(self.client.queue()?)
    }

    fn load_issues(&mut self, id: VolumeId) -> Result<Vec<Issue>> {
        Ok(self.client.volume_issues(id)?)
    }

    fn update_volume(&mut self, volume: &Volume) -> Result<Volume> {
        Ok(self.client.update_volume(volume)?)
    }

    fn delete_volume(&mut self, id: VolumeId, delete_folder: bool) -> Result<()> {
        Ok(self.client.delete_volume(id, delete_folder)?)
    }

    fn search_remote(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.client.search_volumes(query)?)
    }

    fn run_task(&mut self, task: &str) -> Result<()> {
        Ok(self.client.run_command(task)?)
    }

    fn run_mass_edit(
        &mut self,
        action: MassEditAction,
        volume_ids: &[VolumeId],
        root_folder_id: Option<RootFolderId>,
    ) -> Result<()> {
        Ok(self.client.mass_edit(action, volume_ids, root_folder_id)?)
    }

    fn load_preferences(&mut self) -> UiPreferences {
        prefs::load(&self.prefs_path)
    }

    fn save_preferences(&mut self, prefs: &UiPreferences) -> Result<()> {
        prefs::save(&self.prefs_path, prefs)
    }

    fn spawn_event_listener(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            match client.event_stream() {
                Ok(stream) => {
                    for event in stream {
                        match event {
                            Ok(event) => {
                                if tx.send(InternalEvent::Push(event)).is_err() {
                                    return;
                                }
                            }
                            Err(error) => {
                                warn!(%error, "push stream ended");
                                break;
                            }
                        }
                    }
                }
                Err(error) => warn!(%error, "cannot open push stream"),
            }
            let _ = tx.send(InternalEvent::PushChannelClosed);
        });
        Ok(())
    }
}

/// Self-contained runtime for `--demo`: a deterministic in-memory
/// library, no server required. Mutations apply locally so the UI
/// feels real.
pub struct DemoRuntime {
    volumes: Vec<Volume>,
    root_folders: Vec<RootFolder>,
    queue: Vec<QueueItem>,
    prefs_path: PathBuf,
}

impl DemoRuntime {
    pub fn new(prefs_path: PathBuf) -> Self {
        Self {
            volumes: longbox_testkit::sample_volumes(48),
            root_folders: longbox_testkit::sample_root_folders(),
            queue: longbox_testkit::sample_queue(),
            prefs_path,
        }
    }
}

impl longbox_tui::AppRuntime for DemoRuntime {
    fn load_library(&mut self) -> Result<Vec<Volume>> {
        Ok(self.volumes.clone())
    }

    fn load_root_folders(&mut self) -> Result<Vec<RootFolder>> {
        Ok(self.root_folders.clone())
    }

    fn load_queue(&mut self) -> Result<Vec<QueueItem>> {
        Ok(self.queue.clone())
    }

    fn load_issues(&mut self, id: VolumeId) -> Result<Vec<Issue>> {
        Ok(self
            .volumes
            .iter()
            .find(|volume| volume.id == id)
            .map(longbox_testkit::issues_for)
            .unwrap_or_default())
    }

    fn update_volume(&mut self, volume: &Volume) -> Result<Volume> {
        if let Some(existing) = self.volumes.iter_mut().find(|v| v.id == volume.id) {
            *existing = volume.clone();
        }
        Ok(volume.clone())
    }

    fn delete_volume(&mut self, id: VolumeId, _delete_folder: bool) -> Result<()> {
        self.volumes.retain(|volume| volume.id != id);
        self.queue.retain(|item| item.volume_id != id);
        Ok(())
    }

    fn search_remote(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        let needle = query.to_lowercase();
        Ok(self
            .volumes
            .iter()
            .filter(|volume| volume.title.to_lowercase().contains(&needle))
            .map(|volume| SearchResult {
                comicvine_id: volume.id.get() + 100_000,
                title: volume.title.clone(),
                year: volume.year,
                publisher: Some(volume.publisher.clone()),
                issue_count: volume.issue_count,
            })
            .collect())
    }

    fn run_task(&mut self, task: &str) -> Result<()> {
        info!(task, "demo task requested");
        Ok(())
    }

    fn run_mass_edit(
        &mut self,
        action: MassEditAction,
        volume_ids: &[VolumeId],
        root_folder_id: Option<RootFolderId>,
    ) -> Result<()> {
        match action {
            MassEditAction::Monitor | MassEditAction::Unmonitor => {
                let monitored = action == MassEditAction::Monitor;
                for volume in &mut self.volumes {
                    if volume_ids.contains(&volume.id) {
                        volume.monitored = monitored;
                    }
                }
            }
            MassEditAction::Delete => {
                self.volumes.retain(|volume| !volume_ids.contains(&volume.id));
                self.queue.retain(|item| !volume_ids.contains(&item.volume_id));
            }
            MassEditAction::RootFolder => {
                if let Some(folder_id) = root_folder_id
                    && let Some(folder) =
                        self.root_folders.iter().find(|folder| folder.id == folder_id)
                {
                    for volume in &mut self.volumes {
                        if volume_ids.contains(&volume.id) {
                            volume.root_folder_id = folder.id;
                        }
                    }
                }
            }
            // Server-side work with nothing to simulate locally.
            MassEditAction::Update | MassEditAction::Rename | MassEditAction::Search => {}
        }
        Ok(())
    }

    fn load_preferences(&mut self) -> UiPreferences {
        prefs::load(&self.prefs_path)
    }

    fn save_preferences(&mut self, prefs: &UiPreferences) -> Result<()> {
        prefs::save(&self.prefs_path, prefs)
    }
}
