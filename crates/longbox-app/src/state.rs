// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{ColumnKey, SortDirection, ViewKind};
use crate::query::FilterKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Select,
}

/// The explicit state container every view reads from. No ambient
/// singletons; the TUI is handed a mutable reference and dispatches
/// commands against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub view: ViewKind,
    pub filter: FilterKind,
    pub sort_key: ColumnKey,
    pub sort_direction: SortDirection,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Browse,
            view: ViewKind::PosterGrid,
            filter: FilterKind::All,
            sort_key: ColumnKey::Title,
            sort_direction: SortDirection::Ascending,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ToggleView,
    EnterSelectMode,
    ExitSelectMode,
    SetFilter(FilterKind),
    SetSort(ColumnKey),
    ReverseSort,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    ModeChanged(AppMode),
    FilterChanged(FilterKind),
    SortChanged(ColumnKey, SortDirection),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ToggleView => {
                self.view = match self.view {
                    ViewKind::PosterGrid => ViewKind::Table,
                    ViewKind::Table => ViewKind::PosterGrid,
                };
                vec![
                    AppEvent::ViewChanged(self.view),
                    self.set_status(self.view.as_str()),
                ]
            }
            AppCommand::EnterSelectMode => {
                self.mode = AppMode::Select;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status("select mode"),
                ]
            }
            AppCommand::ExitSelectMode => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode), self.set_status("browse")]
            }
            AppCommand::SetFilter(filter) => {
                self.filter = filter;
                vec![
                    AppEvent::FilterChanged(self.filter),
                    self.set_status(format!("filter: {}", filter.label())),
                ]
            }
            AppCommand::SetSort(key) => {
                // Re-sorting by the active key flips direction instead.
                if self.sort_key == key {
                    self.sort_direction = self.sort_direction.reversed();
                } else {
                    self.sort_key = key;
                    self.sort_direction = SortDirection::Ascending;
                }
                vec![
                    AppEvent::SortChanged(self.sort_key, self.sort_direction),
                    self.set_status(format!(
                        "sort {} {}",
                        key.label(),
                        self.sort_direction.as_str()
                    )),
                ]
            }
            AppCommand::ReverseSort => {
                self.sort_direction = self.sort_direction.reversed();
                vec![AppEvent::SortChanged(self.sort_key, self.sort_direction)]
            }
            AppCommand::SetStatus(message) => {
                vec![self.set_status(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::model::{ColumnKey, SortDirection, ViewKind};
    use crate::query::FilterKind;

    #[test]
    fn toggle_view_alternates() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::ToggleView);
        assert_eq!(state.view, ViewKind::Table);
        state.dispatch(AppCommand::ToggleView);
        assert_eq!(state.view, ViewKind::PosterGrid);
    }

    #[test]
    fn select_mode_round_trip() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::EnterSelectMode);
        assert_eq!(state.mode, AppMode::Select);
        assert_eq!(events[0], AppEvent::ModeChanged(AppMode::Select));

        state.dispatch(AppCommand::ExitSelectMode);
        assert_eq!(state.mode, AppMode::Browse);
    }

    #[test]
    fn sorting_same_key_flips_direction() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetSort(ColumnKey::Year));
        assert_eq!(state.sort_key, ColumnKey::Year);
        assert_eq!(state.sort_direction, SortDirection::Ascending);

        state.dispatch(AppCommand::SetSort(ColumnKey::Year));
        assert_eq!(state.sort_direction, SortDirection::Descending);

        state.dispatch(AppCommand::SetSort(ColumnKey::Title));
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn filter_change_updates_status() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::SetFilter(FilterKind::Monitored));
        assert_eq!(state.filter, FilterKind::Monitored);
        assert!(events.contains(&AppEvent::StatusUpdated("filter: monitored".to_owned())));
    }

    #[test]
    fn clear_status_empties_line() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("loaded".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("loaded"));

        state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
    }
}
