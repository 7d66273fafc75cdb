// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod geometry;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use longbox_api::{PushEvent, SearchResult};
use longbox_app::{
    AppCommand, AppMode, AppState, ColumnKey, FilterKind, Issue, MassEditAction, PosterSize,
    QueueItem, RootFolder, RootFolderId, SelectionState, SortDirection, UiPreferences, ViewKind, Volume,
    VolumeId, VolumeOverview, available_buckets, bucket_character, filter_volumes, format_size,
    index_of_first_character, sort_line_needed, sort_volumes,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

use crate::geometry::{GridGeometry, RowWindow, VirtualWindow};

const SORT_MARK_ASCENDING: &str = "▲";
const SORT_MARK_DESCENDING: &str = "▼";
const SELECT_MARK_ON: &str = "[x]";
const SELECT_MARK_OFF: &str = "[ ]";
const HALF_PAGE_ROWS: isize = 5;

/// Seam between the TUI and whatever actually serves the library. The
/// HTTP client and the demo library both sit behind this.
pub trait AppRuntime {
    fn load_library(&mut self) -> Result<Vec<Volume>>;
    fn load_root_folders(&mut self) -> Result<Vec<RootFolder>>;
    fn load_queue(&mut self) -> Result<Vec<QueueItem>>;
    fn load_issues(&mut self, id: VolumeId) -> Result<Vec<Issue>>;
    fn update_volume(&mut self, volume: &Volume) -> Result<Volume>;
    fn delete_volume(&mut self, id: VolumeId, delete_folder: bool) -> Result<()>;
    fn search_remote(&mut self, query: &str) -> Result<Vec<SearchResult>>;
    fn run_task(&mut self, task: &str) -> Result<()>;
    fn run_mass_edit(
        &mut self,
        action: MassEditAction,
        volume_ids: &[VolumeId],
        root_folder_id: Option<RootFolderId>,
    ) -> Result<()>;
    fn load_preferences(&mut self) -> UiPreferences;
    fn save_preferences(&mut self, prefs: &UiPreferences) -> Result<()>;

    /// Start forwarding server push events into the internal channel.
    /// Runtimes without a push channel keep the default no-op.
    fn spawn_event_listener(&mut self, _tx: Sender<InternalEvent>) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Push(PushEvent),
    PushChannelClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BulkProgress {
    action: MassEditAction,
    current_item: i64,
    total_items: i64,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    prefs: UiPreferences,
    volumes: Vec<Volume>,
    visible: Vec<Volume>,
    root_folders: Vec<RootFolder>,
    queue: Vec<QueueItem>,
    selection: SelectionState,
    window: RowWindow,
    grid: GridGeometry,
    cursor: usize,
    pending_scroll_offset: Option<usize>,
    loaded: bool,
    help_visible: bool,
    queue_visible: bool,
    options_visible: bool,
    detail: Option<VolumeId>,
    detail_issues: Vec<Issue>,
    pending_delete: Option<VolumeId>,
    bulk_progress: Option<BulkProgress>,
    status_token: u64,
    body_width: u16,
    body_height: u16,
}

impl Default for ViewData {
    fn default() -> Self {
        let prefs = UiPreferences::default();
        Self {
            grid: GridGeometry::compute(
                80,
                prefs.poster_size,
                &prefs.show,
                sort_line_needed(&prefs.show, prefs.sort_key),
            ),
            prefs,
            volumes: Vec::new(),
            visible: Vec::new(),
            root_folders: Vec::new(),
            queue: Vec::new(),
            selection: SelectionState::default(),
            window: RowWindow::new(1),
            cursor: 0,
            pending_scroll_offset: None,
            loaded: false,
            help_visible: false,
            queue_visible: false,
            options_visible: false,
            detail: None,
            detail_issues: Vec::new(),
            pending_delete: None,
            bulk_progress: None,
            status_token: 0,
            body_width: 80,
            body_height: 24,
        }
    }
}

impl ViewData {
    fn visible_ids(&self) -> Vec<VolumeId> {
        self.visible.iter().map(|volume| volume.id).collect()
    }

    fn cursor_volume(&self) -> Option<&Volume> {
        self.visible.get(self.cursor)
    }

    fn cursor_row(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::PosterGrid => self.grid.row_of_index(self.cursor),
            ViewKind::Table => self.cursor,
        }
    }

    fn total_rows(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::PosterGrid => self.grid.row_count(self.visible.len()),
            ViewKind::Table => self.visible.len(),
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    view_data.prefs = runtime.load_preferences();
    apply_preferences(state, &mut view_data);

    let (internal_tx, internal_rx) = mpsc::channel();
    if let Err(error) = runtime.spawn_event_listener(internal_tx.clone()) {
        state.dispatch(AppCommand::SetStatus(format!("push channel: {error}")));
    }

    if let Err(error) = refresh_library(state, runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        let size = terminal.size().context("query terminal size")?;
        sync_layout(state, &mut view_data, size.width, size.height.saturating_sub(3));

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    view_data.prefs.last_scroll_offset = view_data.window.offset() as u32;
    if let Err(error) = runtime.save_preferences(&view_data.prefs) {
        result = result.and(Err(error.context("save preferences")));
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Seed state from persisted preferences. The saved scroll offset
/// cannot be applied yet: the window has no content to clamp against
/// until the first load, so it is parked until `sync_layout` sees a
/// loaded library.
fn apply_preferences(state: &mut AppState, view_data: &mut ViewData) {
    state.view = view_data.prefs.view;
    state.sort_key = view_data.prefs.sort_key;
    state.sort_direction = view_data.prefs.sort_direction;
    view_data.pending_scroll_offset = Some(view_data.prefs.last_scroll_offset as usize);
}

/// Mirror state back into the preference struct so quitting persists it.
fn sync_preferences(state: &AppState, view_data: &mut ViewData) {
    view_data.prefs.view = state.view;
    view_data.prefs.sort_key = state.sort_key;
    view_data.prefs.sort_direction = state.sort_direction;
}

fn refresh_library<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.volumes = runtime.load_library()?;
    view_data.root_folders = runtime.load_root_folders()?;
    view_data.queue = runtime.load_queue()?;
    view_data.loaded = true;
    debug!(
        volumes = view_data.volumes.len(),
        queue = view_data.queue.len(),
        "library loaded"
    );
    rebuild_visible(state, view_data);
    Ok(())
}

/// Re-derive the visible list from the full library. Selection is keyed
/// by id, so it survives re-sorting and narrowing; ids that left the
/// library entirely are dropped.
fn rebuild_visible(state: &AppState, view_data: &mut ViewData) {
    let sorted = sort_volumes(&view_data.volumes, state.sort_key, state.sort_direction);
    view_data.visible = filter_volumes(&sorted, state.filter);

    let known: Vec<VolumeId> = view_data.volumes.iter().map(|volume| volume.id).collect();
    view_data.selection.retain_known(&known);

    if view_data.cursor >= view_data.visible.len() {
        view_data.cursor = view_data.visible.len().saturating_sub(1);
    }
}

fn sync_layout(state: &AppState, view_data: &mut ViewData, body_width: u16, body_height: u16) {
    view_data.body_width = body_width;
    view_data.body_height = body_height;
    view_data.grid = GridGeometry::compute(
        body_width,
        view_data.prefs.poster_size,
        &view_data.prefs.show,
        sort_line_needed(&view_data.prefs.show, state.sort_key),
    );

    let row_height = match state.view {
        ViewKind::PosterGrid => view_data.grid.row_height,
        ViewKind::Table => 1,
    };
    trace!(
        width = body_width,
        height = body_height,
        columns = view_data.grid.column_count,
        row_height = view_data.grid.row_height,
        "grid geometry recomputed"
    );

    view_data.window.set_row_height(row_height);
    view_data
        .window
        .measure(body_height, view_data.total_rows(state.view));

    // Restore the persisted scroll position once real content exists,
    // moving the cursor onto the restored row so the follow-up
    // scroll_to does not drag the window back to the top.
    if view_data.loaded
        && let Some(saved) = view_data.pending_scroll_offset.take()
    {
        view_data.window.set_offset(saved);
        let first_in_row = match state.view {
            ViewKind::PosterGrid => {
                view_data.window.offset() * view_data.grid.column_count as usize
            }
            ViewKind::Table => view_data.window.offset(),
        };
        view_data.cursor = first_in_row.min(view_data.visible.len().saturating_sub(1));
    }

    let row = view_data.cursor_row(state.view);
    view_data.window.scroll_to(row);
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Push(push) => handle_push_event(state, runtime, view_data, tx, push),
            InternalEvent::PushChannelClosed => {
                emit_status(state, view_data, tx, "push channel closed; progress paused");
            }
        }
    }
}

fn handle_push_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: PushEvent,
) {
    match event {
        PushEvent::MassEditorStatus {
            action,
            current_item,
            total_items,
        } => {
            view_data.bulk_progress = Some(BulkProgress {
                action,
                current_item,
                total_items,
            });
            if current_item >= total_items {
                view_data.bulk_progress = None;
                let label = action.label();
                match refresh_library(state, runtime, view_data) {
                    Ok(()) => emit_status(state, view_data, tx, format!("{label} finished")),
                    Err(error) => {
                        emit_status(state, view_data, tx, format!("refresh failed: {error}"));
                    }
                }
            }
        }
        PushEvent::VolumeUpdated(_) => {
            if let Err(error) = refresh_library(state, runtime, view_data) {
                emit_status(state, view_data, tx, format!("refresh failed: {error}"));
            }
        }
        PushEvent::QueueUpdated => match runtime.load_queue() {
            Ok(queue) => view_data.queue = queue,
            Err(error) => emit_status(state, view_data, tx, format!("queue load failed: {error}")),
        },
        PushEvent::TaskFinished(task) => {
            if let Err(error) = refresh_library(state, runtime, view_data) {
                emit_status(state, view_data, tx, format!("refresh failed: {error}"));
            } else {
                emit_status(state, view_data, tx, format!("task {task} finished"));
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn move_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    if view_data.visible.is_empty() {
        return;
    }
    let last = view_data.visible.len() as isize - 1;
    let next = (view_data.cursor as isize + delta).clamp(0, last);
    view_data.cursor = next as usize;
    let row = view_data.cursor_row(state.view);
    view_data.window.scroll_to(row);
}

fn jump_to_bucket(state: &mut AppState, view_data: &mut ViewData, bucket: char) -> bool {
    match index_of_first_character(&view_data.visible, bucket) {
        Some(index) => {
            view_data.cursor = index;
            let row = view_data.cursor_row(state.view);
            view_data.window.scroll_to(row);
            true
        }
        None => false,
    }
}

fn cycle_filter(filter: FilterKind) -> FilterKind {
    match filter {
        FilterKind::All => FilterKind::Monitored,
        FilterKind::Monitored => FilterKind::Wanted,
        FilterKind::Wanted => FilterKind::All,
    }
}

fn cycle_sort_key(key: ColumnKey) -> ColumnKey {
    let position = ColumnKey::ALL
        .iter()
        .position(|candidate| *candidate == key)
        .unwrap_or(0);
    ColumnKey::ALL[(position + 1) % ColumnKey::ALL.len()]
}

fn cycle_poster_size(size: PosterSize) -> PosterSize {
    match size {
        PosterSize::Small => PosterSize::Medium,
        PosterSize::Medium => PosterSize::Large,
        PosterSize::Large => PosterSize::Small,
    }
}

fn next_root_folder(folders: &[RootFolder], current: RootFolderId) -> Option<RootFolderId> {
    folders
        .iter()
        .map(|folder| folder.id)
        .find(|id| *id != current)
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // A delete confirmation swallows everything except its own answer.
    if let Some(id) = view_data.pending_delete {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                view_data.pending_delete = None;
                run_delete(state, runtime, view_data, internal_tx, id, false);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                view_data.pending_delete = None;
                run_delete(state, runtime, view_data, internal_tx, id, true);
            }
            _ => {
                view_data.pending_delete = None;
                emit_status(state, view_data, internal_tx, "delete canceled");
            }
        }
        return false;
    }

    if view_data.options_visible {
        handle_options_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        emit_status(state, view_data, internal_tx, "help hidden");
        return false;
    }

    if view_data.detail.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            view_data.detail = None;
            view_data.detail_issues.clear();
        }
        return false;
    }

    if view_data.queue_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q')) {
            view_data.queue_visible = false;
        }
        return false;
    }

    // Select-mode action keys win over jumps, so Shift+M marks instead
    // of jumping while a selection is underway.
    if state.mode == AppMode::Select && handle_select_key(state, runtime, view_data, internal_tx, key)
    {
        return false;
    }

    // Shift+letter jumps to that bucket; a bare digit jumps to '#'.
    if let KeyCode::Char(c) = key.code {
        if c.is_ascii_uppercase() && key.modifiers.contains(KeyModifiers::SHIFT) {
            if !jump_to_bucket(state, view_data, c) {
                emit_status(state, view_data, internal_tx, format!("no titles under {c}"));
            }
            return false;
        }
        if c.is_ascii_digit() {
            if !jump_to_bucket(state, view_data, '#') {
                emit_status(state, view_data, internal_tx, "no titles under #");
            }
            return false;
        }
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        KeyCode::Char('v') => {
            state.dispatch(AppCommand::ToggleView);
            sync_preferences(state, view_data);
            view_data.window.set_offset(0);
        }
        KeyCode::Char('f') => {
            let next = cycle_filter(state.filter);
            state.dispatch(AppCommand::SetFilter(next));
            rebuild_visible(state, view_data);
        }
        KeyCode::Char('s') => {
            let next = cycle_sort_key(state.sort_key);
            state.dispatch(AppCommand::SetSort(next));
            sync_preferences(state, view_data);
            rebuild_visible(state, view_data);
        }
        KeyCode::Char('d') => {
            state.dispatch(AppCommand::ReverseSort);
            sync_preferences(state, view_data);
            rebuild_visible(state, view_data);
        }
        KeyCode::Char('z') => {
            view_data.prefs.poster_size = cycle_poster_size(view_data.prefs.poster_size);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("posters: {}", view_data.prefs.poster_size.as_str()),
            );
        }
        KeyCode::Char('o') => {
            view_data.options_visible = true;
        }
        KeyCode::Char('m') => {
            state.dispatch(AppCommand::EnterSelectMode);
        }
        KeyCode::Esc => {
            if state.mode == AppMode::Select {
                state.dispatch(AppCommand::ExitSelectMode);
            }
        }
        KeyCode::Char('r') => match refresh_library(state, runtime, view_data) {
            Ok(()) => emit_status(state, view_data, internal_tx, "library refreshed"),
            Err(error) => {
                emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
            }
        },
        KeyCode::Char('t') => match runtime.run_task("refresh_all") {
            Ok(()) => emit_status(state, view_data, internal_tx, "refresh task queued"),
            Err(error) => {
                emit_status(state, view_data, internal_tx, format!("task failed: {error}"));
            }
        },
        KeyCode::Char('u') => toggle_monitored(state, runtime, view_data, internal_tx),
        KeyCode::Char('/') => search_for_cursor(state, runtime, view_data, internal_tx),
        KeyCode::Char('x') => {
            if let Some(volume) = view_data.cursor_volume() {
                view_data.pending_delete = Some(volume.id);
            }
        }
        KeyCode::Enter => {
            let target = view_data.cursor_volume().map(|volume| volume.id);
            if let Some(id) = target {
                view_data.detail = Some(id);
                view_data.detail_issues = match runtime.load_issues(id) {
                    Ok(issues) => issues,
                    Err(error) => {
                        emit_status(
                            state,
                            view_data,
                            internal_tx,
                            format!("issue load failed: {error}"),
                        );
                        Vec::new()
                    }
                };
            }
        }
        KeyCode::Char('w') => {
            view_data.queue_visible = true;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let delta = match state.view {
                ViewKind::PosterGrid => view_data.grid.column_count as isize,
                ViewKind::Table => 1,
            };
            move_cursor(state, view_data, delta);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let delta = match state.view {
                ViewKind::PosterGrid => -(view_data.grid.column_count as isize),
                ViewKind::Table => -1,
            };
            move_cursor(state, view_data, delta);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if state.view == ViewKind::PosterGrid {
                move_cursor(state, view_data, -1);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if state.view == ViewKind::PosterGrid {
                move_cursor(state, view_data, 1);
            }
        }
        KeyCode::PageDown => {
            let per_row = match state.view {
                ViewKind::PosterGrid => view_data.grid.column_count as isize,
                ViewKind::Table => 1,
            };
            move_cursor(state, view_data, per_row * HALF_PAGE_ROWS);
        }
        KeyCode::PageUp => {
            let per_row = match state.view {
                ViewKind::PosterGrid => view_data.grid.column_count as isize,
                ViewKind::Table => 1,
            };
            move_cursor(state, view_data, -per_row * HALF_PAGE_ROWS);
        }
        KeyCode::Home | KeyCode::Char('g') => {
            view_data.cursor = 0;
            view_data.window.set_offset(0);
        }
        KeyCode::End => {
            if !view_data.visible.is_empty() {
                view_data.cursor = view_data.visible.len() - 1;
                let row = view_data.cursor_row(state.view);
                view_data.window.scroll_to(row);
            }
        }
        _ => {}
    }

    false
}

/// Keys that only mean something in select mode. Returns true when the
/// key was consumed.
fn handle_select_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let order = view_data.visible_ids();
    match key.code {
        KeyCode::Char(' ') => {
            if let Some(volume) = view_data.cursor_volume() {
                let id = volume.id;
                let selected = !view_data.selection.is_selected(id);
                view_data.selection.toggle(&order, id, selected, false);
            }
            true
        }
        // 'c' extends from the last toggle, like shift-click in a list.
        KeyCode::Char('c') => {
            if let Some(volume) = view_data.cursor_volume() {
                let id = volume.id;
                let selected = view_data
                    .selection
                    .last_toggled()
                    .map(|anchor| view_data.selection.is_selected(anchor))
                    .unwrap_or(true);
                view_data.selection.toggle(&order, id, selected, true);
            }
            true
        }
        KeyCode::Char('a') => {
            if view_data.selection.all_selected(&order) {
                view_data.selection.unselect_all(&order);
            } else {
                view_data.selection.select_all(&order);
            }
            true
        }
        KeyCode::Char('M') => {
            run_mass_edit(state, runtime, view_data, internal_tx, MassEditAction::Monitor, None);
            true
        }
        KeyCode::Char('U') => {
            run_mass_edit(
                state,
                runtime,
                view_data,
                internal_tx,
                MassEditAction::Unmonitor,
                None,
            );
            true
        }
        KeyCode::Char('S') => {
            run_mass_edit(state, runtime, view_data, internal_tx, MassEditAction::Search, None);
            true
        }
        KeyCode::Char('E') => {
            run_mass_edit(state, runtime, view_data, internal_tx, MassEditAction::Update, None);
            true
        }
        KeyCode::Char('R') => {
            run_mass_edit(state, runtime, view_data, internal_tx, MassEditAction::Rename, None);
            true
        }
        KeyCode::Char('D') => {
            run_mass_edit(state, runtime, view_data, internal_tx, MassEditAction::Delete, None);
            true
        }
        KeyCode::Char('F') => {
            let target = view_data
                .cursor_volume()
                .and_then(|volume| next_root_folder(&view_data.root_folders, volume.root_folder_id));
            match target {
                Some(folder) => {
                    run_mass_edit(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        MassEditAction::RootFolder,
                        Some(folder),
                    );
                }
                None => emit_status(state, view_data, internal_tx, "no other root folder"),
            }
            true
        }
        _ => false,
    }
}

fn run_mass_edit<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: MassEditAction,
    root_folder_id: Option<RootFolderId>,
) {
    let ids = view_data.selection.selected_ids();
    if ids.is_empty() {
        emit_status(state, view_data, internal_tx, "nothing selected");
        return;
    }

    match runtime.run_mass_edit(action, &ids, root_folder_id) {
        Ok(()) => {
            view_data.bulk_progress = Some(BulkProgress {
                action,
                current_item: 0,
                total_items: ids.len() as i64,
            });
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} started for {} volumes", action.label(), ids.len()),
            );
        }
        Err(error) => {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} failed: {error}", action.label()),
            );
        }
    }
}

fn toggle_monitored<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(volume) = view_data.cursor_volume() else {
        emit_status(state, view_data, internal_tx, "no volume under cursor");
        return;
    };

    let mut changed = volume.clone();
    changed.monitored = !changed.monitored;
    match runtime.update_volume(&changed) {
        Ok(updated) => {
            let status = if updated.monitored {
                format!("monitoring {}", updated.title)
            } else {
                format!("unmonitored {}", updated.title)
            };
            if let Some(slot) = view_data
                .volumes
                .iter_mut()
                .find(|candidate| candidate.id == updated.id)
            {
                *slot = updated;
            }
            rebuild_visible(state, view_data);
            emit_status(state, view_data, internal_tx, status);
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("update failed: {error}"));
        }
    }
}

fn search_for_cursor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(volume) = view_data.cursor_volume() else {
        emit_status(state, view_data, internal_tx, "no volume under cursor");
        return;
    };

    let title = volume.title.clone();
    match runtime.search_remote(&title) {
        Ok(results) => {
            let message = match results.len() {
                0 => format!("no remote matches for {title}"),
                1 => format!("1 remote match for {title}"),
                count => format!("{count} remote matches for {title}"),
            };
            emit_status(state, view_data, internal_tx, message);
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("search failed: {error}"));
        }
    }
}

fn run_delete<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: VolumeId,
    delete_folder: bool,
) {
    match runtime.delete_volume(id, delete_folder) {
        Ok(()) => {
            view_data.volumes.retain(|volume| volume.id != id);
            rebuild_visible(state, view_data);
            emit_status(state, view_data, internal_tx, "volume deleted");
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("delete failed: {error}"));
        }
    }
}

fn handle_options_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let show = &mut view_data.prefs.show;
    match key.code {
        KeyCode::Char('t') => show.show_title = !show.show_title,
        KeyCode::Char('y') => show.show_year = !show.show_year,
        KeyCode::Char('p') => show.show_publisher = !show.show_publisher,
        KeyCode::Char('f') => show.show_folder = !show.show_folder,
        KeyCode::Char('s') => show.show_size = !show.show_size,
        KeyCode::Char('b') => show.show_progress = !show.show_progress,
        KeyCode::Char('d') => show.detailed_progress = !show.detailed_progress,
        KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('q') => {
            view_data.options_visible = false;
            sync_preferences(state, view_data);
            match runtime.save_preferences(&view_data.prefs) {
                Ok(()) => emit_status(state, view_data, internal_tx, "options saved"),
                Err(error) => {
                    emit_status(state, view_data, internal_tx, format!("save failed: {error}"));
                }
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state, view_data);
    render_jump_bar(frame, chunks[1], view_data);

    if !view_data.loaded {
        let loading = Paragraph::new("loading library...").style(Style::default().fg(Color::Gray));
        frame.render_widget(loading, chunks[2]);
    } else if view_data.visible.is_empty() {
        let message = match state.filter {
            FilterKind::All => "library is empty -- press t to scan",
            _ => "no volumes match the filter -- press f to widen it",
        };
        frame.render_widget(Paragraph::new(message), chunks[2]);
    } else {
        match state.view {
            ViewKind::PosterGrid => render_poster_grid(frame, chunks[2], state, view_data),
            ViewKind::Table => render_table(frame, chunks[2], state, view_data),
        }
    }

    render_status(frame, chunks[3], state, view_data);

    if view_data.help_visible {
        render_help(frame);
    }
    if view_data.queue_visible {
        render_queue(frame, view_data);
    }
    if view_data.options_visible {
        render_options(frame, view_data);
    }
    if let Some(id) = view_data.detail {
        render_detail(frame, view_data, id);
    }
    if let Some(id) = view_data.pending_delete {
        render_delete_prompt(frame, view_data, id);
    }
}

fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let direction_mark = match state.sort_direction {
        SortDirection::Ascending => SORT_MARK_ASCENDING,
        SortDirection::Descending => SORT_MARK_DESCENDING,
    };
    let mode = match state.mode {
        AppMode::Browse => String::new(),
        AppMode::Select => format!("  SELECT {} marked", view_data.selection.selected_count()),
    };
    let line = format!(
        "longbox  {}  filter:{}  sort:{} {}  {}/{} volumes{}",
        state.view.as_str(),
        state.filter.label(),
        state.sort_key.label(),
        direction_mark,
        view_data.visible.len(),
        view_data.volumes.len(),
        mode,
    );
    let header = Paragraph::new(line).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(header, area);
}

fn render_jump_bar(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let buckets = available_buckets(&view_data.visible);
    let active = view_data
        .cursor_volume()
        .and_then(|volume| bucket_character(&volume.title));

    let mut spans = Vec::new();
    for bucket in &buckets {
        let style = if Some(*bucket) == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(bucket.to_string(), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let text = if let Some(progress) = view_data.bulk_progress {
        format!(
            "{}: {}/{}",
            progress.action.label(),
            progress.current_item,
            progress.total_items
        )
    } else if let Some(status) = &state.status_line {
        status.clone()
    } else {
        "press ? for help".to_owned()
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let clamped = fraction.clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width);
    for index in 0..width {
        bar.push(if index < filled { '█' } else { '░' });
    }
    bar
}

fn render_poster_grid(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let grid = view_data.grid;
    let columns = grid.column_count as usize;

    for row in view_data.window.visible_range() {
        let row_top = area.y + (row - view_data.window.offset()) as u16 * grid.row_height;
        if row_top >= area.y + area.height {
            break;
        }
        let row_height = grid.row_height.min(area.y + area.height - row_top);

        for column in 0..columns {
            let index = row * columns + column;
            let Some(volume) = view_data.visible.get(index) else {
                break;
            };
            let cell = Rect {
                x: area.x + column as u16 * grid.column_width,
                y: row_top,
                width: grid.column_width.min(area.width.saturating_sub(column as u16 * grid.column_width)),
                height: row_height,
            };
            if cell.width == 0 {
                break;
            }
            render_poster_cell(frame, cell, state, view_data, volume, index);
        }
    }
}

fn render_poster_cell(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
    volume: &Volume,
    index: usize,
) {
    let overview = VolumeOverview::project(volume, &view_data.prefs.show, state.sort_key);
    let is_cursor = index == view_data.cursor;
    let is_selected = view_data.selection.is_selected(volume.id);

    let border_style = if is_cursor {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if is_selected && state.mode == AppMode::Select {
        Style::default().fg(Color::Yellow)
    } else if !overview.monitored {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut lines = Vec::new();
    let poster_height = view_data.prefs.poster_size.poster_height() as usize;
    let initial = bucket_character(&volume.title).unwrap_or(' ');
    for line_index in 0..poster_height.saturating_sub(2) {
        // A character poster: the bucket letter centered in a filler block.
        if line_index == poster_height / 2 {
            lines.push(Line::from(Span::styled(
                format!("  {initial}  "),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from("·"));
        }
    }

    for label in &overview.label_lines {
        lines.push(Line::from(label.clone()));
    }
    if let Some(sort_line) = &overview.sort_line {
        lines.push(Line::from(Span::styled(
            sort_line.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(progress) = &overview.progress {
        let width = area.width.saturating_sub(2) as usize;
        lines.push(Line::from(progress_bar(progress.fraction, width.max(1))));
        if progress.detailed {
            lines.push(Line::from(format!(
                "{}/{}",
                progress.downloaded, progress.total
            )));
        }
    }

    let marker = if state.mode == AppMode::Select {
        if is_selected { SELECT_MARK_ON } else { SELECT_MARK_OFF }
    } else {
        ""
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(marker);

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn table_cell_text(volume: &Volume, key: ColumnKey) -> String {
    match key {
        ColumnKey::Title => volume.title.clone(),
        ColumnKey::Year => volume.year.map(|y| y.to_string()).unwrap_or_default(),
        ColumnKey::Publisher => volume.publisher.clone(),
        ColumnKey::VolumeNumber => volume
            .volume_number
            .map(|n| n.to_string())
            .unwrap_or_default(),
        ColumnKey::IssueProgress => {
            format!("{}/{}", volume.issues_downloaded, volume.issue_count)
        }
        ColumnKey::Monitored => if volume.monitored { "yes" } else { "no" }.to_owned(),
        ColumnKey::Size => format_size(volume.total_size),
        ColumnKey::Folder => volume.folder.clone(),
        ColumnKey::AddedAt => volume.added_at.date().to_string(),
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let columns: Vec<_> = view_data
        .prefs
        .columns()
        .into_iter()
        .filter(|column| column.is_visible)
        .collect();

    let select_column = state.mode == AppMode::Select;
    let mut header_cells = Vec::new();
    if select_column {
        let order = view_data.visible_ids();
        let mark = if view_data.selection.all_selected(&order) {
            SELECT_MARK_ON
        } else {
            SELECT_MARK_OFF
        };
        header_cells.push(Cell::from(mark));
    }
    for column in &columns {
        let mut label = column.name.label().to_owned();
        if column.name == state.sort_key {
            let mark = match state.sort_direction {
                SortDirection::Ascending => SORT_MARK_ASCENDING,
                SortDirection::Descending => SORT_MARK_DESCENDING,
            };
            label = format!("{label} {mark}");
        }
        header_cells.push(Cell::from(label));
    }
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let mut rows = Vec::new();
    for index in view_data.window.visible_range() {
        let Some(volume) = view_data.visible.get(index) else {
            break;
        };
        let mut cells = Vec::new();
        if select_column {
            let mark = if view_data.selection.is_selected(volume.id) {
                SELECT_MARK_ON
            } else {
                SELECT_MARK_OFF
            };
            cells.push(Cell::from(mark));
        }
        for column in &columns {
            cells.push(Cell::from(table_cell_text(volume, column.name)));
        }
        let mut style = Style::default();
        if index == view_data.cursor {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        } else if !volume.monitored {
            style = style.fg(Color::DarkGray);
        }
        rows.push(Row::new(cells).style(style));
    }

    let mut widths = Vec::new();
    if select_column {
        widths.push(Constraint::Length(3));
    }
    for column in &columns {
        widths.push(match column.name {
            ColumnKey::Title => Constraint::Min(24),
            ColumnKey::Folder => Constraint::Min(20),
            ColumnKey::Publisher => Constraint::Length(14),
            ColumnKey::AddedAt => Constraint::Length(12),
            _ => Constraint::Length(10),
        });
    }

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, area);
}

fn centered_rect(frame: &ratatui::Frame<'_>, width: u16, height: u16) -> Rect {
    let size = frame.area();
    let width = width.min(size.width);
    let height = height.min(size.height);
    Rect {
        x: size.width.saturating_sub(width) / 2,
        y: size.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn render_help(frame: &mut ratatui::Frame<'_>) {
    let text = concat!(
        "v view  f filter  s sort key  d direction  z poster size\n",
        "o display options  w queue  r refresh  t server scan\n",
        "u (un)monitor  / remote search  x delete  Enter detail  Shift+letter jump\n",
        "m select mode: space mark  c range  a all  M/U/S/E/R/D/F actions\n",
        "q quit",
    );
    let area = centered_rect(frame, 64, 7);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("help")),
        area,
    );
}

fn render_queue(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let mut lines = Vec::new();
    if view_data.queue.is_empty() {
        lines.push(Line::from("queue is empty"));
    }
    for item in &view_data.queue {
        lines.push(Line::from(format!(
            "{:<40} {:>9} {:>4}% {}",
            item.title,
            format_size(item.size),
            (item.progress * 100.0).round() as i64,
            item.status.as_str(),
        )));
    }

    if !view_data.root_folders.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "root folders",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for folder in &view_data.root_folders {
            lines.push(Line::from(format!(
                "{:<48} {:>9} free",
                folder.path,
                format_size(folder.free_space),
            )));
        }
    }

    let area = centered_rect(frame, 72, (lines.len() as u16 + 2).max(3));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("queue")),
        area,
    );
}

fn render_options(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let show = &view_data.prefs.show;
    let flag = |on: bool| if on { "on " } else { "off" };
    let text = format!(
        "t title      {}\ny year       {}\np publisher  {}\nf folder     {}\ns size       {}\nb progress   {}\nd detailed   {}\n\nEsc to save",
        flag(show.show_title),
        flag(show.show_year),
        flag(show.show_publisher),
        flag(show.show_folder),
        flag(show.show_size),
        flag(show.show_progress),
        flag(show.detailed_progress),
    );
    let area = centered_rect(frame, 32, 11);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("display")),
        area,
    );
}

fn render_detail(frame: &mut ratatui::Frame<'_>, view_data: &ViewData, id: VolumeId) {
    let area = centered_rect(frame, 70, 18);
    frame.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title("volume");
    let Some(volume) = view_data.volumes.iter().find(|volume| volume.id == id) else {
        // The volume vanished between opening the overlay and this frame.
        frame.render_widget(
            Paragraph::new("volume no longer in the library").block(block),
            area,
        );
        return;
    };

    let year = volume.year.map(|y| y.to_string()).unwrap_or_default();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} ({year})", volume.title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("publisher: {}", volume.publisher)),
        Line::from(format!("folder: {}", volume.folder)),
        Line::from(format!(
            "issues: {}/{}  size: {}",
            volume.issues_downloaded,
            volume.issue_count,
            format_size(volume.total_size)
        )),
        Line::from(format!(
            "monitored: {}",
            if volume.monitored { "yes" } else { "no" }
        )),
        Line::from(""),
        Line::from(volume.description.clone()),
    ];

    if !view_data.detail_issues.is_empty() {
        lines.push(Line::from(""));
        for issue in view_data.detail_issues.iter().take(6) {
            let mark = if issue.files > 0 { "x" } else { " " };
            lines.push(Line::from(format!("[{mark}] {}", issue.title)));
        }
        let hidden = view_data.detail_issues.len().saturating_sub(6);
        if hidden > 0 {
            lines.push(Line::from(format!("... {hidden} more issues")));
        }
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_prompt(frame: &mut ratatui::Frame<'_>, view_data: &ViewData, id: VolumeId) {
    let title = view_data
        .volumes
        .iter()
        .find(|volume| volume.id == id)
        .map(|volume| volume.title.clone())
        .unwrap_or_else(|| "volume".to_owned());
    let text = format!("delete {title}?\n\ny keep files  f delete folder too  any other key cancels");
    let area = centered_rect(frame, 56, 5);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("confirm")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, BulkProgress, InternalEvent, ViewData, apply_preferences, cycle_filter,
        cycle_poster_size, cycle_sort_key, handle_key_event, handle_push_event, next_root_folder,
        progress_bar, rebuild_visible, refresh_library, sync_layout,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use longbox_api::{PushEvent, SearchResult};
    use longbox_app::{
        AppCommand, AppMode, AppState, FilterKind, Issue, MassEditAction, QueueItem, RootFolder,
        RootFolderId, UiPreferences, ViewKind, Volume, VolumeId,
    };
    use longbox_testkit::{issues_for, sample_queue, sample_root_folders, scenario_volumes};
    use std::sync::mpsc::{self, Receiver, Sender};

    struct TestRuntime {
        volumes: Vec<Volume>,
        saved_prefs: Option<UiPreferences>,
        mass_edits: Vec<(MassEditAction, Vec<VolumeId>, Option<RootFolderId>)>,
        deleted: Vec<(VolumeId, bool)>,
        tasks: Vec<String>,
        searches: Vec<String>,
        load_count: usize,
    }

    impl TestRuntime {
        fn new() -> Self {
            Self {
                volumes: scenario_volumes(),
                saved_prefs: None,
                mass_edits: Vec::new(),
                deleted: Vec::new(),
                tasks: Vec::new(),
                searches: Vec::new(),
                load_count: 0,
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_library(&mut self) -> Result<Vec<Volume>> {
            self.load_count += 1;
            Ok(self.volumes.clone())
        }

        fn load_root_folders(&mut self) -> Result<Vec<RootFolder>> {
            Ok(sample_root_folders())
        }

        fn load_queue(&mut self) -> Result<Vec<QueueItem>> {
            Ok(sample_queue())
        }

        fn load_issues(&mut self, id: VolumeId) -> Result<Vec<Issue>> {
            Ok(self
                .volumes
                .iter()
                .find(|volume| volume.id == id)
                .map(issues_for)
                .unwrap_or_default())
        }

        fn update_volume(&mut self, volume: &Volume) -> Result<Volume> {
            if let Some(slot) = self
                .volumes
                .iter_mut()
                .find(|candidate| candidate.id == volume.id)
            {
                *slot = volume.clone();
            }
            Ok(volume.clone())
        }

        fn delete_volume(&mut self, id: VolumeId, delete_folder: bool) -> Result<()> {
            self.deleted.push((id, delete_folder));
            self.volumes.retain(|volume| volume.id != id);
            Ok(())
        }

        fn search_remote(&mut self, query: &str) -> Result<Vec<SearchResult>> {
            self.searches.push(query.to_owned());
            Ok(Vec::new())
        }

        fn run_task(&mut self, task: &str) -> Result<()> {
            self.tasks.push(task.to_owned());
            Ok(())
        }

        fn run_mass_edit(
            &mut self,
            action: MassEditAction,
            volume_ids: &[VolumeId],
            root_folder_id: Option<RootFolderId>,
        ) -> Result<()> {
            self.mass_edits
                .push((action, volume_ids.to_vec(), root_folder_id));
            Ok(())
        }

        fn load_preferences(&mut self) -> UiPreferences {
            UiPreferences::default()
        }

        fn save_preferences(&mut self, prefs: &UiPreferences) -> Result<()> {
            self.saved_prefs = Some(prefs.clone());
            Ok(())
        }
    }

    fn setup() -> (
        AppState,
        TestRuntime,
        ViewData,
        Sender<InternalEvent>,
        Receiver<InternalEvent>,
    ) {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::new();
        let mut view_data = ViewData::default();
        refresh_library(&mut state, &mut runtime, &mut view_data).expect("initial load");
        sync_layout(&state, &mut view_data, 120, 40);
        let (tx, rx) = mpsc::channel();
        (state, runtime, view_data, tx, rx)
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        tx: &Sender<InternalEvent>,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> bool {
        handle_key_event(state, runtime, view_data, tx, KeyEvent::new(code, modifiers))
    }

    #[test]
    fn initial_load_sorts_by_title_ascending() {
        let (_, _, view_data, _, _) = setup();
        assert_eq!(view_data.visible.len(), 12);
        assert_eq!(view_data.visible[0].title, "100 Bullets");
        assert_eq!(view_data.visible[11].title, "Zenith");
        assert!(view_data.loaded);
    }

    #[test]
    fn view_toggle_key_flips_views() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('v'), KeyModifiers::NONE);
        assert_eq!(state.view, ViewKind::Table);
        assert_eq!(view_data.prefs.view, ViewKind::Table);
    }

    #[test]
    fn search_key_queries_for_the_cursor_title() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('/'), KeyModifiers::NONE);
        assert_eq!(runtime.searches, vec!["100 Bullets".to_owned()]);
        assert_eq!(
            state.status_line.as_deref(),
            Some("no remote matches for 100 Bullets")
        );
    }

    #[test]
    fn detail_overlay_loads_and_drops_the_issue_list() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter, KeyModifiers::NONE);

        // Cursor starts on "100 Bullets": 100 issues, all on disk.
        assert!(view_data.detail.is_some());
        assert_eq!(view_data.detail_issues.len(), 100);
        assert!(view_data.detail_issues.iter().all(|issue| issue.files > 0));

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Esc, KeyModifiers::NONE);
        assert!(view_data.detail.is_none());
        assert!(view_data.detail_issues.is_empty());
    }

    #[test]
    fn filter_cycle_narrows_then_widens() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(state.filter, FilterKind::Monitored);
        assert_eq!(view_data.visible.len(), 5);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(state.filter, FilterKind::Wanted);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(state.filter, FilterKind::All);
        assert_eq!(view_data.visible.len(), 12);
    }

    #[test]
    fn selection_survives_filter_round_trip() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('m'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(view_data.selection.selected_count(), 5);
        assert!(view_data.selection.all_selected(&view_data.visible_ids()));

        // Widen back to everything: the five stay marked but the header
        // checkbox is no longer all-selected.
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(view_data.visible.len(), 12);
        assert_eq!(view_data.selection.selected_count(), 5);
        assert!(!view_data.selection.all_selected(&view_data.visible_ids()));
    }

    #[test]
    fn jump_key_moves_cursor_to_bucket() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('M'), KeyModifiers::SHIFT);
        assert_eq!(view_data.cursor_volume().map(|v| v.title.as_str()), Some("Monstress"));

        // Bare digits collapse into the '#' bucket at the top.
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('7'), KeyModifiers::NONE);
        assert_eq!(view_data.cursor, 0);
        assert_eq!(view_data.cursor_volume().map(|v| v.title.as_str()), Some("100 Bullets"));
    }

    #[test]
    fn jump_to_missing_bucket_reports_status() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        let before = view_data.cursor;
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(view_data.cursor, before);
        assert_eq!(state.status_line.as_deref(), Some("no titles under Q"));
    }

    #[test]
    fn select_mode_mass_edit_sends_selected_ids() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(state.mode, AppMode::Select);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char(' '), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('U'), KeyModifiers::SHIFT);

        assert_eq!(runtime.mass_edits.len(), 1);
        let (action, ids, folder) = &runtime.mass_edits[0];
        assert_eq!(*action, MassEditAction::Unmonitor);
        assert_eq!(ids, &view_data.selection.selected_ids());
        assert_eq!(*folder, None);
        assert!(view_data.bulk_progress.is_some());
    }

    #[test]
    fn mass_edit_without_selection_is_refused() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('m'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('D'), KeyModifiers::SHIFT);
        assert!(runtime.mass_edits.is_empty());
        assert_eq!(state.status_line.as_deref(), Some("nothing selected"));
    }

    #[test]
    fn range_toggle_extends_from_anchor() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('m'), KeyModifiers::NONE);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char(' '), KeyModifiers::NONE);
        view_data.cursor = 4;
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(view_data.selection.selected_count(), 5);
    }

    #[test]
    fn delete_flow_requires_confirmation() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        let target = view_data.visible[0].id;

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(view_data.pending_delete, Some(target));
        assert!(runtime.deleted.is_empty());

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(view_data.pending_delete, None);
        assert!(runtime.deleted.is_empty());

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('x'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(runtime.deleted, vec![(target, false)]);
        assert_eq!(view_data.visible.len(), 11);
    }

    #[test]
    fn monitor_toggle_updates_library_in_place() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        let was_monitored = view_data.visible[0].monitored;

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('u'), KeyModifiers::NONE);
        assert_eq!(view_data.visible[0].monitored, !was_monitored);
    }

    #[test]
    fn saved_scroll_offset_survives_the_first_layout() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::new();
        let mut view_data = ViewData::default();
        view_data.prefs.view = ViewKind::Table;
        view_data.prefs.last_scroll_offset = 5;
        apply_preferences(&mut state, &mut view_data);

        refresh_library(&mut state, &mut runtime, &mut view_data).expect("initial load");

        // 12 table rows in a 4-row viewport leaves room for offset 5.
        sync_layout(&state, &mut view_data, 80, 4);
        assert_eq!(view_data.window.offset(), 5);
        assert_eq!(view_data.cursor, 5);

        // Later layout passes must not drag the window back to the top.
        sync_layout(&state, &mut view_data, 80, 4);
        assert_eq!(view_data.window.offset(), 5);
    }

    #[test]
    fn oversized_saved_offset_clamps_to_content() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::new();
        let mut view_data = ViewData::default();
        view_data.prefs.view = ViewKind::Table;
        view_data.prefs.last_scroll_offset = 900;
        apply_preferences(&mut state, &mut view_data);

        refresh_library(&mut state, &mut runtime, &mut view_data).expect("initial load");
        sync_layout(&state, &mut view_data, 80, 4);
        assert_eq!(view_data.window.offset(), 8);
        assert_eq!(view_data.cursor, 8);
    }

    #[test]
    fn options_overlay_saves_preferences_on_close() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('o'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('p'), KeyModifiers::NONE);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Esc, KeyModifiers::NONE);

        let saved = runtime.saved_prefs.as_ref().expect("prefs saved on close");
        assert!(saved.show.show_publisher);
        assert!(!view_data.options_visible);
    }

    #[test]
    fn completed_mass_edit_push_event_refreshes_library() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        let loads_before = runtime.load_count;
        view_data.bulk_progress = Some(BulkProgress {
            action: MassEditAction::Delete,
            current_item: 0,
            total_items: 4,
        });

        handle_push_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            PushEvent::MassEditorStatus {
                action: MassEditAction::Delete,
                current_item: 2,
                total_items: 4,
            },
        );
        assert_eq!(
            view_data.bulk_progress,
            Some(BulkProgress {
                action: MassEditAction::Delete,
                current_item: 2,
                total_items: 4,
            })
        );
        assert_eq!(runtime.load_count, loads_before);

        handle_push_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            PushEvent::MassEditorStatus {
                action: MassEditAction::Delete,
                current_item: 4,
                total_items: 4,
            },
        );
        assert_eq!(view_data.bulk_progress, None);
        assert_eq!(runtime.load_count, loads_before + 1);
        assert_eq!(state.status_line.as_deref(), Some("delete finished"));
    }

    #[test]
    fn sort_key_cycle_resorts_the_view() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        state.dispatch(AppCommand::SetSort(longbox_app::ColumnKey::Year));
        rebuild_visible(&state, &mut view_data);
        assert_eq!(view_data.visible[0].year, Some(1983));

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(view_data.visible[0].year, Some(2016));
    }

    #[test]
    fn grid_and_table_use_different_row_math() {
        let (mut state, mut runtime, mut view_data, tx, _rx) = setup();
        sync_layout(&state, &mut view_data, 120, 40);
        assert!(view_data.grid.column_count > 1);

        view_data.cursor = 7;
        let grid_row = view_data.cursor_row(ViewKind::PosterGrid);
        assert_eq!(grid_row, 7 / view_data.grid.column_count as usize);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('v'), KeyModifiers::NONE);
        assert_eq!(view_data.cursor_row(ViewKind::Table), 7);
    }

    #[test]
    fn cursor_clamps_when_content_shrinks() {
        let (mut state, _, mut view_data, _, _) = setup();
        view_data.cursor = 11;
        state.filter = FilterKind::Monitored;
        rebuild_visible(&state, &mut view_data);
        assert_eq!(view_data.cursor, 4);
    }

    #[test]
    fn helpers_cycle_through_all_values() {
        let mut filter = FilterKind::All;
        for _ in 0..3 {
            filter = cycle_filter(filter);
        }
        assert_eq!(filter, FilterKind::All);

        let mut size = longbox_app::PosterSize::Small;
        for _ in 0..3 {
            size = cycle_poster_size(size);
        }
        assert_eq!(size, longbox_app::PosterSize::Small);

        let mut key = longbox_app::ColumnKey::Title;
        for _ in 0..longbox_app::ColumnKey::ALL.len() {
            key = cycle_sort_key(key);
        }
        assert_eq!(key, longbox_app::ColumnKey::Title);
    }

    #[test]
    fn next_root_folder_skips_the_current_one() {
        let folders = sample_root_folders();
        assert_eq!(
            next_root_folder(&folders, RootFolderId::new(1)),
            Some(RootFolderId::new(2))
        );
        assert_eq!(
            next_root_folder(&folders[..1].to_vec(), RootFolderId::new(1)),
            None
        );
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(1.0, 4), "████");
        assert_eq!(progress_bar(2.0, 4), "████");
    }
}
