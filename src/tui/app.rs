//! Board application for the terminal user interface.
//!
//! `BoardApp` owns the project board and every interactive component shown on
//! it: one add-task form per container, the task modal with its title editor
//! and label/delete actions, and the chat widget. Remote calls run on the tokio runtime in the
//! background; their results come back through a channel that is drained at
//! the top of each frame, and the resulting notifications are applied to the
//! board here.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle as TokioHandle;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::board::{ProjectBoard, Task};
use crate::error::RemoteError;
use crate::fields::format_label;
use crate::remote::{ChatService, ContainerId, ProjectId, TaskService};
use crate::tui::{
    add_task_form::{AddTaskForm, FormPhase},
    chat::{ChatWidget, Sender},
    colors::{label_color, text_on, BOARD_BLUE, DARK_RED},
    enums::{AppState, KeyOutcome},
    events::{
        run_chat_task, run_create_task_task, run_delete_task_task, run_fetch_project_task,
        run_update_label_task, run_update_title_task, RemoteEvent, REMOTE_EVENT_CHANNEL_CAPACITY,
    },
    input::InputField,
    task_modal::{ModalAction, TaskModal},
    utils::{centered_rect, wrap_words},
};

const CARD_HEIGHT: usize = 5;
const RUNTIME_UNAVAILABLE: &str = "tokio runtime is not active";

/// Main application state for the board UI.
pub struct BoardApp {
    state: AppState,
    project_id: Option<ProjectId>,
    board: ProjectBoard,
    loading: bool,
    task_service: Arc<dyn TaskService>,
    chat_service: Arc<dyn ChatService>,
    forms: HashMap<ContainerId, AddTaskForm>,
    modal: Option<TaskModal>,
    chat: ChatWidget,
    suggestion_cursor: Option<usize>,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: Vec<usize>,
    status_message: String,
    status_is_error: bool,
    event_sender: mpsc::Sender<RemoteEvent>,
    event_receiver: mpsc::Receiver<RemoteEvent>,
}

impl BoardApp {
    pub fn new(
        project_id: Option<ProjectId>,
        task_service: Arc<dyn TaskService>,
        chat_service: Arc<dyn ChatService>,
    ) -> Self {
        let (event_sender, event_receiver) = mpsc::channel(REMOTE_EVENT_CHANNEL_CAPACITY);
        let board = ProjectBoard::empty(project_id.unwrap_or(ProjectId(0)));
        let mut app = BoardApp {
            state: AppState::Board,
            project_id,
            board,
            loading: false,
            task_service,
            chat_service,
            forms: HashMap::new(),
            modal: None,
            chat: ChatWidget::new(),
            suggestion_cursor: None,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: Vec::new(),
            status_message: String::new(),
            status_is_error: false,
            event_sender,
            event_receiver,
        };
        if project_id.is_none() {
            app.set_status_message("No project selected. Pass --project or set project_id in the config.");
        }
        app
    }

    /// Show an already loaded board instead of fetching one.
    pub fn with_board(mut self, board: ProjectBoard) -> Self {
        self.project_id = Some(board.id);
        self.install_board(board);
        self.clear_status_message();
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn board(&self) -> &ProjectBoard {
        &self.board
    }

    pub fn chat(&self) -> &ChatWidget {
        &self.chat
    }

    pub fn modal(&self) -> Option<&TaskModal> {
        self.modal.as_ref()
    }

    pub fn form(&self, container_id: ContainerId) -> Option<&AddTaskForm> {
        self.forms.get(&container_id)
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = false;
    }

    fn set_status_error(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = true;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    /// Show `board`, keeping the add-task form of every container that is
    /// still on it so pending submissions survive a reload.
    fn install_board(&mut self, board: ProjectBoard) {
        let mut previous = std::mem::take(&mut self.forms);
        self.forms = board
            .cards
            .iter()
            .map(|c| {
                let form = previous.remove(&c.id).unwrap_or_else(|| AddTaskForm::new(c.id));
                (c.id, form)
            })
            .collect();
        for form in previous.values().filter(|form| form.is_pending()) {
            debug!(container_id = %form.container_id(), "container left the board with a task creation pending");
        }
        if let AppState::AddTask(container_id) = self.state {
            if !self.forms.contains_key(&container_id) {
                self.state = AppState::Board;
            }
        }
        self.column_scroll_offsets = vec![0; board.cards.len()];
        self.board = board;
        self.clamp_selection();
    }

    /// Start (re)loading the board from the backend.
    pub fn reload(&mut self) {
        let Some(project_id) = self.project_id else {
            self.set_status_error("No project selected");
            return;
        };
        if self.loading {
            return;
        }
        self.loading = true;
        self.set_status_message(format!("Loading project {project_id}..."));
        let service = Arc::clone(&self.task_service);
        let sender = self.event_sender.clone();
        self.spawn_remote(
            run_fetch_project_task(service, project_id, sender),
            || RemoteEvent::ProjectLoaded(Err(RemoteError::new(RUNTIME_UNAVAILABLE))),
        );
    }

    /// Run `task` in the background, or deliver the fallback failure at once
    /// when there is no runtime to run it on.
    fn spawn_remote<F>(&mut self, task: F, fallback: impl FnOnce() -> RemoteEvent)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match TokioHandle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => {
                warn!("remote call skipped: {RUNTIME_UNAVAILABLE}");
                self.apply_remote_event(fallback());
            }
        }
    }

    /// Apply every remote result that has arrived since the last frame.
    pub fn poll_remote_events(&mut self) -> bool {
        let mut events = Vec::new();
        loop {
            match self.event_receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.set_status_error("remote event channel closed unexpectedly");
                    break;
                }
            }
        }
        let had_events = !events.is_empty();
        for event in events {
            self.apply_remote_event(event);
        }
        had_events
    }

    fn apply_remote_event(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::ProjectLoaded(outcome) => {
                self.loading = false;
                match outcome {
                    Ok(board) => {
                        info!(project_id = %board.id, containers = board.cards.len(), "project loaded");
                        let name = board.name.clone();
                        self.install_board(board);
                        self.set_status_message(format!("Loaded {name}"));
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load project");
                        self.set_status_error("Failed to load project");
                    }
                }
            }
            RemoteEvent::TitleUpdated { task_id, outcome } => {
                let Some(modal) = self.modal.as_mut().filter(|m| m.task_id() == task_id) else {
                    debug!(%task_id, "task modal closed before title update resolved, dropping result");
                    return;
                };
                if let Some(saved) = modal.editor_mut().finish_commit(outcome) {
                    self.board.rename_task(saved.task_id, &saved.title);
                    self.set_status_message("Title saved");
                }
            }
            RemoteEvent::LabelUpdated { task_id, outcome } => {
                let Some(modal) = self.modal.as_mut().filter(|m| m.task_id() == task_id) else {
                    debug!(%task_id, "task modal closed before label update resolved, dropping result");
                    return;
                };
                if let Some(changed) = modal.finish_label_change(outcome) {
                    self.board.set_task_label(changed.task_id, changed.label);
                    self.set_status_message(format!("Moved to {}", format_label(changed.label)));
                }
            }
            RemoteEvent::TaskDeleted { task_id, outcome } => {
                let Some(modal) = self.modal.as_mut().filter(|m| m.task_id() == task_id) else {
                    debug!(%task_id, "task modal closed before delete resolved, dropping result");
                    return;
                };
                if let Some(removed) = modal.finish_delete(outcome) {
                    self.board.remove_task(removed.task_id);
                    self.modal = None;
                    if self.state == AppState::TaskModal {
                        self.state = AppState::Board;
                    }
                    self.clamp_selection();
                    self.set_status_message("Task deleted");
                }
            }
            RemoteEvent::TaskCreated {
                container_id,
                outcome,
            } => {
                let Some(form) = self.forms.get_mut(&container_id) else {
                    debug!(%container_id, "container gone before task creation resolved, dropping result");
                    return;
                };
                if let Some(created) = form.finish_submit(outcome) {
                    let task: Task = created.task.into();
                    let name = task.name.clone();
                    self.board.push_task(created.container_id, task);
                    self.set_status_message(format!("Added '{name}'"));
                }
                if self.state == AppState::AddTask(container_id) {
                    self.state = AppState::Board;
                }
            }
            RemoteEvent::ChatReplied(outcome) => self.chat.receive(outcome),
        }
    }

    /// Ensure selected column and card indices are valid
    fn clamp_selection(&mut self) {
        let columns = self.board.cards.len();
        if columns == 0 {
            self.selected_column = 0;
            self.selected_card = 0;
            return;
        }
        if self.selected_column >= columns {
            self.selected_column = columns - 1;
        }
        let cards = self.board.cards[self.selected_column].tasks.len();
        if cards == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= cards {
            self.selected_card = cards - 1;
        }
    }

    fn selected_container_id(&self) -> Option<ContainerId> {
        self.board.cards.get(self.selected_column).map(|c| c.id)
    }

    fn open_task_modal(&mut self) {
        let modal = self.board.cards.get(self.selected_column).and_then(|container| {
            container
                .tasks
                .get(self.selected_card)
                .map(|task| TaskModal::new(task, container.name.clone()))
        });
        let Some(modal) = modal else {
            self.set_status_message("No task selected");
            return;
        };
        self.modal = Some(modal);
        self.state = AppState::TaskModal;
    }

    fn open_add_form(&mut self) {
        let Some(container_id) = self.selected_container_id() else {
            self.set_status_message("No container to add a task to");
            return;
        };
        let form = self
            .forms
            .entry(container_id)
            .or_insert_with(|| AddTaskForm::new(container_id));
        form.open();
        if form.phase() == FormPhase::Open {
            self.state = AppState::AddTask(container_id);
        }
    }

    fn open_chat(&mut self) {
        self.chat.open();
        self.suggestion_cursor = None;
        self.state = AppState::Chat;
    }

    /// Handle one key press and report whether the app should keep running.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyOutcome::Quit;
        }
        match self.state {
            AppState::Board => return self.handle_board_key(key),
            AppState::TaskModal => self.handle_modal_key(key),
            AppState::AddTask(container_id) => self.handle_form_key(container_id, key),
            AppState::Chat => self.handle_chat_key(key),
            AppState::Help => self.state = AppState::Board,
        }
        KeyOutcome::Continue
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> KeyOutcome {
        self.clear_status_message();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.board.cards.len() {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down => {
                let column_len = self
                    .board
                    .cards
                    .get(self.selected_column)
                    .map_or(0, |c| c.tasks.len());
                if self.selected_card + 1 < column_len {
                    self.selected_card += 1;
                }
            }
            KeyCode::Enter => self.open_task_modal(),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('c') => self.open_chat(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.as_mut() else {
            self.state = AppState::Board;
            return;
        };

        if modal.is_busy() {
            return;
        }

        if modal.is_confirming_delete() {
            if key.code != KeyCode::Char('y') {
                modal.cancel_delete();
                self.clear_status_message();
                return;
            }
            if let Some(task_id) = modal.confirm_delete() {
                let service = Arc::clone(&self.task_service);
                let sender = self.event_sender.clone();
                self.spawn_remote(run_delete_task_task(service, task_id, sender), || {
                    RemoteEvent::TaskDeleted {
                        task_id,
                        outcome: Err(RemoteError::new(RUNTIME_UNAVAILABLE)),
                    }
                });
            }
            return;
        }

        if let Some(input) = modal.editor_mut().input_mut() {
            match key.code {
                KeyCode::Esc => modal.editor_mut().cancel(),
                KeyCode::Enter | KeyCode::Tab => {
                    if let Some(update) = modal.editor_mut().begin_commit() {
                        let service = Arc::clone(&self.task_service);
                        let sender = self.event_sender.clone();
                        let task_id = update.task_id;
                        self.spawn_remote(run_update_title_task(service, update, sender), || {
                            RemoteEvent::TitleUpdated {
                                task_id,
                                outcome: Err(RemoteError::new(RUNTIME_UNAVAILABLE)),
                            }
                        });
                    }
                }
                _ => edit_input(input, key.code),
            }
            return;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => {
                modal.editor_mut().enter_edit();
            }
            KeyCode::Char('l') => {
                if let Some(update) = modal.cycle_label() {
                    let service = Arc::clone(&self.task_service);
                    let sender = self.event_sender.clone();
                    let task_id = update.task_id;
                    self.spawn_remote(run_update_label_task(service, update, sender), || {
                        RemoteEvent::LabelUpdated {
                            task_id,
                            outcome: Err(RemoteError::new(RUNTIME_UNAVAILABLE)),
                        }
                    });
                }
            }
            KeyCode::Char('d') => {
                if modal.request_delete() {
                    self.set_status_message("Delete this task? y: Delete | any other key: Keep");
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modal = None;
                self.state = AppState::Board;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, container_id: ContainerId, key: KeyEvent) {
        let Some(form) = self.forms.get_mut(&container_id) else {
            self.state = AppState::Board;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                form.cancel();
                if form.is_collapsed() {
                    self.state = AppState::Board;
                }
            }
            KeyCode::Enter => {
                if let Some(creation) = form.submit() {
                    let service = Arc::clone(&self.task_service);
                    let sender = self.event_sender.clone();
                    self.spawn_remote(run_create_task_task(service, creation, sender), || {
                        RemoteEvent::TaskCreated {
                            container_id,
                            outcome: Err(RemoteError::new(RUNTIME_UNAVAILABLE)),
                        }
                    });
                }
            }
            code => {
                if let Some(input) = form.input_mut() {
                    edit_input(input, code);
                }
            }
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.chat.close();
                self.state = AppState::Board;
            }
            KeyCode::Up | KeyCode::Down => {
                let count = self.chat.suggestions().len();
                if count == 0 || !self.chat.input().value.is_empty() {
                    self.suggestion_cursor = None;
                    return;
                }
                self.suggestion_cursor = Some(match (self.suggestion_cursor, key.code) {
                    (None, KeyCode::Up) => count - 1,
                    (None, _) => 0,
                    (Some(i), KeyCode::Up) => (i + count - 1) % count,
                    (Some(i), _) => (i + 1) % count,
                });
            }
            KeyCode::Enter => {
                let request = match self.suggestion_cursor.take() {
                    Some(index) if self.chat.input().value.is_empty() => {
                        self.chat.choose_suggestion(index)
                    }
                    _ => self.chat.send(),
                };
                if let Some(request) = request {
                    let service = Arc::clone(&self.chat_service);
                    let sender = self.event_sender.clone();
                    self.spawn_remote(run_chat_task(service, request, sender), || {
                        RemoteEvent::ChatReplied(Err(RemoteError::new(RUNTIME_UNAVAILABLE)))
                    });
                }
            }
            code => {
                self.suggestion_cursor = None;
                edit_input(self.chat.input_mut(), code);
            }
        }
    }

    /// Render the whole board UI.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);

        if self.chat.is_open() {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(chunks[1]);
            self.render_board(f, split[0]);
            self.render_chat(f, split[1]);
        } else {
            self.render_board(f, chunks[1]);
        }

        self.render_status_bar(f, chunks[2]);

        match self.state {
            AppState::TaskModal => self.render_task_modal(f),
            AppState::Help => self.render_help(f),
            _ => {}
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("PROJECT BOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                self.board.name.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ];
        if self.loading {
            spans.push(Span::raw("  (loading...)"));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let column_count = self.board.cards.len();
        if column_count == 0 {
            let empty = Paragraph::new("No containers on this board")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }

        let constraints: Vec<Constraint> = (0..column_count)
            .map(|_| Constraint::Ratio(1, column_count as u32))
            .collect();
        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let border_style = if is_selected {
            Style::default().fg(BOARD_BLUE).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let container = &self.board.cards[column_index];
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", container.name, container.tasks.len()))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);
        let cards_area = parts[0];

        if let Some(form) = self.forms.get(&container.id) {
            render_add_form(f, parts[1], form, self.state == AppState::AddTask(container.id));
        }

        let tasks = &self.board.cards[column_index].tasks;
        if tasks.is_empty() {
            return;
        }

        let available_height = cards_area.height as usize;
        let visible_cards = available_height / CARD_HEIGHT;
        if self.column_scroll_offsets.len() <= column_index {
            self.column_scroll_offsets.resize(column_index + 1, 0);
        }

        let scroll_offset = if is_selected {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;
            if self.selected_card < start_visible {
                self.selected_card
            } else if self.selected_card >= end_visible && visible_cards > 0 {
                self.selected_card + 1 - visible_cards
            } else {
                start_visible
            }
        } else {
            self.column_scroll_offsets[column_index].min(tasks.len().saturating_sub(1))
        };
        self.column_scroll_offsets[column_index] = scroll_offset;

        let mut current_y = 0;
        let mut rendered_cards = 0;
        for (card_index, task) in tasks.iter().enumerate().skip(scroll_offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: cards_area.x,
                y: cards_area.y + current_y as u16,
                width: cards_area.width,
                height: CARD_HEIGHT as u16,
            };
            render_card(f, card_area, task, is_selected && card_index == self.selected_card);
            current_y += CARD_HEIGHT;
            rendered_cards += 1;
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{} above", scroll_offset))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..cards_area });
        }
        let remaining = tasks.len() - scroll_offset - rendered_cards;
        if remaining > 0 && cards_area.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{} below", remaining))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    y: cards_area.y + cards_area.height - 1,
                    height: 1,
                    ..cards_area
                },
            );
        }
    }

    fn render_chat(&self, f: &mut Frame, area: Rect) {
        let focused = self.state == AppState::Chat;
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Chat Assistant")
            .border_style(if focused {
                Style::default().fg(BOARD_BLUE).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        f.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);

        let mut lines = Vec::new();
        for entry in self.chat.transcript().entries() {
            let color = match entry.sender {
                Sender::User => Color::Cyan,
                Sender::Bot => Color::Green,
            };
            lines.push(Line::from(vec![
                Span::styled(
                    entry.sender.display_name(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", entry.sent_at.format("%H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            lines.push(Line::from(entry.text.clone()));
            lines.push(Line::from(""));
        }
        if self.chat.is_loading() {
            lines.push(Line::from(Span::styled(
                "ChatBot is typing...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        let suggestions = self.chat.suggestions();
        if !suggestions.is_empty() {
            lines.push(Line::from("Try asking (↑/↓ then Enter):"));
            for (i, prompt) in suggestions.iter().enumerate() {
                let style = if self.suggestion_cursor == Some(i) {
                    Style::default().bg(BOARD_BLUE).fg(Color::White)
                } else {
                    Style::default().fg(Color::Yellow)
                };
                lines.push(Line::from(Span::styled(format!("  {prompt}"), style)));
            }
        }

        let scroll = (lines.len() as u16).saturating_sub(parts[0].height);
        let transcript = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        f.render_widget(transcript, parts[0]);

        render_input(f, parts[1], self.chat.input(), "Message", focused && !self.chat.is_loading());
    }

    /// Render the task detail modal with its editable title.
    fn render_task_modal(&self, f: &mut Frame) {
        let Some(modal) = self.modal.as_ref() else {
            return;
        };
        let editor = modal.editor();
        let area = centered_rect(60, 50, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Task #{}", modal.task_id()))
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(BOARD_BLUE).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        if let Some(input) = editor.input() {
            render_input(f, parts[0], input, "Title", true);
        } else {
            let title = if editor.is_saving() {
                format!("{} (saving...)", editor.displayed())
            } else {
                editor.displayed().to_string()
            };
            let title = Paragraph::new(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
                .block(Block::default().borders(Borders::ALL).title("Title"));
            f.render_widget(title, parts[0]);
        }

        let label = modal.label();
        let mut label_line = vec![
            Span::raw("Label:     "),
            Span::styled(format_label(label), Style::default().fg(label_color(label))),
        ];
        if let ModalAction::ChangingLabel { requested } = modal.action() {
            label_line.push(Span::styled(
                format!(" -> {} (saving...)", format_label(requested)),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let details = vec![
            Line::from(format!("Container: {}", modal.container_name())),
            Line::from(label_line),
        ];
        f.render_widget(Paragraph::new(details).wrap(Wrap { trim: true }), parts[1]);

        let hint = match modal.action() {
            ModalAction::ConfirmingDelete => "Delete this task? y: Delete | any other key: Keep",
            ModalAction::Deleting => "Deleting...",
            _ if editor.is_editing() => "Enter/Tab: Save | Esc: Cancel",
            _ => "Enter/e: Edit title | l: Next label | d: Delete | Esc/q: Close",
        };
        f.render_widget(
            Paragraph::new(hint).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
            parts[2],
        );
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&self, f: &mut Frame) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Board", bold)),
            Line::from("  ←/→ ↑/↓      Navigate containers and tasks"),
            Line::from("  Enter        Open task details"),
            Line::from("  a            Add a task to the selected container"),
            Line::from("  c            Open the chat assistant"),
            Line::from("  r            Reload the board"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Esc/Ctrl+C Quit"),
            Line::from(""),
            Line::from(Span::styled("Task details", bold)),
            Line::from("  Enter/e      Edit the title"),
            Line::from("  Enter/Tab    Save the title while editing"),
            Line::from("  l            Move to the next label"),
            Line::from("  d            Delete the task (y to confirm)"),
            Line::from("  Esc          Cancel editing, or close"),
            Line::from(""),
            Line::from(Span::styled("Add task / Chat", bold)),
            Line::from("  Enter        Submit"),
            Line::from("  Esc          Cancel / close the panel"),
            Line::from("  ↑/↓          Pick a suggested question"),
        ];
        let area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Board => format!(
                    "Tasks: {} | a: Add | Enter: Details | c: Chat | r: Reload | h: Help",
                    self.board.task_count()
                ),
                AppState::TaskModal => "Task Details".to_string(),
                AppState::AddTask(_) => "Add Task | Enter: Create | Esc: Cancel".to_string(),
                AppState::Chat => "Chat | Enter: Send | Esc: Close".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };
        let background = if self.status_is_error { DARK_RED } else { BOARD_BLUE };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(background).fg(text_on(background)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Handle keyboard input
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key) == KeyOutcome::Quit);
            }
        }
        Ok(false)
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        if self.board.cards.is_empty() && self.project_id.is_some() {
            self.reload();
        }
        loop {
            self.poll_remote_events();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn edit_input(input: &mut InputField, code: KeyCode) {
    match code {
        KeyCode::Char(c) => input.handle_char(c),
        KeyCode::Backspace => input.handle_backspace(),
        KeyCode::Delete => input.handle_delete(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_cursor_home(),
        KeyCode::End => input.move_cursor_end(),
        _ => {}
    }
}

fn render_input(f: &mut Frame, area: Rect, input: &InputField, title: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(input.value.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(style);
    f.render_widget(paragraph, area);
    if focused {
        f.set_cursor_position((area.x + input.cursor_column() as u16 + 1, area.y + 1));
    }
}

fn render_add_form(f: &mut Frame, area: Rect, form: &AddTaskForm, focused: bool) {
    match form.phase() {
        FormPhase::Collapsed => {
            let trigger = Paragraph::new("+ Add task (a)")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(trigger, area);
        }
        FormPhase::Open => {
            let title = if form.can_submit() {
                "New task (Enter: Add, Esc: Cancel)"
            } else {
                "New task (Esc: Cancel)"
            };
            render_input(f, area, form.buffer(), title, focused);
        }
        FormPhase::Submitting => {
            let pending = Paragraph::new(format!("Adding '{}'...", form.buffer().value.trim()))
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .block(Block::default().borders(Borders::ALL).title("New task"));
            f.render_widget(pending, area);
        }
    }
}

/// Render a single task card
fn render_card(f: &mut Frame, area: Rect, task: &Task, is_selected: bool) {
    let accent = label_color(task.label);
    let style = if is_selected {
        Style::default().bg(accent).fg(text_on(accent)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let mut card_text = vec![Line::from(format!("#{}", task.id))];
    let available_width = area.width.saturating_sub(2) as usize;
    card_text.extend(wrap_words(&task.name, available_width, 2).into_iter().map(Line::from));
    card_text.push(Line::from(format_label(task.label)));

    let card = Paragraph::new(card_text)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}
