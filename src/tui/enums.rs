//! Enumerations for TUI state management.

use crate::remote::ContainerId;

/// Which surface of the board UI has keyboard focus.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    /// Navigating the kanban columns.
    Board,
    /// The task detail modal is open over the board.
    TaskModal,
    /// Typing into the add-task form of one container.
    AddTask(ContainerId),
    /// The chat panel is open and focused.
    Chat,
    Help,
}

/// Outcome of handling one key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyOutcome {
    Continue,
    Quit,
}
