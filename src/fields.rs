//! Enumerations and field types for board tasks.
//!
//! The backend tracks a task's progress as a label string (`TODO`,
//! `INPROGRESS`, `DONE`); this module gives it a typed form.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Progress label attached to every task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum TaskLabel {
    #[default]
    #[serde(rename = "TODO", alias = "todo")]
    Todo,
    #[serde(rename = "INPROGRESS", alias = "in-progress")]
    InProgress,
    #[serde(rename = "DONE", alias = "done")]
    Done,
}

impl TaskLabel {
    /// The label after this one, wrapping from done back to to-do.
    pub fn next(self) -> TaskLabel {
        match self {
            TaskLabel::Todo => TaskLabel::InProgress,
            TaskLabel::InProgress => TaskLabel::Done,
            TaskLabel::Done => TaskLabel::Todo,
        }
    }
}

/// Format a task label for display.
pub fn format_label(label: TaskLabel) -> &'static str {
    match label {
        TaskLabel::Todo => "To Do",
        TaskLabel::InProgress => "In Progress",
        TaskLabel::Done => "Done",
    }
}
