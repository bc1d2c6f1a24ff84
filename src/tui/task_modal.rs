//! Detail modal for one task.
//!
//! The modal hosts the title editor and two more actions on the same task:
//! moving it to another progress label and deleting it. Each action follows
//! the title editor's split between a `begin_*` step that yields the request
//! and a `finish_*` step that applies the backend's answer. Only one action
//! may be in flight at a time.

use tracing::{debug, error, info};

use crate::board::Task;
use crate::error::RemoteResult;
use crate::fields::TaskLabel;
use crate::remote::{LabelUpdate, TaskId, TaskService};
use crate::tui::title_editor::TitleEditor;

/// Label or delete action the modal is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Idle,
    /// A label change is with the backend.
    ChangingLabel { requested: TaskLabel },
    /// Delete was requested and waits for confirmation.
    ConfirmingDelete,
    /// A delete is with the backend.
    Deleting,
}

/// Sent to the owner once the backend has confirmed a label change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelChanged {
    pub task_id: TaskId,
    pub label: TaskLabel,
}

/// Sent to the owner once the backend has deleted the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRemoved {
    pub task_id: TaskId,
}

#[derive(Debug, Clone)]
pub struct TaskModal {
    editor: TitleEditor,
    container_name: String,
    label: TaskLabel,
    action: ModalAction,
}

impl TaskModal {
    /// Open the modal for `task`, shown as belonging to `container_name`.
    pub fn new(task: &Task, container_name: impl Into<String>) -> Self {
        Self {
            editor: TitleEditor::new(task.id, task.name.clone()),
            container_name: container_name.into(),
            label: task.label,
            action: ModalAction::Idle,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.editor.task_id()
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// The last label the backend confirmed.
    pub fn label(&self) -> TaskLabel {
        self.label
    }

    pub fn action(&self) -> ModalAction {
        self.action
    }

    pub fn editor(&self) -> &TitleEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TitleEditor {
        &mut self.editor
    }

    /// True while any request for this task is with the backend.
    pub fn is_busy(&self) -> bool {
        self.editor.is_saving()
            || matches!(
                self.action,
                ModalAction::ChangingLabel { .. } | ModalAction::Deleting
            )
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.action == ModalAction::ConfirmingDelete
    }

    fn accepts_action(&self) -> bool {
        self.action == ModalAction::Idle && !self.editor.is_editing()
    }

    /// Start moving the task to `label`.
    ///
    /// Returns `None` if the label is the current one, the title is being
    /// edited, or another action is pending.
    pub fn begin_label_change(&mut self, label: TaskLabel) -> Option<LabelUpdate> {
        if !self.accepts_action() || label == self.label {
            return None;
        }
        self.action = ModalAction::ChangingLabel { requested: label };
        Some(LabelUpdate {
            task_id: self.task_id(),
            label,
        })
    }

    /// Start moving the task to the label after the current one.
    pub fn cycle_label(&mut self) -> Option<LabelUpdate> {
        self.begin_label_change(self.label.next())
    }

    /// Apply the backend's answer to a pending label change.
    ///
    /// A failure keeps the confirmed label and is only logged.
    pub fn finish_label_change(&mut self, outcome: RemoteResult<()>) -> Option<LabelChanged> {
        let ModalAction::ChangingLabel { requested } = self.action else {
            debug!(task_id = %self.task_id(), "label result with no change pending, ignoring");
            return None;
        };
        self.action = ModalAction::Idle;
        match outcome {
            Ok(()) => {
                info!(task_id = %self.task_id(), label = ?requested, "task label updated");
                self.label = requested;
                Some(LabelChanged {
                    task_id: self.task_id(),
                    label: requested,
                })
            }
            Err(e) => {
                error!(task_id = %self.task_id(), error = %e, "error updating task label");
                None
            }
        }
    }

    /// Ask for delete confirmation. Returns false if the modal is busy.
    pub fn request_delete(&mut self) -> bool {
        if !self.accepts_action() {
            return false;
        }
        self.action = ModalAction::ConfirmingDelete;
        true
    }

    /// Withdraw an unconfirmed delete request.
    pub fn cancel_delete(&mut self) {
        if self.action == ModalAction::ConfirmingDelete {
            self.action = ModalAction::Idle;
        }
    }

    /// Confirm a requested delete and return the task to delete.
    pub fn confirm_delete(&mut self) -> Option<TaskId> {
        if self.action != ModalAction::ConfirmingDelete {
            return None;
        }
        self.action = ModalAction::Deleting;
        Some(self.task_id())
    }

    /// Apply the backend's answer to a pending delete.
    ///
    /// On success the owner should drop the task and close the modal. A
    /// failure returns the modal to idle and is only logged.
    pub fn finish_delete(&mut self, outcome: RemoteResult<()>) -> Option<TaskRemoved> {
        if self.action != ModalAction::Deleting {
            debug!(task_id = %self.task_id(), "delete result with no delete pending, ignoring");
            return None;
        }
        self.action = ModalAction::Idle;
        match outcome {
            Ok(()) => {
                info!(task_id = %self.task_id(), "task deleted");
                Some(TaskRemoved {
                    task_id: self.task_id(),
                })
            }
            Err(e) => {
                error!(task_id = %self.task_id(), error = %e, "error deleting task");
                None
            }
        }
    }

    /// Run a full label change against `service`.
    ///
    /// `Ok(None)` means the change was refused and nothing was sent.
    pub async fn change_label_with(
        &mut self,
        service: &dyn TaskService,
        label: TaskLabel,
    ) -> RemoteResult<Option<LabelChanged>> {
        let Some(update) = self.begin_label_change(label) else {
            return Ok(None);
        };
        let outcome = service.update_task_label(&update).await;
        let changed = self.finish_label_change(outcome.clone());
        outcome.map(|()| changed)
    }

    /// Run a confirmed delete against `service`.
    ///
    /// `Ok(None)` means no delete was awaiting confirmation.
    pub async fn delete_with(
        &mut self,
        service: &dyn TaskService,
    ) -> RemoteResult<Option<TaskRemoved>> {
        let Some(task_id) = self.confirm_delete() else {
            return Ok(None);
        };
        let outcome = service.delete_task(task_id).await;
        let removed = self.finish_delete(outcome.clone());
        outcome.map(|()| removed)
    }
}
