//! Inline editor for a task title.
//!
//! The editor toggles between showing the committed title and editing a
//! working copy. Committing is split in two so the UI loop never blocks:
//! [`TitleEditor::begin_commit`] produces the request to send, and
//! [`TitleEditor::finish_commit`] applies the backend's answer. Edit mode is
//! only left once that answer (or a no-op decision) is in.

use tracing::{debug, error, info};

use crate::error::RemoteResult;
use crate::remote::{TaskId, TaskService, TitleUpdate};
use crate::tui::input::InputField;

/// Where the editor is in its edit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleEditorState {
    /// Showing the committed title.
    Display,
    /// The user is changing the working copy.
    Editing { input: InputField },
    /// A changed title is with the backend; edit mode ends when it answers.
    Saving { submitted: String },
}

/// Sent to the owner once the backend has confirmed a new title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSaved {
    pub task_id: TaskId,
    pub title: String,
}

/// Display/edit controller for one task's title.
#[derive(Debug, Clone)]
pub struct TitleEditor {
    task_id: TaskId,
    committed: String,
    state: TitleEditorState,
}

impl TitleEditor {
    pub fn new(task_id: TaskId, committed: impl Into<String>) -> Self {
        Self {
            task_id,
            committed: committed.into(),
            state: TitleEditorState::Display,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// The last title the backend confirmed.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn state(&self) -> &TitleEditorState {
        &self.state
    }

    /// True from `enter_edit` until the commit attempt resolves.
    pub fn is_editing(&self) -> bool {
        !matches!(self.state, TitleEditorState::Display)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, TitleEditorState::Saving { .. })
    }

    /// Text to render in the title slot.
    pub fn displayed(&self) -> &str {
        match &self.state {
            TitleEditorState::Display => &self.committed,
            TitleEditorState::Editing { input } => &input.value,
            TitleEditorState::Saving { submitted } => submitted,
        }
    }

    /// The working buffer, only while editing.
    pub fn input_mut(&mut self) -> Option<&mut InputField> {
        match &mut self.state {
            TitleEditorState::Editing { input } => Some(input),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&InputField> {
        match &self.state {
            TitleEditorState::Editing { input } => Some(input),
            _ => None,
        }
    }

    /// Switch to edit mode with the committed title in the buffer.
    ///
    /// Returns false if already editing or a save is pending.
    pub fn enter_edit(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.state = TitleEditorState::Editing {
            input: InputField::with_value(&self.committed),
        };
        true
    }

    /// Drop the working copy and go back to display mode.
    pub fn cancel(&mut self) {
        if let TitleEditorState::Editing { .. } = self.state {
            self.state = TitleEditorState::Display;
        }
    }

    /// Start committing the working copy (blur or confirm key).
    ///
    /// Unchanged text leaves edit mode immediately and returns `None`.
    /// Changed text moves to `Saving` and returns the request to send.
    pub fn begin_commit(&mut self) -> Option<TitleUpdate> {
        let TitleEditorState::Editing { input } = &self.state else {
            return None;
        };
        if input.value == self.committed {
            self.state = TitleEditorState::Display;
            return None;
        }
        let submitted = input.value.clone();
        self.state = TitleEditorState::Saving {
            submitted: submitted.clone(),
        };
        Some(TitleUpdate {
            task_id: self.task_id,
            title: submitted,
        })
    }

    /// Apply the backend's answer to a pending save and leave edit mode.
    ///
    /// On success the submitted text becomes the committed title and the
    /// returned notification should be forwarded to the owner. On failure the
    /// committed title is kept and the error is only logged.
    pub fn finish_commit(&mut self, outcome: RemoteResult<()>) -> Option<TitleSaved> {
        let TitleEditorState::Saving { submitted } =
            std::mem::replace(&mut self.state, TitleEditorState::Display)
        else {
            debug!(task_id = %self.task_id, "title update result with no save pending, ignoring");
            return None;
        };
        match outcome {
            Ok(()) => {
                info!(task_id = %self.task_id, title = %submitted, "task title updated");
                self.committed = submitted;
                Some(TitleSaved {
                    task_id: self.task_id,
                    title: self.committed.clone(),
                })
            }
            Err(e) => {
                error!(task_id = %self.task_id, error = %e, "error updating task title");
                None
            }
        }
    }

    /// Run a full commit against `service`.
    ///
    /// `Ok(None)` means the title was unchanged and nothing was sent. A
    /// rejected update is applied like any other failure and then handed
    /// back to the caller.
    pub async fn commit_with(
        &mut self,
        service: &dyn TaskService,
    ) -> RemoteResult<Option<TitleSaved>> {
        let Some(update) = self.begin_commit() else {
            return Ok(None);
        };
        let outcome = service.update_task_title(&update).await;
        let saved = self.finish_commit(outcome.clone());
        outcome.map(|()| saved)
    }
}
