//! Inline "add task" form attached to one container.
//!
//! Collapsed it is just a trigger; opened it shows a text input with confirm
//! and cancel. While a creation request is in flight the form accepts no
//! input and rejects further submissions.

use tracing::{debug, error, info};

use crate::error::RemoteResult;
use crate::remote::{ContainerId, CreatedTask, TaskCreation, TaskService};
use crate::tui::input::InputField;

/// Visible phase of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Collapsed,
    Open,
    Submitting,
}

/// Sent to the owner once the backend has created the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCreated {
    pub container_id: ContainerId,
    pub task: CreatedTask,
}

#[derive(Debug, Clone)]
pub struct AddTaskForm {
    container_id: ContainerId,
    buffer: InputField,
    phase: FormPhase,
}

impl AddTaskForm {
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            buffer: InputField::new(),
            phase: FormPhase::Collapsed,
        }
    }

    pub fn container_id(&self) -> ContainerId {
        self.container_id
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn is_collapsed(&self) -> bool {
        self.phase == FormPhase::Collapsed
    }

    pub fn buffer(&self) -> &InputField {
        &self.buffer
    }

    /// The input buffer, only while the form is open and idle.
    pub fn input_mut(&mut self) -> Option<&mut InputField> {
        match self.phase {
            FormPhase::Open => Some(&mut self.buffer),
            _ => None,
        }
    }

    /// Whether the confirm control is enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Open && !self.buffer.is_blank()
    }

    /// Reveal the input. Text left over from a failed attempt is kept.
    pub fn open(&mut self) {
        if self.phase == FormPhase::Collapsed {
            self.phase = FormPhase::Open;
        }
    }

    /// Discard the input and collapse without contacting the backend.
    ///
    /// Ignored while a submission is pending.
    pub fn cancel(&mut self) {
        if self.phase == FormPhase::Open {
            self.buffer.clear();
            self.phase = FormPhase::Collapsed;
        }
    }

    /// Start creating a task from the trimmed input.
    ///
    /// Returns `None` without any state change if the input is blank, the
    /// form is collapsed, or a submission is already pending.
    pub fn submit(&mut self) -> Option<TaskCreation> {
        if !self.can_submit() {
            debug!(container_id = %self.container_id, phase = ?self.phase, "add-task submission rejected");
            return None;
        }
        self.phase = FormPhase::Submitting;
        Some(TaskCreation {
            container_id: self.container_id,
            name: self.buffer.value.trim().to_string(),
        })
    }

    /// Apply the backend's answer and collapse the form.
    ///
    /// The input is cleared only on success; after a failure reopening the
    /// form shows the text that was rejected.
    pub fn finish_submit(&mut self, outcome: RemoteResult<CreatedTask>) -> Option<TaskCreated> {
        if self.phase != FormPhase::Submitting {
            debug!(container_id = %self.container_id, "task creation result with no submission pending, ignoring");
            return None;
        }
        self.phase = FormPhase::Collapsed;
        match outcome {
            Ok(task) => {
                info!(container_id = %self.container_id, task_id = %task.id, "task created");
                self.buffer.clear();
                Some(TaskCreated {
                    container_id: self.container_id,
                    task,
                })
            }
            Err(e) => {
                error!(container_id = %self.container_id, error = %e, "error adding task");
                None
            }
        }
    }

    /// Run a full submission against `service`.
    ///
    /// `None` means the submission was rejected locally and nothing was sent.
    /// A backend failure is applied to the form and then handed back.
    pub async fn submit_with(
        &mut self,
        service: &dyn TaskService,
    ) -> Option<RemoteResult<TaskCreated>> {
        let creation = self.submit()?;
        let outcome = service.create_task(&creation).await;
        let created = self.finish_submit(outcome.clone());
        let container_id = self.container_id;
        Some(outcome.map(|task| created.unwrap_or(TaskCreated { container_id, task })))
    }
}
