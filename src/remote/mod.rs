//! Remote service boundary.
//!
//! The interactive components never talk HTTP directly; they hand a request
//! value to one of these traits and get back a `RemoteResult`. The production
//! implementations live in [`http`], tests substitute their own.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::{ProjectBoard, Task};
use crate::error::RemoteResult;
use crate::fields::TaskLabel;

pub mod http;

/// Backend identifier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

/// Backend identifier of a task container (a card column on the board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

/// Backend identifier of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to rename a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleUpdate {
    pub task_id: TaskId,
    pub title: String,
}

/// Request to move a task to another progress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelUpdate {
    pub task_id: TaskId,
    pub label: TaskLabel,
}

/// Request to create a task inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCreation {
    pub container_id: ContainerId,
    pub name: String,
}

/// Request to send one message to the chat assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
}

/// Task as confirmed by the backend after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    pub id: TaskId,
    pub name: String,
}

impl From<CreatedTask> for Task {
    fn from(created: CreatedTask) -> Self {
        Task {
            id: created.id,
            name: created.name,
            label: TaskLabel::Todo,
        }
    }
}

/// Task operations offered by the project backend.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn update_task_title(&self, update: &TitleUpdate) -> RemoteResult<()>;

    async fn update_task_label(&self, update: &LabelUpdate) -> RemoteResult<()>;

    async fn create_task(&self, creation: &TaskCreation) -> RemoteResult<CreatedTask>;

    async fn delete_task(&self, task_id: TaskId) -> RemoteResult<()>;

    async fn fetch_project(&self, project_id: ProjectId) -> RemoteResult<ProjectBoard>;
}

/// Conversational assistant.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a message and wait for the assistant's reply text.
    async fn send_message(&self, request: &ChatRequest) -> RemoteResult<String>;
}
