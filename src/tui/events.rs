//! Background remote calls for the board UI.
//!
//! The render loop never awaits. It spawns one of the `run_*` tasks onto the
//! ambient tokio runtime and drains the resulting [`RemoteEvent`]s on the next
//! tick.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::board::ProjectBoard;
use crate::error::RemoteResult;
use crate::remote::{
    ChatRequest, ChatService, ContainerId, CreatedTask, LabelUpdate, ProjectId, TaskCreation,
    TaskId, TaskService, TitleUpdate,
};

pub const REMOTE_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outcome of a remote call, tagged with what it was for.
#[derive(Debug)]
pub enum RemoteEvent {
    ProjectLoaded(RemoteResult<ProjectBoard>),
    TitleUpdated {
        task_id: TaskId,
        outcome: RemoteResult<()>,
    },
    LabelUpdated {
        task_id: TaskId,
        outcome: RemoteResult<()>,
    },
    TaskCreated {
        container_id: ContainerId,
        outcome: RemoteResult<CreatedTask>,
    },
    TaskDeleted {
        task_id: TaskId,
        outcome: RemoteResult<()>,
    },
    ChatReplied(RemoteResult<String>),
}

async fn deliver(sender: &mpsc::Sender<RemoteEvent>, event: RemoteEvent) {
    if sender.send(event).await.is_err() {
        warn!("board UI closed before a remote result was delivered");
    }
}

pub async fn run_fetch_project_task(
    service: Arc<dyn TaskService>,
    project_id: ProjectId,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.fetch_project(project_id).await;
    deliver(&sender, RemoteEvent::ProjectLoaded(outcome)).await;
}

pub async fn run_update_title_task(
    service: Arc<dyn TaskService>,
    update: TitleUpdate,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.update_task_title(&update).await;
    deliver(
        &sender,
        RemoteEvent::TitleUpdated {
            task_id: update.task_id,
            outcome,
        },
    )
    .await;
}

pub async fn run_update_label_task(
    service: Arc<dyn TaskService>,
    update: LabelUpdate,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.update_task_label(&update).await;
    deliver(
        &sender,
        RemoteEvent::LabelUpdated {
            task_id: update.task_id,
            outcome,
        },
    )
    .await;
}

pub async fn run_delete_task_task(
    service: Arc<dyn TaskService>,
    task_id: TaskId,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.delete_task(task_id).await;
    deliver(&sender, RemoteEvent::TaskDeleted { task_id, outcome }).await;
}

pub async fn run_create_task_task(
    service: Arc<dyn TaskService>,
    creation: TaskCreation,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.create_task(&creation).await;
    deliver(
        &sender,
        RemoteEvent::TaskCreated {
            container_id: creation.container_id,
            outcome,
        },
    )
    .await;
}

pub async fn run_chat_task(
    service: Arc<dyn ChatService>,
    request: ChatRequest,
    sender: mpsc::Sender<RemoteEvent>,
) {
    let outcome = service.send_message(&request).await;
    deliver(&sender, RemoteEvent::ChatReplied(outcome)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{FakeChatService, FakeTaskService};

    #[tokio::test]
    async fn create_task_event_carries_container() {
        let (sender, mut receiver) = mpsc::channel(REMOTE_EVENT_CHANNEL_CAPACITY);
        let service: Arc<dyn TaskService> = Arc::new(FakeTaskService::default());

        run_create_task_task(
            service,
            TaskCreation {
                container_id: ContainerId(8),
                name: "Spike".to_string(),
            },
            sender,
        )
        .await;

        match receiver.recv().await {
            Some(RemoteEvent::TaskCreated {
                container_id,
                outcome: Ok(task),
            }) => {
                assert_eq!(container_id, ContainerId(8));
                assert_eq!(task.name, "Spike");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_event_carries_task_id() {
        let (sender, mut receiver) = mpsc::channel(REMOTE_EVENT_CHANNEL_CAPACITY);
        let fake = Arc::new(FakeTaskService::default());
        let service: Arc<dyn TaskService> = fake.clone();

        run_delete_task_task(service, TaskId(12), sender).await;

        assert!(matches!(
            receiver.recv().await,
            Some(RemoteEvent::TaskDeleted {
                task_id: TaskId(12),
                outcome: Ok(()),
            })
        ));
        assert_eq!(fake.deleted(), vec![TaskId(12)]);
    }

    #[tokio::test]
    async fn failures_are_delivered_as_events() {
        let (sender, mut receiver) = mpsc::channel(REMOTE_EVENT_CHANNEL_CAPACITY);
        let chat: Arc<dyn ChatService> = Arc::new(FakeChatService::default());

        run_chat_task(
            chat,
            ChatRequest {
                message: "hello".to_string(),
            },
            sender,
        )
        .await;

        assert!(matches!(
            receiver.recv().await,
            Some(RemoteEvent::ChatReplied(Err(_)))
        ));
    }

    #[tokio::test]
    async fn closed_receiver_does_not_panic() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let service: Arc<dyn TaskService> = Arc::new(FakeTaskService::default());
        run_update_title_task(
            service,
            TitleUpdate {
                task_id: TaskId(1),
                title: "x".to_string(),
            },
            sender,
        )
        .await;
    }
}
