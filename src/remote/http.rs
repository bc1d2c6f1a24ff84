//! HTTP implementations of the remote services.
//!
//! Every call is attempted exactly once. Transport failures, non-success
//! statuses and undecodable bodies all collapse into a `RemoteError` carrying
//! a diagnostic string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    ChatRequest, ChatService, ContainerId, CreatedTask, LabelUpdate, ProjectId, TaskCreation,
    TaskId, TaskService, TitleUpdate,
};
use crate::board::ProjectBoard;
use crate::error::{AppError, AppResult, RemoteError, RemoteResult};
use crate::fields::TaskLabel;

const UPDATE_TITLE_PATH: &str = "/api/v1/updateTaskTitle";
const UPDATE_LABEL_PATH: &str = "/api/v1/updateTaskLabel";
const CREATE_TASK_PATH: &str = "/api/v1/createTask";
const DELETE_TASK_PATH: &str = "/api/v1/deleteTask";
const PROJECTS_PATH: &str = "/api/v1/projects";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTitleBody<'a> {
    task_id: TaskId,
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLabelBody {
    task_id: TaskId,
    label: TaskLabel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody<'a> {
    card_id: ContainerId,
    title: &'a str,
    label: TaskLabel,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// Build the shared HTTP client with a per-request timeout.
pub fn build_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(AppError::HttpClient)
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(RemoteError::new(format!("status {status}: {text}")))
}

/// Task operations against the project backend.
#[derive(Clone)]
pub struct HttpTaskService {
    client: Client,
    base_url: String,
}

impl HttpTaskService {
    /// `base_url` is the API origin without a trailing slash.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn update_task_title(&self, update: &TitleUpdate) -> RemoteResult<()> {
        debug!(task_id = %update.task_id, "sending task title update");
        let response = self
            .client
            .patch(self.url(UPDATE_TITLE_PATH))
            .json(&UpdateTitleBody {
                task_id: update.task_id,
                title: &update.title,
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_task_label(&self, update: &LabelUpdate) -> RemoteResult<()> {
        debug!(task_id = %update.task_id, label = ?update.label, "sending task label update");
        let response = self
            .client
            .patch(self.url(UPDATE_LABEL_PATH))
            .json(&UpdateLabelBody {
                task_id: update.task_id,
                label: update.label,
            })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: TaskId) -> RemoteResult<()> {
        debug!(%task_id, "sending task deletion");
        let response = self
            .client
            .delete(self.url(&format!("{DELETE_TASK_PATH}/{task_id}")))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn create_task(&self, creation: &TaskCreation) -> RemoteResult<CreatedTask> {
        debug!(container_id = %creation.container_id, "sending task creation");
        let response = self
            .client
            .post(self.url(CREATE_TASK_PATH))
            .json(&CreateTaskBody {
                card_id: creation.container_id,
                title: &creation.name,
                label: TaskLabel::Todo,
            })
            .send()
            .await?;
        let id: TaskId = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::new(format!("invalid task id in response: {e}")))?;
        Ok(CreatedTask {
            id,
            name: creation.name.clone(),
        })
    }

    async fn fetch_project(&self, project_id: ProjectId) -> RemoteResult<ProjectBoard> {
        debug!(%project_id, "fetching project board");
        let response = self
            .client
            .get(self.url(&format!("{PROJECTS_PATH}/{project_id}")))
            .send()
            .await?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::new(format!("invalid project payload: {e}")))
    }
}

/// Chat assistant reached at a single endpoint.
#[derive(Clone)]
pub struct HttpChatService {
    client: Client,
    endpoint: String,
}

impl HttpChatService {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send_message(&self, request: &ChatRequest) -> RemoteResult<String> {
        debug!(chars = request.message.chars().count(), "sending chat message");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatBody {
                message: &request.message,
            })
            .send()
            .await?;
        let reply: ChatReply = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::new(format!("invalid chat reply: {e}")))?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, patch, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    #[derive(Clone, Default)]
    struct MockState {
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    async fn update_title(State(state): State<MockState>, Json(body): Json<Value>) -> StatusCode {
        state.bodies.lock().expect("bodies lock").push(body);
        StatusCode::OK
    }

    async fn update_label(State(state): State<MockState>, Json(body): Json<Value>) -> StatusCode {
        state.bodies.lock().expect("bodies lock").push(body);
        StatusCode::OK
    }

    async fn delete_task(State(state): State<MockState>, Path(id): Path<u64>) -> Json<u64> {
        state
            .bodies
            .lock()
            .expect("bodies lock")
            .push(json!({ "deleted": id }));
        Json(id)
    }

    async fn create_task(State(state): State<MockState>, Json(body): Json<Value>) -> Json<u64> {
        state.bodies.lock().expect("bodies lock").push(body);
        Json(42)
    }

    async fn project(Path(id): Path<u64>) -> Json<Value> {
        Json(json!({
            "id": id,
            "name": "Roadmap",
            "cards": [{"id": 5, "name": "Backlog", "tasks": [{"id": 50, "name": "Draft"}]}]
        }))
    }

    async fn chat(Json(body): Json<Value>) -> Json<Value> {
        let message = body["message"].as_str().unwrap_or_default();
        Json(json!({ "response": format!("echo: {message}") }))
    }

    async fn broken() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn spawn_mock_server(router: Router) -> (String, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server listener");
        let address: SocketAddr = listener.local_addr().expect("mock listener local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("run mock server");
        });
        (format!("http://{address}"), shutdown_tx)
    }

    fn healthy_router(state: MockState) -> Router {
        Router::new()
            .route(UPDATE_TITLE_PATH, patch(update_title))
            .route(UPDATE_LABEL_PATH, patch(update_label))
            .route(CREATE_TASK_PATH, post(create_task))
            .route("/api/v1/deleteTask/{id}", delete(delete_task))
            .route("/api/v1/projects/{id}", get(project))
            .route("/chat", post(chat))
            .with_state(state)
    }

    fn client() -> Client {
        build_client(Duration::from_secs(3)).expect("build client")
    }

    #[tokio::test]
    async fn update_title_sends_task_id_and_title() {
        let state = MockState::default();
        let (base_url, shutdown) = spawn_mock_server(healthy_router(state.clone())).await;
        let service = HttpTaskService::new(client(), base_url);

        service
            .update_task_title(&TitleUpdate {
                task_id: TaskId(9),
                title: "Ship it".to_string(),
            })
            .await
            .expect("update succeeds");

        let bodies = state.bodies.lock().unwrap().clone();
        assert_eq!(bodies, vec![json!({"taskId": 9, "title": "Ship it"})]);
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn update_label_sends_wire_label() {
        let state = MockState::default();
        let (base_url, shutdown) = spawn_mock_server(healthy_router(state.clone())).await;
        let service = HttpTaskService::new(client(), base_url);

        service
            .update_task_label(&LabelUpdate {
                task_id: TaskId(9),
                label: TaskLabel::InProgress,
            })
            .await
            .expect("label update succeeds");

        let bodies = state.bodies.lock().unwrap().clone();
        assert_eq!(bodies, vec![json!({"taskId": 9, "label": "INPROGRESS"})]);
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn delete_task_targets_task_path() {
        let state = MockState::default();
        let (base_url, shutdown) = spawn_mock_server(healthy_router(state.clone())).await;
        let service = HttpTaskService::new(client(), base_url);

        service.delete_task(TaskId(31)).await.expect("delete succeeds");

        let bodies = state.bodies.lock().unwrap().clone();
        assert_eq!(bodies, vec![json!({"deleted": 31})]);
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn create_task_returns_backend_id() {
        let state = MockState::default();
        let (base_url, shutdown) = spawn_mock_server(healthy_router(state.clone())).await;
        let service = HttpTaskService::new(client(), base_url);

        let created = service
            .create_task(&TaskCreation {
                container_id: ContainerId(5),
                name: "Write tests".to_string(),
            })
            .await
            .expect("creation succeeds");

        assert_eq!(
            created,
            CreatedTask {
                id: TaskId(42),
                name: "Write tests".to_string()
            }
        );
        let bodies = state.bodies.lock().unwrap().clone();
        assert_eq!(
            bodies,
            vec![json!({"cardId": 5, "title": "Write tests", "label": "TODO"})]
        );
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn fetch_project_decodes_board() {
        let (base_url, shutdown) = spawn_mock_server(healthy_router(MockState::default())).await;
        let service = HttpTaskService::new(client(), base_url);

        let board = service.fetch_project(ProjectId(3)).await.expect("fetch succeeds");
        assert_eq!(board.id, ProjectId(3));
        assert_eq!(board.name, "Roadmap");
        assert_eq!(board.cards[0].tasks[0].id, TaskId(50));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn chat_returns_response_field() {
        let (base_url, shutdown) = spawn_mock_server(healthy_router(MockState::default())).await;
        let service = HttpChatService::new(client(), format!("{base_url}/chat"));

        let reply = service
            .send_message(&ChatRequest {
                message: "What is Kanban?".to_string(),
            })
            .await
            .expect("chat succeeds");
        assert_eq!(reply, "echo: What is Kanban?");
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn server_errors_become_remote_errors() {
        let router = Router::new()
            .route(UPDATE_TITLE_PATH, patch(broken))
            .route("/api/v1/deleteTask/{id}", delete(broken))
            .route("/chat", post(broken));
        let (base_url, shutdown) = spawn_mock_server(router).await;
        let tasks = HttpTaskService::new(client(), base_url.clone());
        let chat = HttpChatService::new(client(), format!("{base_url}/chat"));

        let error = tasks
            .update_task_title(&TitleUpdate {
                task_id: TaskId(1),
                title: "x".to_string(),
            })
            .await
            .expect_err("500 is a failure");
        assert!(error.detail().contains("500"));
        assert!(error.detail().contains("boom"));

        let error = tasks.delete_task(TaskId(1)).await.expect_err("500 is a failure");
        assert!(error.detail().contains("500"));

        let error = chat
            .send_message(&ChatRequest {
                message: "hi".to_string(),
            })
            .await
            .expect_err("500 is a failure");
        assert!(error.detail().contains("500"));
        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_remote_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("addr");
        drop(listener);

        let service = HttpTaskService::new(client(), format!("http://{address}"));
        let result = service
            .create_task(&TaskCreation {
                container_id: ContainerId(1),
                name: "lost".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
