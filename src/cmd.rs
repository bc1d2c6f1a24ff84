//! Command implementations for the CLI interface.
//!
//! Every one-shot command drives the same interactive components the board UI
//! uses, so a rename from the shell follows exactly the rules of a rename in
//! the task modal. Remote failures are printed on stderr and exit with status 1.

use std::sync::Arc;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tokio::runtime::Runtime;

use crate::board::{print_board, ProjectBoard};
use crate::error::{AppError, AppResult};
use crate::fields::{format_label, TaskLabel};
use crate::remote::{ChatService, ContainerId, ProjectId, TaskId, TaskService};
use crate::tui::{
    add_task_form::{AddTaskForm, TaskCreated},
    app::BoardApp,
    chat::ChatWidget,
    run::run_board_tui,
    task_modal::{LabelChanged, TaskModal, TaskRemoved},
    title_editor::{TitleEditor, TitleSaved},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive board (default).
    Ui,

    /// Create a task in a container.
    Add {
        /// Container (card) the task goes into.
        container_id: u64,
        /// Task name; surrounding whitespace is trimmed.
        name: String,
    },

    /// Rename a task.
    Rename {
        task_id: u64,
        /// New title, sent exactly as given.
        title: String,
        /// Current title. Looked up on the project board when omitted.
        #[arg(long)]
        current: Option<String>,
    },

    /// Move a task to another progress label.
    Label {
        task_id: u64,
        #[arg(value_enum)]
        label: TaskLabel,
    },

    /// Delete a task.
    Delete {
        task_id: u64,
    },

    /// Ask the chat assistant one question.
    Chat {
        message: String,
    },

    /// Print the project board.
    Show {
        /// Only list tasks with this label.
        #[arg(long, value_enum)]
        label: Option<TaskLabel>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Remote services and the selected project, shared by every command.
#[derive(Clone)]
pub struct Services {
    pub tasks: Arc<dyn TaskService>,
    pub chat: Arc<dyn ChatService>,
    pub project_id: Option<ProjectId>,
}

fn exit_on_error<T>(result: AppResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn require_project(project_id: Option<ProjectId>) -> AppResult<ProjectId> {
    project_id.ok_or_else(|| AppError::usage("no project selected; pass --project or set project_id"))
}

/// Launch the terminal board UI.
pub fn cmd_ui(services: &Services) {
    let app = BoardApp::new(
        services.project_id,
        Arc::clone(&services.tasks),
        Arc::clone(&services.chat),
    );
    if let Err(e) = run_board_tui(app) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

pub async fn add_task(
    service: &dyn TaskService,
    container_id: ContainerId,
    name: &str,
) -> AppResult<TaskCreated> {
    let mut form = AddTaskForm::new(container_id);
    form.open();
    if let Some(input) = form.input_mut() {
        input.set(name);
    }
    let outcome = form
        .submit_with(service)
        .await
        .ok_or_else(|| AppError::usage("task name must not be blank"))?;
    Ok(outcome?)
}

pub fn cmd_add(runtime: &Runtime, services: &Services, container_id: u64, name: String) {
    let created = exit_on_error(runtime.block_on(add_task(
        services.tasks.as_ref(),
        ContainerId(container_id),
        &name,
    )));
    println!(
        "Created task {}: {} in container {}",
        created.task.id, created.task.name, created.container_id
    );
}

/// Rename a task; `Ok(None)` means the title was unchanged and nothing was sent.
pub async fn rename_task(
    service: &dyn TaskService,
    project_id: Option<ProjectId>,
    task_id: TaskId,
    title: &str,
    current: Option<String>,
) -> AppResult<Option<TitleSaved>> {
    let committed = match (current, project_id) {
        (Some(current), _) => current,
        (None, Some(project_id)) => {
            let board = service.fetch_project(project_id).await?;
            let (_, task) = board.task(task_id).ok_or_else(|| {
                AppError::usage(format!("task {task_id} is not on project {project_id}"))
            })?;
            task.name.clone()
        }
        (None, None) => {
            return Err(AppError::usage(
                "pass --current or select a project so the current title can be looked up",
            ))
        }
    };

    let mut editor = TitleEditor::new(task_id, committed);
    editor.enter_edit();
    if let Some(input) = editor.input_mut() {
        input.set(title);
    }
    Ok(editor.commit_with(service).await?)
}

pub fn cmd_rename(
    runtime: &Runtime,
    services: &Services,
    task_id: u64,
    title: String,
    current: Option<String>,
) {
    let saved = exit_on_error(runtime.block_on(rename_task(
        services.tasks.as_ref(),
        services.project_id,
        TaskId(task_id),
        &title,
        current,
    )));
    match saved {
        Some(saved) => println!("Renamed task {} to '{}'", saved.task_id, saved.title),
        None => println!("Title unchanged; nothing sent"),
    }
}

/// Open the task modal for `task_id` as it is on the selected project.
async fn load_task_modal(
    service: &dyn TaskService,
    project_id: Option<ProjectId>,
    task_id: TaskId,
) -> AppResult<TaskModal> {
    let project_id = require_project(project_id)?;
    let board = service.fetch_project(project_id).await?;
    let (container, task) = board.task(task_id).ok_or_else(|| {
        AppError::usage(format!("task {task_id} is not on project {project_id}"))
    })?;
    Ok(TaskModal::new(task, container.name.clone()))
}

/// Relabel a task; `Ok(None)` means it already had `label`.
pub async fn relabel_task(
    service: &dyn TaskService,
    project_id: Option<ProjectId>,
    task_id: TaskId,
    label: TaskLabel,
) -> AppResult<Option<LabelChanged>> {
    let mut modal = load_task_modal(service, project_id, task_id).await?;
    Ok(modal.change_label_with(service, label).await?)
}

pub fn cmd_label(runtime: &Runtime, services: &Services, task_id: u64, label: TaskLabel) {
    let changed = exit_on_error(runtime.block_on(relabel_task(
        services.tasks.as_ref(),
        services.project_id,
        TaskId(task_id),
        label,
    )));
    match changed {
        Some(changed) => println!(
            "Moved task {} to {}",
            changed.task_id,
            format_label(changed.label)
        ),
        None => println!("Task already {}; nothing sent", format_label(label)),
    }
}

pub async fn delete_task(
    service: &dyn TaskService,
    project_id: Option<ProjectId>,
    task_id: TaskId,
) -> AppResult<TaskRemoved> {
    let mut modal = load_task_modal(service, project_id, task_id).await?;
    modal.request_delete();
    modal
        .delete_with(service)
        .await?
        .ok_or_else(|| AppError::usage(format!("task {task_id} could not be deleted")))
}

pub fn cmd_delete(runtime: &Runtime, services: &Services, task_id: u64) {
    let removed = exit_on_error(runtime.block_on(delete_task(
        services.tasks.as_ref(),
        services.project_id,
        TaskId(task_id),
    )));
    println!("Deleted task {}", removed.task_id);
}

pub async fn ask_chat(service: &dyn ChatService, message: &str) -> AppResult<String> {
    let mut chat = ChatWidget::new();
    chat.open();
    let outcome = chat
        .send_with(service, message)
        .await
        .ok_or_else(|| AppError::usage("message must not be blank"))?;
    Ok(outcome?)
}

pub fn cmd_chat(runtime: &Runtime, services: &Services, message: String) {
    let reply = exit_on_error(runtime.block_on(ask_chat(services.chat.as_ref(), &message)));
    println!("{reply}");
}

pub async fn fetch_board(services: &Services) -> AppResult<ProjectBoard> {
    let project_id = require_project(services.project_id)?;
    Ok(services.tasks.fetch_project(project_id).await?)
}

pub fn cmd_show(runtime: &Runtime, services: &Services, label: Option<TaskLabel>) {
    let board = exit_on_error(runtime.block_on(fetch_board(services)));
    print_board(&board, label);
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Container, Task};
    use crate::remote::fake::{FakeChatService, FakeTaskService};
    use crate::remote::TitleUpdate;

    fn board_with_task() -> ProjectBoard {
        ProjectBoard {
            id: ProjectId(1),
            name: "Roadmap".to_string(),
            cards: vec![Container {
                id: ContainerId(10),
                name: "Backlog".to_string(),
                tasks: vec![Task {
                    id: TaskId(5),
                    name: "Plan sprint".to_string(),
                    label: TaskLabel::Todo,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn add_trims_and_reports_created_task() {
        let service = FakeTaskService::default();
        let created = add_task(&service, ContainerId(10), "  Ship  ").await.unwrap();
        assert_eq!(created.task.name, "Ship");
        assert_eq!(created.container_id, ContainerId(10));
    }

    #[tokio::test]
    async fn add_rejects_blank_name_without_calling_backend() {
        let service = FakeTaskService::default();
        let result = add_task(&service, ContainerId(10), "   ").await;
        assert!(matches!(result, Err(AppError::Usage(_))));
        assert_eq!(service.creation_count(), 0);
    }

    #[tokio::test]
    async fn add_surfaces_remote_failure() {
        let service = FakeTaskService::failing();
        let result = add_task(&service, ContainerId(10), "Ship").await;
        assert!(matches!(result, Err(AppError::Remote(_))));
    }

    #[tokio::test]
    async fn rename_looks_up_current_title() {
        let service = FakeTaskService {
            board: Some(board_with_task()),
            ..FakeTaskService::default()
        };

        let unchanged = rename_task(&service, Some(ProjectId(1)), TaskId(5), "Plan sprint", None)
            .await
            .unwrap();
        assert_eq!(unchanged, None);
        assert_eq!(service.update_count(), 0);

        let saved = rename_task(&service, Some(ProjectId(1)), TaskId(5), "Plan sprint 2", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.title, "Plan sprint 2");
        assert_eq!(
            service.title_updates.lock().unwrap().as_slice(),
            &[TitleUpdate {
                task_id: TaskId(5),
                title: "Plan sprint 2".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn rename_needs_current_title_source() {
        let service = FakeTaskService::default();
        let result = rename_task(&service, None, TaskId(5), "x", None).await;
        assert!(matches!(result, Err(AppError::Usage(_))));

        let result = rename_task(&service, None, TaskId(5), "x", Some("y".to_string())).await;
        assert!(result.unwrap().is_some());
    }

    #[tokio::test]
    async fn relabel_skips_unchanged_label() {
        let service = FakeTaskService {
            board: Some(board_with_task()),
            ..FakeTaskService::default()
        };

        let unchanged = relabel_task(&service, Some(ProjectId(1)), TaskId(5), TaskLabel::Todo)
            .await
            .unwrap();
        assert_eq!(unchanged, None);

        let changed = relabel_task(&service, Some(ProjectId(1)), TaskId(5), TaskLabel::Done)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed.label, TaskLabel::Done);
        assert_eq!(service.label_updates.lock().unwrap().len(), 1);

        let missing = relabel_task(&service, Some(ProjectId(1)), TaskId(9), TaskLabel::Done).await;
        assert!(matches!(missing, Err(AppError::Usage(_))));
    }

    #[tokio::test]
    async fn delete_needs_project_and_reports_removal() {
        let service = FakeTaskService {
            board: Some(board_with_task()),
            ..FakeTaskService::default()
        };
        assert!(matches!(
            delete_task(&service, None, TaskId(5)).await,
            Err(AppError::Usage(_))
        ));

        let removed = delete_task(&service, Some(ProjectId(1)), TaskId(5)).await.unwrap();
        assert_eq!(removed.task_id, TaskId(5));
        assert_eq!(service.deleted(), vec![TaskId(5)]);
    }

    #[tokio::test]
    async fn chat_returns_reply_or_error() {
        let service = FakeChatService::replying(&["Kanban is a flow method"]);
        assert_eq!(
            ask_chat(&service, "What is Kanban?").await.unwrap(),
            "Kanban is a flow method"
        );
        assert!(matches!(
            ask_chat(&service, "again?").await,
            Err(AppError::Remote(_))
        ));
        assert!(matches!(ask_chat(&service, "  ").await, Err(AppError::Usage(_))));
    }

    #[tokio::test]
    async fn show_requires_a_project() {
        let services = Services {
            tasks: Arc::new(FakeTaskService {
                board: Some(board_with_task()),
                ..FakeTaskService::default()
            }),
            chat: Arc::new(FakeChatService::default()),
            project_id: None,
        };
        assert!(matches!(fetch_board(&services).await, Err(AppError::Usage(_))));

        let services = Services {
            project_id: Some(ProjectId(1)),
            ..services
        };
        assert_eq!(fetch_board(&services).await.unwrap().name, "Roadmap");
    }
}
