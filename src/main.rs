//! # Station - Kanban Board Client
//!
//! A terminal client for a remote project board, with an embedded chat
//! assistant for agile-methodology questions.
//!
//! ## Key Features
//!
//! - **Kanban Board**: Containers shown as columns with their tasks as cards
//! - **Inline Editing**: Rename a task from its detail modal; the backend is
//!   only contacted when the title actually changed
//! - **Task Actions**: Move a task between labels or delete it from the modal
//! - **Quick Add**: Each container carries its own add-task form
//! - **Chat Assistant**: Side panel with suggested starter questions
//! - **Scriptable**: The same operations are available as one-shot commands
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board for project 3
//! station --project 3
//!
//! # Add a task to container 12
//! station add 12 "Write release notes"
//!
//! # Rename task 40
//! station --project 3 rename 40 "Write release notes v2"
//!
//! # Move task 40 to done, then delete it
//! station --project 3 label 40 done
//! station --project 3 delete 40
//!
//! # Ask the assistant
//! station chat "What is Kanban?"
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/station/config.toml` (or the file named
//! by `--config` / `$STATION_CONFIG`), then `STATION_API_URL`,
//! `STATION_CHAT_URL` and `STATION_PROJECT`, then the matching flags.
//! Logs are written to `station.log` next to the config file; set
//! `STATION_LOG` to change the filter.

use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::info;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod remote;
pub mod tui {
    pub mod add_task_form;
    pub mod app;
    pub mod chat;
    pub mod colors;
    pub mod enums;
    pub mod events;
    pub mod input;
    pub mod run;
    pub mod task_modal;
    pub mod title_editor;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use error::{AppError, AppResult};
use remote::http::{build_client, HttpChatService, HttpTaskService};

fn build_runtime() -> AppResult<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Io)
}

fn build_services(config: &Config) -> AppResult<Services> {
    let client = build_client(config.request_timeout())?;
    Ok(Services {
        tasks: Arc::new(HttpTaskService::new(client.clone(), config.api_url.clone())),
        chat: Arc::new(HttpChatService::new(client, config.chat_url.clone())),
        project_id: config.project_id,
    })
}

fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let config = match Config::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_tracing(&config.log_path()) {
        eprintln!("Warning: {e}");
    }
    info!(api_url = %config.api_url, project_id = ?config.project_id, "starting station");

    let (runtime, services) = match build_runtime().and_then(|rt| Ok((rt, build_services(&config)?))) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };
    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => {
            // the board UI spawns its remote calls onto the ambient runtime
            let _runtime_guard = runtime.enter();
            cmd_ui(&services);
        }
        Commands::Add { container_id, name } => cmd_add(&runtime, &services, container_id, name),
        Commands::Rename {
            task_id,
            title,
            current,
        } => cmd_rename(&runtime, &services, task_id, title, current),
        Commands::Label { task_id, label } => cmd_label(&runtime, &services, task_id, label),
        Commands::Delete { task_id } => cmd_delete(&runtime, &services, task_id),
        Commands::Chat { message } => cmd_chat(&runtime, &services, message),
        Commands::Show { label } => cmd_show(&runtime, &services, label),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
