use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::ConfigOverrides;

/// Terminal client for a remote kanban project board with a chat assistant.
/// Without a subcommand the board UI is launched.
#[derive(Parser, Debug)]
#[command(name = "station", version, about = "Kanban board client with a chat assistant")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend origin, e.g. http://localhost:8080.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Chat assistant endpoint.
    #[arg(long, global = true)]
    pub chat_url: Option<String>,

    /// Project to open.
    #[arg(long, global = true)]
    pub project: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            chat_url: self.chat_url.clone(),
            project_id: self.project,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_ui() {
        let cli = Cli::parse_from(["station", "--project", "4"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.overrides().project_id, Some(4));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["station", "show", "--api-url", "http://b:1"]);
        assert!(matches!(cli.command, Some(Commands::Show { label: None })));
        assert_eq!(cli.overrides().api_url.as_deref(), Some("http://b:1"));
    }

    #[test]
    fn label_command_takes_kebab_case_labels() {
        let cli = Cli::parse_from(["station", "label", "40", "in-progress"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Label {
                task_id: 40,
                label: crate::fields::TaskLabel::InProgress
            })
        ));
    }
}
