//! Project board data structures.
//!
//! A project is a row of containers (cards), each holding an ordered list of
//! tasks. The board is owned by whichever view shows it; components never
//! mutate it themselves, they hand back notifications that the owner applies
//! here.

use serde::{Deserialize, Serialize};

use crate::fields::TaskLabel;
use crate::remote::{ContainerId, ProjectId, TaskId};

/// A single work item on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub label: TaskLabel,
}

/// A column of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A project with its containers, as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBoard {
    pub id: ProjectId,
    #[serde(default = "untitled_project")]
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Container>,
}

fn untitled_project() -> String {
    "Untitled Project".to_string()
}

impl ProjectBoard {
    /// Empty placeholder shown before the first load completes.
    pub fn empty(id: ProjectId) -> Self {
        ProjectBoard {
            id,
            name: untitled_project(),
            cards: Vec::new(),
        }
    }

    /// Get a container by ID.
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Get a mutable reference to a container by ID.
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Get a task by ID along with the container holding it.
    pub fn task(&self, id: TaskId) -> Option<(&Container, &Task)> {
        self.cards
            .iter()
            .find_map(|c| c.tasks.iter().find(|t| t.id == id).map(|t| (c, t)))
    }

    /// Get a mutable reference to a task by ID.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.cards
            .iter_mut()
            .find_map(|c| c.tasks.iter_mut().find(|t| t.id == id))
    }

    /// Replace a task's title. Returns false if the task is not on the board.
    pub fn rename_task(&mut self, id: TaskId, title: &str) -> bool {
        match self.task_mut(id) {
            Some(task) => {
                task.name = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Append a task to the end of a container. Returns false if the
    /// container is not on the board.
    pub fn push_task(&mut self, container_id: ContainerId, task: Task) -> bool {
        match self.container_mut(container_id) {
            Some(container) => {
                container.tasks.push(task);
                true
            }
            None => false,
        }
    }

    /// Set a task's progress label. Returns false if the task is not on the board.
    pub fn set_task_label(&mut self, id: TaskId, label: TaskLabel) -> bool {
        match self.task_mut(id) {
            Some(task) => {
                task.label = label;
                true
            }
            None => false,
        }
    }

    /// Remove a task from whichever container holds it.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        self.cards.iter_mut().find_map(|c| {
            let index = c.tasks.iter().position(|t| t.id == id)?;
            Some(c.tasks.remove(index))
        })
    }

    /// Total number of tasks across all containers.
    pub fn task_count(&self) -> usize {
        self.cards.iter().map(|c| c.tasks.len()).sum()
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print a board as an indented listing, optionally only tasks with `label`.
pub fn print_board(board: &ProjectBoard, label: Option<TaskLabel>) {
    println!("{} (project {})", board.name, board.id);
    if board.cards.is_empty() {
        println!("  (no cards)");
        return;
    }
    for card in &board.cards {
        println!("  [{}] {} ({} tasks)", card.id, card.name, card.tasks.len());
        for task in card.tasks.iter().filter(|t| label.map_or(true, |l| t.label == l)) {
            println!(
                "    {:<6} {:<12} {}",
                task.id.to_string(),
                crate::fields::format_label(task.label),
                truncate(&task.name, 60)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> ProjectBoard {
        ProjectBoard {
            id: ProjectId(7),
            name: "Launch".to_string(),
            cards: vec![
                Container {
                    id: ContainerId(1),
                    name: "Backlog".to_string(),
                    tasks: vec![Task {
                        id: TaskId(10),
                        name: "Write brief".to_string(),
                        label: TaskLabel::Todo,
                    }],
                },
                Container {
                    id: ContainerId(2),
                    name: "Doing".to_string(),
                    tasks: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn parses_backend_project_payload() {
        let json = r#"{
            "id": 3,
            "name": "Website",
            "workspaceId": 9,
            "cards": [
                {"id": 1, "name": "To do", "tasks": [{"id": 11, "name": "Hero section"}]},
                {"id": 2, "name": "Done"}
            ]
        }"#;
        let board: ProjectBoard = serde_json::from_str(json).unwrap();
        assert_eq!(board.id, ProjectId(3));
        assert_eq!(board.cards.len(), 2);
        assert_eq!(board.cards[0].tasks[0].label, TaskLabel::Todo);
        assert!(board.cards[1].tasks.is_empty());
    }

    #[test]
    fn missing_name_falls_back_to_untitled() {
        let board: ProjectBoard = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(board.name, "Untitled Project");
        assert!(board.cards.is_empty());
    }

    #[test]
    fn rename_and_push() {
        let mut board = sample_board();
        assert!(board.rename_task(TaskId(10), "Write the brief"));
        assert_eq!(board.task(TaskId(10)).unwrap().1.name, "Write the brief");
        assert!(!board.rename_task(TaskId(99), "ghost"));

        let task = Task {
            id: TaskId(11),
            name: "Review".to_string(),
            label: TaskLabel::Todo,
        };
        assert!(board.push_task(ContainerId(2), task.clone()));
        assert!(!board.push_task(ContainerId(5), task));
        let (container, _) = board.task(TaskId(11)).unwrap();
        assert_eq!(container.id, ContainerId(2));
        assert_eq!(board.task_count(), 2);
    }

    #[test]
    fn relabel_and_remove() {
        let mut board = sample_board();
        assert!(board.set_task_label(TaskId(10), TaskLabel::Done));
        assert_eq!(board.task(TaskId(10)).unwrap().1.label, TaskLabel::Done);
        assert!(!board.set_task_label(TaskId(99), TaskLabel::Done));

        let removed = board.remove_task(TaskId(10)).unwrap();
        assert_eq!(removed.name, "Write brief");
        assert_eq!(board.task_count(), 0);
        assert_eq!(board.remove_task(TaskId(10)), None);
    }

    #[test]
    fn truncate_adds_ellipsis_past_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }
}
