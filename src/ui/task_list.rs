use chrono::Local;
use colored::Colorize;

use crate::api::models::Task;
use crate::utils::short_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    fn keeps(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

pub fn task_line(task: &Task) -> String {
    let mark = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.completed { task.title.dimmed().strikethrough() } else { task.title.bold() };
    let mut line = format!("{mark} {}  {title}", short_id(&task.id, 8).cyan());
    if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n      {}", desc.dimmed()));
    }
    line
}

pub fn task_detail(task: &Task) -> String {
    let status = if task.completed { "completed".green() } else { "pending".yellow() };
    format!(
        "{}\n  id:      {}\n  status:  {status}\n  created: {}\n  updated: {}",
        task.title.bold(),
        task.id,
        task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        task.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    )
}

pub fn render(tasks: &[Task], filter: Filter) -> String {
    let shown: Vec<&Task> = tasks.iter().filter(|t| filter.keeps(t)).collect();
    if shown.is_empty() {
        return "No tasks found.".dimmed().to_string();
    }
    let mut out = shown.iter().map(|t| task_line(t)).collect::<Vec<_>>().join("\n");
    out.push_str(&format!("\n{}", format!("{} of {} tasks", shown.len(), tasks.len()).dimmed()));
    out
}
