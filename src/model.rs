use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};

pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: u64,
    pub task: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl Task {
    /// Flips `done`, stamping or clearing `completed_at` to match.
    pub fn toggle(&mut self) {
        self.done = !self.done;
        self.completed_at = if self.done { Some(today()) } else { None };
    }
}

/// Sanitized fields submitted by the add and update forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub task: String,
    pub category: String,
    pub due_date: String,
}

impl TaskInput {
    /// Returns `None` when the task name is empty after sanitizing.
    pub fn new(task: Option<&str>, category: Option<&str>, due_date: Option<&str>) -> Option<Self> {
        let task = sanitize(task.unwrap_or(""));
        if task.is_empty() {
            return None;
        }
        let category = sanitize(category.unwrap_or(""));
        let category = if category.is_empty() {
            default_category()
        } else {
            category
        };
        Some(Self {
            task,
            category,
            due_date: due_date.unwrap_or("").trim().to_string(),
        })
    }
}

/// Trims surrounding whitespace and drops line breaks.
pub fn sanitize(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

pub fn today() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}
