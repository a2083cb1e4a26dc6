use crate::error::StoreError;
use crate::model::{Task, TaskInput};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// In-memory task list backed by a pretty-printed JSON file.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl Store {
    /// Loads the list from `path`. A missing or blank file yields an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tasks = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(StoreError::Parse)?
            }
        } else {
            Vec::new()
        };
        let mut store = Self { path, tasks };
        store.backfill_ids();
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn categories(&self) -> Vec<String> {
        get_categories(&self.tasks)
    }

    pub fn add(&mut self, input: TaskInput) -> Result<&Task, StoreError> {
        let id = self.next_id().ok_or(StoreError::IdOverflow)?;
        let task = Task {
            id,
            task: input.task,
            done: false,
            category: input.category,
            due_date: input.due_date,
            completed_at: None,
        };
        self.tasks.push(task);
        self.persist()?;
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Returns `Ok(false)` without touching the file when `id` is unknown.
    pub fn toggle(&mut self, id: u64) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };
        task.toggle();
        self.persist()?;
        Ok(true)
    }

    /// Returns `Ok(false)` without touching the file when `id` is unknown.
    pub fn delete(&mut self, id: u64) -> Result<bool, StoreError> {
        let Some(position) = self.tasks.iter().position(|task| task.id == id) else {
            return Ok(false);
        };
        self.tasks.remove(position);
        self.persist()?;
        Ok(true)
    }

    /// Replaces name, category and due date. Completion state is left alone.
    pub fn update(&mut self, id: u64, input: TaskInput) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;
        task.task = input.task;
        task.category = input.category;
        task.due_date = input.due_date;
        self.persist()
    }

    /// Rewrites the whole file through a temp file and rename.
    pub fn persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.tasks).map_err(StoreError::Serialize)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        // Temp files are owner-only; keep whatever mode the data file already has.
        if let Ok(metadata) = fs::metadata(&self.path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn max_id(&self) -> u64 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0)
    }

    fn next_id(&self) -> Option<u64> {
        self.max_id().checked_add(1)
    }

    // Files written before ids existed carry none; number them in file order.
    fn backfill_ids(&mut self) {
        let mut seen = HashSet::new();
        let missing = self
            .tasks
            .iter()
            .filter(|task| task.id == 0 || !seen.insert(task.id))
            .count() as u64;
        let max = self.max_id();
        // Leave room for the backfilled ids plus one more add, else start over from 1.
        if max.checked_add(missing).and_then(|last| last.checked_add(1)).is_none() {
            warn!("task ids exhausted; renumbering {} task(s)", self.tasks.len());
            for (position, task) in self.tasks.iter_mut().enumerate() {
                task.id = position as u64 + 1;
            }
            return;
        }
        if missing == 0 {
            return;
        }
        let mut next = max + 1;
        let mut seen = HashSet::new();
        for task in &mut self.tasks {
            if task.id == 0 || !seen.insert(task.id) {
                task.id = next;
                seen.insert(next);
                next += 1;
            }
        }
    }
}

/// Distinct categories in order of first appearance.
pub fn get_categories(tasks: &[Task]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for task in tasks {
        if !out.contains(&task.category) {
            out.push(task.category.clone());
        }
    }
    out
}
