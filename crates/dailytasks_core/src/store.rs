use crate::edit::EditSession;
use crate::error::AppError;
use crate::model::{Filter, Task, TaskStats};
use crate::storage::Storage;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Storage slot holding the serialized task array.
pub const TASKS_SLOT: &str = "myDailyTasks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored yet.
    Empty,
    Restored(usize),
    /// The slot could not be read and was ignored.
    Discarded(String),
}

/// Emitted after a state change has been applied and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(Task),
    Toggled(Task),
    Deleted(Option<Task>),
    Edited { task: Task, changed: bool },
    EditCancelled(u64),
    ClearedCompleted(usize),
    FilterChanged(Filter),
}

type Listener = Box<dyn Fn(&StoreEvent)>;

/// Owns the ordered task collection (newest first) and keeps it in sync with
/// one slot of a [`Storage`] backend.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    next_id: u64,
    active_filter: Filter,
    listeners: Vec<Listener>,
}

impl<S: Storage> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            next_id: 1,
            active_filter: Filter::All,
            listeners: Vec::new(),
        }
    }

    /// Creates a store and hydrates it from the backend.
    pub fn open(storage: S) -> Result<Self, AppError> {
        let mut store = Self::new(storage);
        store.load()?;
        Ok(store)
    }

    pub fn load(&mut self) -> Result<LoadOutcome, AppError> {
        let raw = match self.storage.get(TASKS_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.tasks.clear();
                debug!("no stored tasks");
                return Ok(LoadOutcome::Empty);
            }
            Err(AppError::InvalidData(reason)) => return Ok(self.discard(reason)),
            Err(err) => return Err(err),
        };

        let stored: Vec<Task> = match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(err) => return Ok(self.discard(err.to_string())),
        };

        let mut seen = HashSet::with_capacity(stored.len());
        let mut tasks = Vec::with_capacity(stored.len());
        for task in stored {
            if task.id == 0 || task.id == u64::MAX {
                warn!(id = task.id, "dropping stored task with out-of-range id");
            } else if task.text.trim().is_empty() {
                warn!(id = task.id, "dropping stored task with blank text");
            } else if !seen.insert(task.id) {
                warn!(id = task.id, "dropping stored task with duplicate id");
            } else {
                tasks.push(task);
            }
        }

        let max_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        if let Some(successor) = max_id.checked_add(1) {
            self.next_id = self.next_id.max(successor);
        }
        self.tasks = tasks;

        info!(count = self.tasks.len(), next_id = self.next_id, "tasks restored");
        Ok(LoadOutcome::Restored(self.tasks.len()))
    }

    fn discard(&mut self, reason: String) -> LoadOutcome {
        warn!(%reason, "stored tasks are unreadable, starting empty");
        self.tasks.clear();
        LoadOutcome::Discarded(reason)
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        let content = serde_json::to_string(&self.tasks)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.storage.set(TASKS_SLOT, &content)?;
        debug!(count = self.tasks.len(), "tasks saved");
        Ok(())
    }

    /// Blank text is declined silently and returns `None`.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank task text");
            return Ok(None);
        }

        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task ids exhausted"))?;
        let task = Task::new(self.next_id, trimmed);
        self.next_id = next_id;
        self.tasks.insert(0, task.clone());
        self.save()?;

        info!(id = task.id, "task added");
        self.emit(&StoreEvent::Added(task.clone()));
        Ok(Some(task))
    }

    pub fn toggle(&mut self, id: u64) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "toggle: no such task");
            return Ok(None);
        };

        task.completed = !task.completed;
        let toggled = task.clone();
        self.save()?;

        self.emit(&StoreEvent::Toggled(toggled.clone()));
        Ok(Some(toggled))
    }

    /// Persists even when nothing matched.
    pub fn delete(&mut self, id: u64) -> Result<Option<Task>, AppError> {
        let removed = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .map(|index| self.tasks.remove(index));
        self.save()?;

        if removed.is_none() {
            debug!(id, "delete: no such task");
        }
        self.emit(&StoreEvent::Deleted(removed.clone()));
        Ok(removed)
    }

    /// Replaces the text when `new_text` trims to something non-empty; a blank
    /// edit keeps the prior text but is still saved.
    pub fn edit(&mut self, id: u64, new_text: &str) -> Result<Option<Task>, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "edit: no such task");
            return Ok(None);
        };

        let trimmed = new_text.trim();
        let changed = !trimmed.is_empty() && trimmed != task.text;
        if !trimmed.is_empty() {
            task.text = trimmed.to_string();
        }
        let edited = task.clone();
        self.save()?;

        self.emit(&StoreEvent::Edited {
            task: edited.clone(),
            changed,
        });
        Ok(Some(edited))
    }

    pub fn begin_edit(&self, id: u64) -> Option<EditSession> {
        self.task(id).map(EditSession::new)
    }

    pub fn commit_edit(&mut self, session: EditSession) -> Result<Option<Task>, AppError> {
        self.edit(session.task_id(), session.text())
    }

    pub fn cancel_edit(&self, session: EditSession) {
        self.emit(&StoreEvent::EditCancelled(session.task_id()));
    }

    /// Returns how many tasks were removed.
    pub fn clear_completed(&mut self) -> Result<usize, AppError> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        self.save()?;

        info!(removed, "completed tasks cleared");
        self.emit(&StoreEvent::ClearedCompleted(removed));
        Ok(removed)
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.active_filter = filter;
        self.emit(&StoreEvent::FilterChanged(filter));
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| self.active_filter.matches(task))
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn active_filter(&self) -> Filter {
        self.active_filter
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|task| task.completed)
    }

    /// True when the active filter leaves nothing to show.
    pub fn is_empty_view(&self) -> bool {
        !self.tasks.iter().any(|task| self.active_filter.matches(task))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&StoreEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: &StoreEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
