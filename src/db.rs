/*
Task store: the in-memory collection plus the ID counter, guarded by one
mutex. Every mutation persists the snapshot before returning, and undoes
itself in memory when the write fails, so callers never observe memory
and disk disagreeing.
Module is written independently from HTTP / Axum for testing.
*/

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::error;

use crate::models::{Field, NewTask, Snapshot, Task, TaskPatch};
use crate::store;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("title is required")]
    TitleRequired,
    #[error("task {0} not found")]
    NotFound(u64),
    #[error("failed to read snapshot: {0}")]
    Unreadable(#[source] io::Error),
    #[error("failed to persist snapshot: {0}")]
    Persist(#[source] io::Error),
}

pub struct TaskDb {
    path: PathBuf,
    state: Mutex<Snapshot>,
}

impl TaskDb {
    // Loads the snapshot (or starts empty on first run) and becomes the
    // sole owner of the collection and the counter from here on.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        let snap = store::load(&path).map_err(DbError::Unreadable)?;
        Ok(TaskDb {
            path,
            state: Mutex::new(snap),
        })
    }

    fn locked(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().expect("task store mutex poisoned")
    }

    fn persist(&self, snap: &Snapshot) -> Result<(), DbError> {
        store::save(&self.path, snap).map_err(|e| {
            error!("failed to persist snapshot: {e}");
            DbError::Persist(e)
        })
    }

    pub fn list(&self) -> Vec<Task> {
        self.locked().tasks.clone()
    }

    pub fn get(&self, id: u64) -> Result<Task, DbError> {
        self.locked()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(DbError::NotFound(id))
    }

    pub fn create(&self, input: NewTask) -> Result<Task, DbError> {
        if input.title.trim().is_empty() {
            return Err(DbError::TitleRequired);
        }

        let mut state = self.locked();
        let task = Task {
            id: state.next_id,
            title: input.title,
            body: input.body,
            status: input.status.unwrap_or_default(),
            tag: input.tag,
        };
        state.next_id += 1;
        state.tasks.push(task.clone());

        // Undo the insert if it could not be persisted, so the task is
        // never handed out without being on disk.
        if let Err(e) = self.persist(&state) {
            state.tasks.pop();
            state.next_id -= 1;
            return Err(e);
        }

        Ok(task)
    }

    pub fn update(&self, id: u64, patch: TaskPatch) -> Result<Task, DbError> {
        let mut state = self.locked();
        let idx = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(DbError::NotFound(id))?;

        let prev = state.tasks[idx].clone();
        let task = &mut state.tasks[idx];
        if let Field::Set(title) = patch.title {
            task.title = title;
        }
        if let Field::Set(body) = patch.body {
            // an explicit "" clears the body
            task.body = body;
        }
        if let Field::Set(status) = patch.status {
            task.status = status;
        }
        if let Field::Set(tag) = patch.tag {
            // tag is replaced wholesale; Set(None) removes it
            task.tag = tag;
        }
        let updated = task.clone();

        if let Err(e) = self.persist(&state) {
            state.tasks[idx] = prev;
            return Err(e);
        }

        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<(), DbError> {
        let mut state = self.locked();
        let idx = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(DbError::NotFound(id))?;

        let removed = state.tasks.remove(idx);

        if let Err(e) = self.persist(&state) {
            state.tasks.insert(idx, removed);
            return Err(e);
        }

        Ok(())
    }
}
