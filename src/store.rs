//! The task store.
//!
//! `TaskStore` owns the task collection and is the only writer of its
//! durable slot. Every mutation rewrites the whole collection; if that write
//! fails the in-memory collection is put back the way it was, so memory and
//! disk never disagree from the caller's point of view.
//!
//! The store does not log. Callers decide what to report.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::ids::IdGenerator;
use crate::query::{self, DueSoon, MonthBuckets, SortOrder, TaskFilter, TaskStats};
use crate::slot::DurableSlot;
use crate::task::{TaskDraft, TaskPatch, TaskRecord, TaskStatus};
use crate::transfer::{ExportBundle, ImportReport};

/// Attempts before giving up on an id generator that keeps colliding
const MAX_ID_ATTEMPTS: usize = 64;

/// What `load` found in the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    Loaded { tasks: usize },
    /// The slot could not be read or parsed; the store starts empty.
    Recovered { reason: String },
}

pub struct TaskStore {
    slot: Box<dyn DurableSlot>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    tasks: Vec<TaskRecord>,
    /// Every id seen or handed out by this store, deleted ones included.
    issued: HashSet<String>,
}

impl TaskStore {
    pub fn new(
        slot: impl DurableSlot + 'static,
        clock: impl Clock + 'static,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        Self {
            slot: Box::new(slot),
            clock: Box::new(clock),
            ids: Box::new(ids),
            tasks: Vec::new(),
            issued: HashSet::new(),
        }
    }

    /// Read the slot into memory. Never fails: anything unreadable leaves an
    /// empty collection and is reported as [`LoadOutcome::Recovered`].
    pub fn load(&mut self) -> LoadOutcome {
        let decoded = match self.slot.read() {
            Ok(None) => {
                self.tasks.clear();
                return LoadOutcome::Empty;
            }
            Ok(Some(data)) => decode(&data),
            Err(err) => Err(Error::CorruptState(err.to_string())),
        };

        match decoded {
            Ok(tasks) => {
                self.issued.extend(tasks.iter().map(|task| task.id.clone()));
                let count = tasks.len();
                self.tasks = tasks;
                LoadOutcome::Loaded { tasks: count }
            }
            Err(err) => {
                self.tasks.clear();
                LoadOutcome::Recovered {
                    reason: err.to_string(),
                }
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add(&mut self, draft: TaskDraft) -> Result<TaskRecord> {
        if draft.title.trim().is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }

        let id = self.fresh_id()?;
        let now = self.clock.now();
        let record = TaskRecord {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let previous = self.tasks.clone();
        self.tasks.push(record.clone());
        self.persist_or_rollback(previous)?;
        Ok(record)
    }

    /// Apply `patch` to an existing task. `id` and `created_at` never change.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<TaskRecord> {
        let index = self.index_of(id)?;
        patch.validate()?;

        let now = self.clock.now();
        let previous = self.tasks.clone();
        let record = &mut self.tasks[index];
        patch.apply_to(record);
        record.updated_at = touch(record.created_at, now);
        let updated = record.clone();

        self.persist_or_rollback(previous)?;
        Ok(updated)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<TaskRecord> {
        let status = self.get(id)?.status.toggled();
        self.update(id, TaskPatch::status(status))
    }

    pub fn complete(&mut self, id: &str) -> Result<TaskRecord> {
        self.update(id, TaskPatch::status(TaskStatus::Completed))
    }

    /// Remove a task for good and return it. Its id is never handed out again.
    pub fn delete(&mut self, id: &str) -> Result<TaskRecord> {
        let index = self.index_of(id)?;
        let previous = self.tasks.clone();
        let removed = self.tasks.remove(index);
        self.persist_or_rollback(previous)?;
        Ok(removed)
    }

    /// Append the bundle's tasks. Ids already in use (or repeated inside the
    /// bundle) are replaced with fresh ones. All or nothing.
    pub fn import(&mut self, bundle: ExportBundle) -> Result<ImportReport> {
        bundle.check_version()?;
        for (index, task) in bundle.tasks.iter().enumerate() {
            task.validate().map_err(|err| {
                Error::Validation(format!("import entry {}: {err}", index + 1))
            })?;
        }

        let previous = self.tasks.clone();
        let mut report = ImportReport::default();
        for mut task in bundle.tasks {
            if self.issued.contains(&task.id) {
                let original = std::mem::take(&mut task.id);
                task.id = match self.fresh_id() {
                    Ok(id) => id,
                    Err(err) => {
                        self.tasks = previous;
                        return Err(err);
                    }
                };
                report.rekeyed.push((original, task.id.clone()));
            } else {
                self.issued.insert(task.id.clone());
            }
            self.tasks.push(task);
            report.imported += 1;
        }

        self.persist_or_rollback(previous)?;
        Ok(report)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: &str) -> Result<&TaskRecord> {
        self.find(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn list(&self, filter: &TaskFilter) -> Vec<TaskRecord> {
        query::filter_tasks(&self.tasks, filter)
    }

    /// Newest first, at most `limit` tasks. The filter's own sort is ignored.
    pub fn recent(&self, filter: &TaskFilter, limit: usize) -> Vec<TaskRecord> {
        let filter = filter.clone().sorted(SortOrder::CreatedDesc);
        let mut tasks = query::filter_tasks(&self.tasks, &filter);
        tasks.truncate(limit);
        tasks
    }

    pub fn stats(&self) -> TaskStats {
        query::compute_stats(&self.tasks, self.clock.today())
    }

    pub fn tasks_due_on(&self, date: NaiveDate) -> Vec<TaskRecord> {
        query::tasks_due_on(&self.tasks, date)
    }

    pub fn tasks_in_month(&self, year: i32, month: u32) -> Result<MonthBuckets> {
        query::tasks_in_month(&self.tasks, year, month)
    }

    /// Pending tasks due today through `days` days from now.
    pub fn due_soon(&self, days: u32) -> Vec<DueSoon> {
        query::due_soon(&self.tasks, self.clock.today(), days)
    }

    pub fn export(&self) -> ExportBundle {
        ExportBundle::new(self.tasks.clone(), self.clock.now())
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index_of(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn fresh_id(&mut self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if id.trim().is_empty() {
                continue;
            }
            if self.issued.insert(id.clone()) {
                return Ok(id);
            }
        }
        Err(Error::Persistence(format!(
            "id generator produced no unused id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    fn persist_or_rollback(&mut self, previous: Vec<TaskRecord>) -> Result<()> {
        let written = encode(&self.tasks).and_then(|data| self.slot.write(&data));
        if let Err(err) = written {
            self.tasks = previous;
            return Err(match err {
                Error::Persistence(_) => err,
                other => Error::Persistence(other.to_string()),
            });
        }
        Ok(())
    }
}

/// `updated_at` never goes behind `created_at`, even if the clock does.
fn touch(created_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(created_at)
}

fn encode(tasks: &[TaskRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(tasks)?)
}

fn decode(data: &[u8]) -> Result<Vec<TaskRecord>> {
    let tasks: Vec<TaskRecord> =
        serde_json::from_slice(data).map_err(|err| Error::CorruptState(err.to_string()))?;

    let mut seen = HashSet::new();
    for task in &tasks {
        task.validate()
            .map_err(|err| Error::CorruptState(err.to_string()))?;
        if !seen.insert(task.id.as_str()) {
            return Err(Error::CorruptState(format!("duplicate task id {}", task.id)));
        }
    }
    Ok(tasks)
}
