//! taskdeck command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Serialize;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ids::UlidIds;
use crate::lock;
use crate::output::{emit_success, task_line, HumanOutput, OutputOptions};
use crate::query::{DueSoon, MonthBuckets, SortOrder, StatusFilter, TaskFilter, TaskStats};
use crate::storage::Storage;
use crate::store::{LoadOutcome, TaskStore};
use crate::task::{parse_date, Priority, TaskDraft, TaskPatch, TaskRecord, TaskStatus};
use crate::transfer::{ExportBundle, ImportReport};

/// Where to find the data directory and config file.
pub struct ContextOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
}

pub struct ListOptions {
    pub status: String,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: String,
    pub limit: Option<usize>,
}

pub struct RecentOptions {
    pub limit: Option<usize>,
    pub status: String,
    pub search: Option<String>,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub status: Option<String>,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<TaskRecord>,
}

#[derive(Serialize)]
struct DueOnOutput {
    date: chrono::NaiveDate,
    total: usize,
    tasks: Vec<TaskRecord>,
}

#[derive(Serialize)]
struct DueSoonOutput {
    today: chrono::NaiveDate,
    days: u32,
    total: usize,
    tasks: Vec<DueSoon>,
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    tasks: usize,
}

struct TaskContext {
    store: TaskStore,
    config: Config,
    storage: Storage,
    load: LoadOutcome,
}

impl TaskContext {
    /// Start the human rendering, carrying any load warning along.
    fn human(&self, header: impl Into<String>) -> HumanOutput {
        let mut human = HumanOutput::new(header);
        if let LoadOutcome::Recovered { reason } = &self.load {
            human.push_warning(format!("stored tasks were unreadable and were ignored: {reason}"));
        }
        human
    }
}

fn load_context(options: ContextOptions) -> Result<TaskContext> {
    let config = match (&options.config, &options.data_dir) {
        (Some(path), _) => Config::load(path)?,
        (None, Some(dir)) => Config::load_from_dir(dir),
        (None, None) => Config::load_from_dir(&Storage::default_data_dir()?),
    };

    let data_dir = match options.data_dir.or_else(|| config.storage.data_dir.clone()) {
        Some(dir) => dir,
        None => Storage::default_data_dir()?,
    };
    let storage = Storage::new(data_dir);

    let slot = storage.open_slot(&config.storage.slot_key, config.storage.lock_timeout_ms);
    let mut store = TaskStore::new(slot, SystemClock, UlidIds::new(config.tasks.id_prefix.clone()));
    let load = store.load();
    match &load {
        LoadOutcome::Recovered { reason } => {
            tracing::warn!(
                path = %storage.slot_file(&config.storage.slot_key).display(),
                reason = %reason,
                "task slot unreadable, starting empty"
            );
        }
        other => {
            tracing::debug!(data_dir = %storage.data_dir().display(), outcome = ?other, "loaded tasks");
        }
    }

    Ok(TaskContext {
        store,
        config,
        storage,
        load,
    })
}

pub fn run_add(ctx: ContextOptions, out: OutputOptions, options: AddOptions) -> Result<()> {
    let mut ctx = load_context(ctx)?;

    let priority = match options.priority.as_deref() {
        Some(value) => value.parse::<Priority>()?,
        None => ctx.config.tasks.default_priority,
    };
    let mut draft = TaskDraft::new(options.title.trim()).priority(priority);
    if let Some(description) = options.description {
        draft = draft.description(description);
    }
    if let Some(category) = options.category {
        draft = draft.category(category.trim());
    }
    if let Some(due) = options.due.as_deref() {
        draft = draft.due(parse_date(due)?);
    }

    let task = ctx.store.add(draft)?;
    tracing::info!(id = %task.id, "task created");

    let mut human = ctx.human("Task created");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    if let Some(due) = task.due_date {
        human.push_summary("Due", due.to_string());
    }

    emit_success(out, "add", &task, Some(&human))
}

pub fn run_list(ctx: ContextOptions, out: OutputOptions, options: ListOptions) -> Result<()> {
    let ctx = load_context(ctx)?;
    let filter = TaskFilter {
        status: options.status.parse::<StatusFilter>()?,
        search: options.search.unwrap_or_default(),
        category: options.category,
        sort: options.sort.parse::<SortOrder>()?,
    };

    let mut tasks = ctx.store.list(&filter);
    apply_limit(&mut tasks, options.limit)?;

    let mut human = ctx.human("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    if filter.status != StatusFilter::All {
        human.push_summary("Status", filter.status.to_string());
    }
    for task in &tasks {
        human.push_detail(task_line(task));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };
    emit_success(out, "list", &output, Some(&human))
}

pub fn run_recent(ctx: ContextOptions, out: OutputOptions, options: RecentOptions) -> Result<()> {
    let ctx = load_context(ctx)?;
    let limit = options.limit.unwrap_or(ctx.config.dashboard.recent_limit);
    if limit == 0 {
        return Err(Error::InvalidArgument("limit must be >= 1".to_string()));
    }
    let filter = TaskFilter {
        status: options.status.parse::<StatusFilter>()?,
        search: options.search.unwrap_or_default(),
        ..TaskFilter::default()
    };

    let tasks = ctx.store.recent(&filter, limit);

    let mut human = ctx.human("Recent tasks");
    human.push_summary("Showing", format!("{} of {}", tasks.len(), ctx.store.len()));
    for task in &tasks {
        human.push_detail(task_line(task));
    }
    if ctx.store.is_empty() {
        human.set_hint("taskdeck add \"<title>\"");
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };
    emit_success(out, "recent", &output, Some(&human))
}

pub fn run_show(ctx: ContextOptions, out: OutputOptions, id: &str) -> Result<()> {
    let ctx = load_context(ctx)?;
    let task = ctx.store.get(id)?;

    let mut human = ctx.human(task.title.clone());
    human.push_summary("ID", task.id.clone());
    human.push_summary("Status", task.status.to_string());
    human.push_summary("Priority", task.priority.to_string());
    if !task.category.trim().is_empty() {
        human.push_summary("Category", task.category.clone());
    }
    if let Some(due) = task.due_date {
        let mut value = due.to_string();
        if task.is_overdue(ctx.store.today()) {
            value.push_str(" (overdue)");
        }
        human.push_summary("Due", value);
    }
    human.push_summary("Created", task.created_at.to_rfc3339());
    human.push_summary("Updated", task.updated_at.to_rfc3339());
    if !task.description.trim().is_empty() {
        human.push_detail(task.description.clone());
    }

    emit_success(out, "show", task, Some(&human))
}

pub fn run_edit(ctx: ContextOptions, out: OutputOptions, options: EditOptions) -> Result<()> {
    let mut ctx = load_context(ctx)?;

    let due_date = if options.clear_due {
        Some(None)
    } else {
        match options.due.as_deref() {
            Some(value) => Some(Some(parse_date(value)?)),
            None => None,
        }
    };
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        priority: options.priority.as_deref().map(str::parse::<Priority>).transpose()?,
        category: options.category,
        due_date,
        status: options.status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field flag".to_string(),
        ));
    }

    let task = ctx.store.update(&options.id, patch)?;
    tracing::info!(id = %task.id, "task updated");

    let mut human = ctx.human("Task updated");
    human.push_detail(task_line(&task));
    emit_success(out, "edit", &task, Some(&human))
}

pub fn run_toggle(ctx: ContextOptions, out: OutputOptions, id: &str) -> Result<()> {
    let mut ctx = load_context(ctx)?;
    let task = ctx.store.toggle_complete(id)?;
    tracing::info!(id = %task.id, status = %task.status, "task toggled");

    let header = if task.is_completed() {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = ctx.human(header);
    human.push_detail(task_line(&task));
    emit_success(out, "toggle", &task, Some(&human))
}

pub fn run_done(ctx: ContextOptions, out: OutputOptions, id: &str) -> Result<()> {
    let mut ctx = load_context(ctx)?;
    let task = ctx.store.complete(id)?;
    tracing::info!(id = %task.id, "task completed");

    let mut human = ctx.human("Task completed");
    human.push_detail(task_line(&task));
    emit_success(out, "done", &task, Some(&human))
}

pub fn run_rm(ctx: ContextOptions, out: OutputOptions, id: &str) -> Result<()> {
    let mut ctx = load_context(ctx)?;
    let task = ctx.store.delete(id)?;
    tracing::info!(id = %task.id, "task deleted");

    let mut human = ctx.human("Task deleted");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    emit_success(out, "rm", &task, Some(&human))
}

pub fn run_stats(ctx: ContextOptions, out: OutputOptions) -> Result<()> {
    let ctx = load_context(ctx)?;
    let stats: TaskStats = ctx.store.stats();

    let mut human = ctx.human("Task stats");
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human.push_summary("Pending", stats.pending.to_string());
    human.push_summary("Overdue", stats.overdue.to_string());
    emit_success(out, "stats", &stats, Some(&human))
}

pub fn run_due(ctx: ContextOptions, out: OutputOptions, date: Option<&str>) -> Result<()> {
    let ctx = load_context(ctx)?;
    let date = match date {
        Some(value) => parse_date(value)?,
        None => ctx.store.today(),
    };
    let tasks = ctx.store.tasks_due_on(date);

    let mut human = ctx.human(format!("Due {date}"));
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(task_line(task));
    }

    let output = DueOnOutput {
        date,
        total: tasks.len(),
        tasks,
    };
    emit_success(out, "due", &output, Some(&human))
}

pub fn run_month(
    ctx: ContextOptions,
    out: OutputOptions,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let ctx = load_context(ctx)?;
    let today = ctx.store.today();
    let buckets: MonthBuckets = ctx.store.tasks_in_month(
        year.unwrap_or_else(|| today.year()),
        month.unwrap_or_else(|| today.month()),
    )?;

    let mut human = ctx.human(format!("{}-{:02}", buckets.year, buckets.month));
    human.push_summary("Tasks", buckets.task_count().to_string());
    human.push_summary("Days", buckets.days_in_month().to_string());
    for day in 1..=buckets.days_in_month() {
        for task in buckets.on(day) {
            human.push_detail(format!("{:02} {}", day, task_line(task)));
        }
    }

    emit_success(out, "month", &buckets, Some(&human))
}

pub fn run_soon(ctx: ContextOptions, out: OutputOptions, days: Option<u32>) -> Result<()> {
    let ctx = load_context(ctx)?;
    let days = days.unwrap_or(ctx.config.dashboard.due_soon_days);
    let tasks = ctx.store.due_soon(days);

    let mut human = ctx.human("Due soon");
    human.push_summary("Total", tasks.len().to_string());
    for entry in &tasks {
        let when = match entry.days_until_due {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            n => format!("in {n} days"),
        };
        human.push_detail(format!("{when}: {}", task_line(&entry.task)));
    }

    let output = DueSoonOutput {
        today: ctx.store.today(),
        days,
        total: tasks.len(),
        tasks,
    };
    emit_success(out, "soon", &output, Some(&human))
}

pub fn run_export(ctx: ContextOptions, out: OutputOptions, path: Option<PathBuf>) -> Result<()> {
    let ctx = load_context(ctx)?;
    let bundle = ctx.store.export();

    let Some(path) = path else {
        if out.json {
            return emit_success(out, "export", &bundle, None);
        }
        println!("{}", bundle.to_json_pretty()?);
        return Ok(());
    };

    lock::write_atomic(&path, bundle.to_json_pretty()?.as_bytes())?;
    tracing::info!(path = %path.display(), tasks = bundle.tasks.len(), "exported tasks");

    let mut human = ctx.human("Tasks exported");
    human.push_summary("File", path.display().to_string());
    human.push_summary("Tasks", bundle.tasks.len().to_string());
    let output = ExportOutput {
        path,
        tasks: bundle.tasks.len(),
    };
    emit_success(out, "export", &output, Some(&human))
}

pub fn run_import(ctx: ContextOptions, out: OutputOptions, file: &Path) -> Result<()> {
    let mut ctx = load_context(ctx)?;
    let data = fs::read(file)?;
    let bundle = ExportBundle::from_slice(&data)?;
    let report: ImportReport = ctx.store.import(bundle)?;
    tracing::info!(
        file = %file.display(),
        imported = report.imported,
        rekeyed = report.rekeyed.len(),
        "imported tasks"
    );

    let mut human = ctx.human("Tasks imported");
    human.push_summary("Imported", report.imported.to_string());
    human.push_summary("Total", ctx.store.len().to_string());
    human.push_summary(
        "Slot",
        ctx.storage
            .slot_file(&ctx.config.storage.slot_key)
            .display()
            .to_string(),
    );
    for (original, new_id) in &report.rekeyed {
        human.push_warning(format!("id {original} was taken; imported as {new_id}"));
    }

    emit_success(out, "import", &report, Some(&human))
}

fn apply_limit(tasks: &mut Vec<TaskRecord>, limit: Option<usize>) -> Result<()> {
    if let Some(limit) = limit {
        if limit == 0 {
            return Err(Error::InvalidArgument("limit must be >= 1".to_string()));
        }
        tasks.truncate(limit);
    }
    Ok(())
}
