//! Read-only views over a task collection: filtering, ordering, counts and
//! calendar buckets. Nothing here mutates or reorders the source slice.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Priority, TaskRecord, TaskStatus};

/// Status selector for [`TaskFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Spelled `high`: selects high-priority tasks in any status. It is the
    /// whole status condition, it does not also require `pending`.
    PriorityHighOverride,
}

impl StatusFilter {
    fn matches(self, task: &TaskRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => task.status == TaskStatus::Pending,
            StatusFilter::Completed => task.status == TaskStatus::Completed,
            StatusFilter::PriorityHighOverride => task.priority == Priority::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
            StatusFilter::PriorityHighOverride => "high",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            "high" => Ok(StatusFilter::PriorityHighOverride),
            other => Err(Error::InvalidArgument(format!(
                "unknown status filter '{other}' (expected all|pending|completed|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Insertion,
    CreatedDesc,
    CreatedAsc,
    /// Earliest due date first, undated tasks last.
    DueAsc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" => Ok(SortOrder::Insertion),
            "created-desc" | "newest" => Ok(SortOrder::CreatedDesc),
            "created-asc" | "oldest" => Ok(SortOrder::CreatedAsc),
            "due" | "due-asc" => Ok(SortOrder::DueAsc),
            other => Err(Error::InvalidArgument(format!(
                "unknown sort order '{other}' (expected insertion|created-desc|created-asc|due)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring of title or description; blank matches all.
    pub search: String,
    /// Case-insensitive exact category.
    pub category: Option<String>,
    pub sort: SortOrder,
}

impl TaskFilter {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        if !self.status.matches(task) {
            return false;
        }

        // Surrounding whitespace is not part of the term, so a blank search
        // matches everything.
        let term = self.search.trim();
        if !term.is_empty() {
            let term = term.to_lowercase();
            let hit = task.title.to_lowercase().contains(&term)
                || task.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref() {
            if !task.category.trim().eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }

        true
    }
}

/// Matching tasks, cloned, in the filter's sort order.
pub fn filter_tasks(tasks: &[TaskRecord], filter: &TaskFilter) -> Vec<TaskRecord> {
    let mut matched: Vec<TaskRecord> = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    sort_tasks(&mut matched, filter.sort);
    matched
}

/// Stable sort, so ties keep insertion order.
pub fn sort_tasks(tasks: &mut [TaskRecord], order: SortOrder) {
    match order {
        SortOrder::Insertion => {}
        SortOrder::CreatedDesc => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::CreatedAsc => tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::DueAsc => tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

pub fn compute_stats(tasks: &[TaskRecord], today: NaiveDate) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Pending => stats.pending += 1,
        }
        if task.is_overdue(today) {
            stats.overdue += 1;
        }
    }
    stats
}

pub fn tasks_due_on(tasks: &[TaskRecord], date: NaiveDate) -> Vec<TaskRecord> {
    tasks
        .iter()
        .filter(|task| task.due_date == Some(date))
        .cloned()
        .collect()
}

/// Tasks due in one calendar month, bucketed by due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBuckets {
    pub year: i32,
    pub month: u32,
    pub days: BTreeMap<NaiveDate, Vec<TaskRecord>>,
}

impl MonthBuckets {
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(0)
    }

    pub fn task_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn on(&self, day: u32) -> &[TaskRecord] {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .and_then(|date| self.days.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

pub fn tasks_in_month(tasks: &[TaskRecord], year: i32, month: u32) -> Result<MonthBuckets> {
    if !(1..=12).contains(&month) {
        return Err(Error::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    if days_in_month(year, month).is_none() {
        return Err(Error::Validation(format!("year {year} is out of range")));
    }

    let mut days: BTreeMap<NaiveDate, Vec<TaskRecord>> = BTreeMap::new();
    for task in tasks {
        let Some(due) = task.due_date else {
            continue;
        };
        if due.year() == year && due.month() == month {
            days.entry(due).or_default().push(task.clone());
        }
    }

    Ok(MonthBuckets { year, month, days })
}

/// A pending task due within the look-ahead window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueSoon {
    /// 0 = due today, 1 = tomorrow, ...
    pub days_until_due: i64,
    pub task: TaskRecord,
}

/// Pending tasks due from `today` through `today + days`, soonest first.
/// A window reaching past the last representable date is open-ended.
pub fn due_soon(tasks: &[TaskRecord], today: NaiveDate, days: u32) -> Vec<DueSoon> {
    let horizon = today
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    let mut soon: Vec<DueSoon> = tasks
        .iter()
        .filter(|task| !task.is_completed())
        .filter_map(|task| {
            let due = task.due_date?;
            if due < today || due > horizon {
                return None;
            }
            Some(DueSoon {
                days_until_due: (due - today).num_days(),
                task: task.clone(),
            })
        })
        .collect();
    soon.sort_by_key(|entry| entry.days_until_due);
    soon
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn task(id: &str, title: &str, priority: Priority, status: TaskStatus) -> TaskRecord {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        TaskRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority,
            category: String::new(),
            due_date: None,
            status,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn high_filter_ignores_status() {
        let tasks = vec![
            task("1", "a", Priority::High, TaskStatus::Completed),
            task("2", "b", Priority::Low, TaskStatus::Pending),
            task("3", "c", Priority::High, TaskStatus::Pending),
        ];
        let ids: Vec<String> = filter_tasks(&tasks, &TaskFilter::status(StatusFilter::PriorityHighOverride))
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn search_covers_description_and_composes_with_status() {
        let mut with_desc = task("1", "Groceries", Priority::Low, TaskStatus::Pending);
        with_desc.description = "Oat MILK and eggs".to_string();
        let mut done = task("2", "milk run", Priority::Low, TaskStatus::Completed);
        done.description = String::new();
        let tasks = vec![with_desc, done];

        assert_eq!(filter_tasks(&tasks, &TaskFilter::search("milk")).len(), 2);

        let pending_milk = TaskFilter {
            status: StatusFilter::Pending,
            search: "Milk".to_string(),
            ..TaskFilter::default()
        };
        let found = filter_tasks(&tasks, &pending_milk);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");

        assert!(filter_tasks(&tasks, &TaskFilter::search("bread")).is_empty());
        assert_eq!(filter_tasks(&tasks, &TaskFilter::search("   ")).len(), 2);
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let mut work = task("1", "a", Priority::Low, TaskStatus::Pending);
        work.category = "Work".to_string();
        let home = task("2", "b", Priority::Low, TaskStatus::Pending);
        let filter = TaskFilter {
            category: Some("work".to_string()),
            ..TaskFilter::default()
        };
        let found = filter_tasks(&[work, home], &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn due_sort_puts_undated_last() {
        let mut later = task("later", "a", Priority::Low, TaskStatus::Pending);
        later.due_date = Some(date(2024, 3, 9));
        let undated = task("undated", "b", Priority::Low, TaskStatus::Pending);
        let mut sooner = task("sooner", "c", Priority::Low, TaskStatus::Pending);
        sooner.due_date = Some(date(2024, 3, 2));

        let mut tasks = vec![later, undated, sooner];
        sort_tasks(&mut tasks, SortOrder::DueAsc);
        let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn stats_count_overdue_only_for_pending() {
        let today = date(2024, 3, 10);
        let mut overdue = task("1", "a", Priority::Low, TaskStatus::Pending);
        overdue.due_date = Some(date(2024, 3, 9));
        let mut due_today = task("2", "b", Priority::Low, TaskStatus::Pending);
        due_today.due_date = Some(today);
        let mut done_late = task("3", "c", Priority::Low, TaskStatus::Completed);
        done_late.due_date = Some(date(2024, 1, 1));

        let stats = compute_stats(&[overdue, due_today, done_late], today);
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                completed: 1,
                pending: 2,
                overdue: 1,
            }
        );
    }

    #[test]
    fn month_buckets_group_by_due_date() {
        let mut first = task("1", "a", Priority::Low, TaskStatus::Pending);
        first.due_date = Some(date(2024, 2, 29));
        let mut second = task("2", "b", Priority::Low, TaskStatus::Completed);
        second.due_date = Some(date(2024, 2, 29));
        let mut other_month = task("3", "c", Priority::Low, TaskStatus::Pending);
        other_month.due_date = Some(date(2024, 3, 1));
        let undated = task("4", "d", Priority::Low, TaskStatus::Pending);

        let buckets = tasks_in_month(&[first, second, other_month, undated], 2024, 2).expect("month");
        assert_eq!(buckets.days_in_month(), 29);
        assert_eq!(buckets.task_count(), 2);
        assert_eq!(buckets.on(29).len(), 2);
        assert!(buckets.on(1).is_empty());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(matches!(tasks_in_month(&[], 2024, 13), Err(Error::Validation(_))));
        assert!(matches!(tasks_in_month(&[], 2024, 0), Err(Error::Validation(_))));
    }

    #[test]
    fn due_soon_covers_today_and_tomorrow() {
        let today = date(2024, 3, 10);
        let mut yesterday = task("y", "a", Priority::Low, TaskStatus::Pending);
        yesterday.due_date = Some(date(2024, 3, 9));
        let mut tomorrow = task("t", "b", Priority::Low, TaskStatus::Pending);
        tomorrow.due_date = Some(date(2024, 3, 11));
        let mut now = task("n", "c", Priority::Low, TaskStatus::Pending);
        now.due_date = Some(today);
        let mut done = task("d", "d", Priority::Low, TaskStatus::Completed);
        done.due_date = Some(today);
        let mut later = task("l", "e", Priority::Low, TaskStatus::Pending);
        later.due_date = Some(date(2024, 3, 12));

        let soon = due_soon(&[yesterday, tomorrow, now, done, later], today, 1);
        let ids: Vec<(&str, i64)> = soon
            .iter()
            .map(|entry| (entry.task.id.as_str(), entry.days_until_due))
            .collect();
        assert_eq!(ids, vec![("n", 0), ("t", 1)]);
    }

    #[test]
    fn status_filter_parses_legacy_names() {
        assert_eq!(
            "high".parse::<StatusFilter>().expect("filter"),
            StatusFilter::PriorityHighOverride
        );
        assert_eq!("ALL".parse::<StatusFilter>().expect("filter"), StatusFilter::All);
        assert!("open".parse::<StatusFilter>().is_err());
    }
}
