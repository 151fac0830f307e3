//! Command-line interface for taskdeck
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in `task`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::output::OutputOptions;

mod task;

/// taskdeck - personal task manager
///
/// Keeps a local task list with priorities, categories and due dates, and
/// shows it as filtered lists, stats and calendar views.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TASKDECK_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to <data-dir>/taskdeck.toml)
    #[arg(long, global = true, env = "TASKDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Free-form category label
        #[arg(short, long)]
        category: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks
    List {
        /// Status filter: all, pending, completed, high (high priority, any status)
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Case-insensitive text to find in title or description
        #[arg(long)]
        search: Option<String>,

        /// Only tasks in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order: insertion, created-desc, created-asc, due
        #[arg(long, default_value = "insertion")]
        sort: String,

        /// Maximum number of tasks to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Most recently created tasks
    Recent {
        /// Number of tasks (default: dashboard.recent_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Status filter: all, pending, completed, high
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Case-insensitive text to find in title or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one task
    Show {
        /// Task id
        id: String,
    },

    /// Change fields of a task
    Edit {
        /// Task id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Status: pending, completed
        #[arg(long)]
        status: Option<String>,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task id
        id: String,
    },

    /// Mark a task completed
    Done {
        /// Task id
        id: String,
    },

    /// Delete a task permanently
    Rm {
        /// Task id
        id: String,
    },

    /// Task counts: total, completed, pending, overdue
    Stats,

    /// Tasks due on a date
    Due {
        /// Date (YYYY-MM-DD, default: today)
        date: Option<String>,
    },

    /// Tasks due in a month, grouped by day
    Month {
        /// Year (default: current)
        year: Option<i32>,

        /// Month 1-12 (default: current)
        month: Option<u32>,
    },

    /// Pending tasks due today or within the next few days
    Soon {
        /// Days after today to include, 0-366 (default: dashboard.due_soon_days)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=366))]
        days: Option<u32>,
    },

    /// Write all tasks to an export file
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Append tasks from an export file
    Import {
        /// Export file to read
        file: PathBuf,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = task::ContextOptions {
            data_dir: self.data_dir,
            config: self.config,
        };
        let out = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add { title, description, priority, category, due } => {
                task::run_add(ctx, out, task::AddOptions {
                    title,
                    description,
                    priority,
                    category,
                    due,
                })
            }
            Commands::List { status, search, category, sort, limit } => {
                task::run_list(ctx, out, task::ListOptions {
                    status,
                    search,
                    category,
                    sort,
                    limit,
                })
            }
            Commands::Recent { limit, status, search } => {
                task::run_recent(ctx, out, task::RecentOptions {
                    limit,
                    status,
                    search,
                })
            }
            Commands::Show { id } => task::run_show(ctx, out, &id),
            Commands::Edit { id, title, description, priority, category, due, clear_due, status } => {
                task::run_edit(ctx, out, task::EditOptions {
                    id,
                    title,
                    description,
                    priority,
                    category,
                    due,
                    clear_due,
                    status,
                })
            }
            Commands::Toggle { id } => task::run_toggle(ctx, out, &id),
            Commands::Done { id } => task::run_done(ctx, out, &id),
            Commands::Rm { id } => task::run_rm(ctx, out, &id),
            Commands::Stats => task::run_stats(ctx, out),
            Commands::Due { date } => task::run_due(ctx, out, date.as_deref()),
            Commands::Month { year, month } => task::run_month(ctx, out, year, month),
            Commands::Soon { days } => task::run_soon(ctx, out, days),
            Commands::Export { out: path } => task::run_export(ctx, out, path),
            Commands::Import { file } => task::run_import(ctx, out, &file),
        }
    }
}
