//! taskdeck - Personal Task Manager Library
//!
//! This library provides the task store behind the taskdeck CLI: a single
//! collection of tasks with priorities, categories and due dates, persisted
//! to a durable slot after every change.
//!
//! # Core Concepts
//!
//! - **Task store**: Owns the collection; add, update, toggle, delete
//! - **Durable slot**: Where the serialized collection lives (file or memory)
//! - **Views**: Filtered lists, stats, due-date and month calendar queries
//! - **Rollback**: A failed write leaves memory exactly as it was
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `clock`: Injected time source
//! - `config`: Configuration loading from `taskdeck.toml`
//! - `error`: Error types and result aliases
//! - `ids`: Injected task id generators
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON rendering of command results
//! - `query`: Filters, sorting, stats and calendar views
//! - `slot`: The durable slot abstraction and its in-memory variant
//! - `storage`: Data directory layout and the file-backed slot
//! - `store`: The task store
//! - `task`: Task records, drafts and patches
//! - `transfer`: Export/import bundles

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod lock;
pub mod output;
pub mod query;
pub mod slot;
pub mod storage;
pub mod store;
pub mod task;
pub mod transfer;

pub use error::{Error, Result};
