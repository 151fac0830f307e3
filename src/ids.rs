//! Task identifier generation.
//!
//! Ids are never derived from the clock; two tasks created within the same
//! millisecond still get distinct ids.

use ulid::Ulid;

pub const DEFAULT_ID_PREFIX: &str = "td";

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// `<prefix>-<lowercase ulid>`, e.g. `td-01hv3k8c2m9x7q4r5s6t7v8w9y`.
#[derive(Debug, Clone)]
pub struct UlidIds {
    prefix: String,
}

impl UlidIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UlidIds {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator for UlidIds {
    fn next_id(&mut self) -> String {
        let suffix = Ulid::new().to_string().to_ascii_lowercase();
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            suffix
        } else {
            format!("{prefix}-{suffix}")
        }
    }
}

/// Monotonic counter: `task-1`, `task-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("task-{}", self.next)
    }
}
