//! Rendering of command results, for people or as JSON.
//!
//! JSON mode prints one envelope per command:
//!
//! ```json
//! { "schema_version": "taskdeck.v1", "command": "add", "status": "success", "data": { ... } }
//! { "schema_version": "taskdeck.v1", "command": "rm", "status": "error", "error": { ... }, "hint": "..." }
//! ```

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::task::TaskRecord;

pub const SCHEMA_VERSION: &str = "taskdeck.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human rendering: a header, `key: value` lines, free-form lines, then
/// warnings and an optional hint.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    lines: Vec<String>,
    warnings: Vec<String>,
    hint: Option<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            lines: Vec::new(),
            warnings: Vec::new(),
            hint: None,
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = Some(hint.into());
    }

    pub fn render(&self) -> String {
        let mut out = vec![self.header.clone()];
        let width = self.summary.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in &self.summary {
            out.push(format!("  {key}:{:pad$} {value}", "", pad = width - key.len()));
        }
        if !self.lines.is_empty() {
            out.push(String::new());
            out.extend(self.lines.iter().map(|line| format!("  {line}")));
        }
        for warning in &self.warnings {
            out.push(format!("warning: {warning}"));
        }
        if let Some(hint) = &self.hint {
            out.push(format!("hint: {hint}"));
        }
        out.join("\n")
    }
}

#[derive(Serialize)]
struct Envelope<'a, B: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    body: B,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

#[derive(Serialize)]
struct Data<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct Failure {
    error: JsonError,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            body: Data { data },
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or(&[]),
            hint: human.and_then(|h| h.hint.as_deref()),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }
    if let Some(human) = human {
        println!("{}", human.render());
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            body: Failure {
                error: JsonError::from(err),
            },
            warnings: &[],
            hint,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// One-line rendering used by list-style commands:
/// `[x] td-01h... Write report (high, work, due 2024-05-01)`
pub fn task_line(task: &TaskRecord) -> String {
    let mark = if task.is_completed() { "x" } else { " " };
    let mut meta = vec![task.priority.to_string()];
    if !task.category.trim().is_empty() {
        meta.push(task.category.trim().to_string());
    }
    if let Some(due) = task.due_date {
        meta.push(format!("due {due}"));
    }
    format!("[{mark}] {} {} ({})", task.id, task.title, meta.join(", "))
}

/// First positional argument, skipping global flags and their values.
pub fn infer_command_name_from_args() -> String {
    let mut skip_value = false;
    for arg in std::env::args().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if matches!(arg.as_str(), "--data-dir" | "--config") {
            skip_value = true;
            continue;
        }
        if !arg.starts_with('-') {
            return arg;
        }
    }
    "taskdeck".to_string()
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::NotFound(_) => Some("taskdeck list"),
        Error::InvalidConfig(_) => Some("fix taskdeck.toml then retry"),
        Error::LockFailed(_) => Some("retry once the other taskdeck process exits"),
        _ => None,
    }
}
