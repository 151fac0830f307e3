//! Export/import file format.
//!
//! ```json
//! { "tasks": [ ... ], "exportDate": "2024-04-05T10:00:00Z", "version": "1.0" }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::TaskRecord;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub tasks: Vec<TaskRecord>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportBundle {
    pub fn new(tasks: Vec<TaskRecord>, export_date: DateTime<Utc>) -> Self {
        Self {
            tasks,
            export_date,
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bundle: ExportBundle = serde_json::from_slice(data)
            .map_err(|err| Error::Validation(format!("not a taskdeck export: {err}")))?;
        bundle.check_version()?;
        Ok(bundle)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Any `1.x` version is readable.
    pub fn check_version(&self) -> Result<()> {
        let major = self.version.trim().split('.').next().unwrap_or("");
        if major == "1" {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "unsupported export version '{}' (expected {EXPORT_VERSION})",
                self.version
            )))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// `(original id, new id)` for records whose id was already taken.
    pub rekeyed: Vec<(String, String)>,
}
