// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized job events and push-message decoding.
//!
//! Push messages arrive as JSON objects:
//!
//! ```text
//! {"kind": "status", "recipeId": "R1", "jobId": "J1", "payload": "RUNNING", "seq": 7}
//! {"kind": "log",    "recipeId": "R1", "payload": ["line a", "line b"]}
//! ```
//!
//! A status payload is either a status string or `{"status": "..."}`. A log
//! payload is a string (split on newlines), an array of strings, or
//! `{"lines": [...]}`. `jobId` and `seq` are optional.

use crate::id::{JobId, RecipeId};
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where an update entered the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Initial or refreshed snapshot of active jobs
    Snapshot,
    /// Push channel
    Stream,
    /// Direct response to a start/stop command
    Command,
}

crate::simple_display! {
    UpdateSource {
        Snapshot => "snapshot",
        Stream => "stream",
        Command => "command",
    }
}

/// A normalized event about one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEvent {
    Status {
        recipe_id: RecipeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        status: JobStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seq: Option<u64>,
    },
    Log {
        recipe_id: RecipeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        lines: Vec<String>,
    },
}

impl JobEvent {
    pub fn status(recipe_id: impl Into<RecipeId>, job_id: Option<JobId>, status: JobStatus) -> Self {
        JobEvent::Status { recipe_id: recipe_id.into(), job_id, status, seq: None }
    }

    pub fn log<I, S>(recipe_id: impl Into<RecipeId>, job_id: Option<JobId>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JobEvent::Log {
            recipe_id: recipe_id.into(),
            job_id,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn recipe_id(&self) -> &RecipeId {
        match self {
            JobEvent::Status { recipe_id, .. } | JobEvent::Log { recipe_id, .. } => recipe_id,
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            JobEvent::Status { job_id, .. } | JobEvent::Log { job_id, .. } => job_id.as_ref(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Status { .. } => "job:status",
            JobEvent::Log { .. } => "job:log",
        }
    }

    /// One-line summary for log fields.
    pub fn log_summary(&self) -> String {
        let job = match self.job_id() {
            Some(id) => format!(" job={id}"),
            None => String::new(),
        };
        match self {
            JobEvent::Status { recipe_id, status, seq, .. } => {
                let seq = seq.map(|s| format!(" seq={s}")).unwrap_or_default();
                format!("{} recipe={recipe_id}{job} status={status}{seq}", self.name())
            }
            JobEvent::Log { recipe_id, lines, .. } => {
                format!("{} recipe={recipe_id}{job} lines={}", self.name(), lines.len())
            }
        }
    }

    /// Decode one push-channel message.
    pub fn decode(text: &str) -> Result<Self, MalformedEvent> {
        let wire: WireMessage =
            serde_json::from_str(text).map_err(|e| MalformedEvent::Json(e.to_string()))?;
        wire.normalize()
    }
}

/// Why a push message could not be turned into a [`JobEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("invalid json: {0}")]
    Json(String),
    #[error("unknown event kind: {0:?}")]
    UnknownKind(String),
    #[error("missing recipe id")]
    MissingRecipe,
    #[error("invalid status payload: {0}")]
    BadStatus(String),
    #[error("invalid log payload: {0}")]
    BadLog(String),
}

#[derive(Deserialize)]
struct WireMessage {
    kind: String,
    #[serde(rename = "recipeId", alias = "recipe_id", default)]
    recipe_id: Option<String>,
    #[serde(rename = "jobId", alias = "job_id", default)]
    job_id: Option<String>,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    seq: Option<u64>,
}

impl WireMessage {
    fn normalize(self) -> Result<JobEvent, MalformedEvent> {
        let recipe_id = match self.recipe_id {
            Some(r) if !r.trim().is_empty() => RecipeId::new(r),
            _ => return Err(MalformedEvent::MissingRecipe),
        };
        let job_id = self.job_id.filter(|j| !j.is_empty()).map(JobId::new);

        match self.kind.as_str() {
            "status" => {
                let raw = match &self.payload {
                    serde_json::Value::String(s) => s.as_str(),
                    serde_json::Value::Object(map) => {
                        map.get("status").and_then(|v| v.as_str()).ok_or_else(|| {
                            MalformedEvent::BadStatus("object without string `status`".to_string())
                        })?
                    }
                    other => return Err(MalformedEvent::BadStatus(format!("unexpected {other}"))),
                };
                let status =
                    raw.parse::<JobStatus>().map_err(|e| MalformedEvent::BadStatus(e.to_string()))?;
                Ok(JobEvent::Status { recipe_id, job_id, status, seq: self.seq })
            }
            "log" => {
                let lines = log_lines(&self.payload)?;
                Ok(JobEvent::Log { recipe_id, job_id, lines })
            }
            other => Err(MalformedEvent::UnknownKind(other.to_string())),
        }
    }
}

fn log_lines(payload: &serde_json::Value) -> Result<Vec<String>, MalformedEvent> {
    match payload {
        serde_json::Value::String(s) => Ok(s.lines().map(str::to_string).collect()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| MalformedEvent::BadLog(format!("non-string line {v}")))
            })
            .collect(),
        serde_json::Value::Object(map) => match map.get("lines") {
            Some(lines @ serde_json::Value::Array(_)) => log_lines(lines),
            _ => Err(MalformedEvent::BadLog("object without `lines` array".to_string())),
        },
        other => Err(MalformedEvent::BadLog(format!("unexpected {other}"))),
    }
}

/// Files the user selected as input for a reduction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSelection(pub Vec<String>);

impl FileSelection {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(files.into_iter().map(Into::into).collect())
    }

    pub fn files(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
