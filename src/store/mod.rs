//! Persistence for answer sheets, assignments, annotations and marks.
//!
//! [`GradingStore`] is the contract the grading session talks to. Calls are
//! blocking; the session runs them on the IO task pool.
//!
//! ## Backends
//!
//! - [`FileStore`] - JSON files under a directory
//! - [`HttpStore`] - REST backend over `ureq`
//! - `MemoryStore` - In-process maps with failure injection (test builds only)

mod file;
mod http;
#[cfg(test)]
mod memory;


use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::Annotation;
use crate::marks::{Assignment, QuestionMark};

pub use file::FileStore;
pub use http::HttpStore;
#[cfg(test)]
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingStatus {
    #[default]
    Pending,
    Completed,
}

/// One student's submitted answer sheet for an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub id: String,
    pub exam_id: String,
    pub student_id: String,
    /// Opaque reference the page renderer resolves to the document
    pub file_ref: String,
    #[serde(default)]
    pub status: GradingStatus,
    #[serde(default)]
    pub total_marks: Option<f32>,
    /// RFC 3339 time of the last completed grading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
}

impl AnswerSheet {
    pub fn new(id: &str, exam_id: &str, student_id: &str, file_ref: &str) -> Self {
        Self {
            id: id.to_string(),
            exam_id: exam_id.to_string(),
            student_id: student_id.to_string(),
            file_ref: file_ref.to_string(),
            status: GradingStatus::Pending,
            total_marks: None,
            graded_at: None,
        }
    }
}

pub trait GradingStore: Send + Sync {
    fn list_answer_sheets(&self, exam_id: &str) -> Result<Vec<AnswerSheet>, StoreError>;

    fn list_annotations(&self, sheet_id: &str) -> Result<Vec<Annotation>, StoreError>;

    fn delete_annotations(&self, sheet_id: &str) -> Result<(), StoreError>;

    fn insert_annotations(&self, sheet_id: &str, annotations: &[Annotation])
        -> Result<(), StoreError>;

    /// Full replace: delete everything stored for the sheet, then insert the
    /// new set. The insert never starts if the delete failed, and is skipped
    /// for an empty set.
    fn replace_annotations(
        &self,
        sheet_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), StoreError> {
        self.delete_annotations(sheet_id)?;
        if annotations.is_empty() {
            return Ok(());
        }
        self.insert_annotations(sheet_id, annotations)
    }

    /// Questions the grader owns for the exam. A grader with no assignment
    /// gets an empty one.
    fn get_assignment(&self, exam_id: &str, grader_id: &str) -> Result<Assignment, StoreError>;

    /// Write the per-question rows, the sheet total, and mark the sheet
    /// completed. Rows replace earlier rows for the same question numbers.
    fn save_grading(
        &self,
        sheet_id: &str,
        total_marks: f32,
        question_marks: &[QuestionMark],
    ) -> Result<(), StoreError>;

    fn list_question_marks(&self, sheet_id: &str) -> Result<Vec<QuestionMark>, StoreError>;
}

/// Shared handle to the configured store; cloned into background tasks.
#[derive(Resource, Clone)]
pub struct StoreHandle(pub Arc<dyn GradingStore>);

impl StoreHandle {
    pub fn new(store: impl GradingStore + 'static) -> Self {
        Self(Arc::new(store))
    }
}

/// Merge rows into an existing breakdown, replacing by question number and
/// keeping question order ascending.
pub(crate) fn merge_question_marks(existing: &mut Vec<QuestionMark>, rows: &[QuestionMark]) {
    existing.retain(|old| !rows.iter().any(|r| r.question_number == old.question_number));
    existing.extend(rows.iter().cloned());
    existing.sort_by_key(|r| r.question_number);
}
