//! JSON-on-disk store.
//!
//! Layout under the root directory:
//!
//! ```text
//! sheets.json                 all answer sheets
//! assignments.json            per (exam, grader) assignments
//! annotations/<sheet>.json    annotation set of one sheet
//! marks/<sheet>.json          question-mark breakdown of one sheet
//! ```

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::marks::{Assignment, QuestionMark};

use super::{merge_question_marks, AnswerSheet, GradingStatus, GradingStore, StoreError};

const SHEETS_FILE: &str = "sheets.json";
const ASSIGNMENTS_FILE: &str = "assignments.json";
const ANNOTATIONS_DIR: &str = "annotations";
const MARKS_DIR: &str = "marks";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssignmentEntry {
    exam_id: String,
    grader_id: String,
    assignment: Assignment,
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-sheet file path; ids that would escape the directory are refused.
    fn sheet_file(&self, dir: &str, sheet_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !sheet_id.is_empty()
            && sheet_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Rejected(format!(
                "'{}' is not a valid sheet id",
                sheet_id
            )));
        }
        Ok(self.root.join(dir).join(format!("{}.json", sheet_id)))
    }

    fn read_json<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|e| StoreError::Json {
            context: path.display().to_string(),
            source: e,
        })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Json {
            context: path.display().to_string(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn sheets(&self) -> Result<Vec<AnswerSheet>, StoreError> {
        self.read_json(&self.root.join(SHEETS_FILE))
    }
}

impl GradingStore for FileStore {
    fn list_answer_sheets(&self, exam_id: &str) -> Result<Vec<AnswerSheet>, StoreError> {
        Ok(self
            .sheets()?
            .into_iter()
            .filter(|s| s.exam_id == exam_id)
            .collect())
    }

    fn list_annotations(&self, sheet_id: &str) -> Result<Vec<Annotation>, StoreError> {
        self.read_json(&self.sheet_file(ANNOTATIONS_DIR, sheet_id)?)
    }

    fn delete_annotations(&self, sheet_id: &str) -> Result<(), StoreError> {
        let path = self.sheet_file(ANNOTATIONS_DIR, sheet_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    fn insert_annotations(
        &self,
        sheet_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), StoreError> {
        let path = self.sheet_file(ANNOTATIONS_DIR, sheet_id)?;
        let mut stored: Vec<Annotation> = self.read_json(&path)?;
        stored.extend(annotations.iter().cloned());
        self.write_json(&path, &stored)
    }

    fn get_assignment(&self, exam_id: &str, grader_id: &str) -> Result<Assignment, StoreError> {
        let entries: Vec<AssignmentEntry> = self.read_json(&self.root.join(ASSIGNMENTS_FILE))?;
        Ok(entries
            .into_iter()
            .find(|e| e.exam_id == exam_id && e.grader_id == grader_id)
            .map(|e| e.assignment)
            .unwrap_or_default())
    }

    fn save_grading(
        &self,
        sheet_id: &str,
        total_marks: f32,
        question_marks: &[QuestionMark],
    ) -> Result<(), StoreError> {
        let marks_path = self.sheet_file(MARKS_DIR, sheet_id)?;

        let mut sheets = self.sheets()?;
        let sheet = sheets
            .iter_mut()
            .find(|s| s.id == sheet_id)
            .ok_or_else(|| StoreError::NotFound(format!("answer sheet {}", sheet_id)))?;
        sheet.status = GradingStatus::Completed;
        sheet.total_marks = Some(total_marks);
        sheet.graded_at = Some(chrono::Local::now().to_rfc3339());

        let mut rows: Vec<QuestionMark> = self.read_json(&marks_path)?;
        merge_question_marks(&mut rows, question_marks);
        self.write_json(&marks_path, &rows)?;
        self.write_json(&self.root.join(SHEETS_FILE), &sheets)?;

        debug!(
            "Recorded {} question marks for {} in {:?}",
            question_marks.len(),
            sheet_id,
            self.root
        );
        Ok(())
    }

    fn list_question_marks(&self, sheet_id: &str) -> Result<Vec<QuestionMark>, StoreError> {
        self.read_json(&self.sheet_file(MARKS_DIR, sheet_id)?)
    }
}

#[cfg(test)]
impl FileStore {
    /// Register a sheet (replacing one with the same id).
    pub fn put_sheet(&self, sheet: AnswerSheet) -> Result<(), StoreError> {
        let mut sheets = self.sheets()?;
        sheets.retain(|s| s.id != sheet.id);
        sheets.push(sheet);
        self.write_json(&self.root.join(SHEETS_FILE), &sheets)
    }

    /// Set the assignment for an (exam, grader) pair.
    pub fn put_assignment(
        &self,
        exam_id: &str,
        grader_id: &str,
        assignment: Assignment,
    ) -> Result<(), StoreError> {
        let path = self.root.join(ASSIGNMENTS_FILE);
        let mut entries: Vec<AssignmentEntry> = self.read_json(&path)?;
        entries.retain(|e| !(e.exam_id == exam_id && e.grader_id == grader_id));
        entries.push(AssignmentEntry {
            exam_id: exam_id.to_string(),
            grader_id: grader_id.to_string(),
            assignment,
        });
        self.write_json(&path, &entries)
    }
}
