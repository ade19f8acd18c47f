//! In-process store with one-shot failure injection.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::annotation::Annotation;
use crate::marks::{Assignment, QuestionMark};

use super::{merge_question_marks, AnswerSheet, GradingStatus, GradingStore, StoreError};

#[derive(Default)]
struct MemoryState {
    sheets: Vec<AnswerSheet>,
    assignments: HashMap<(String, String), Assignment>,
    annotations: HashMap<String, Vec<Annotation>>,
    question_marks: HashMap<String, Vec<QuestionMark>>,
}

/// Operations that fail once, then recover.
#[derive(Default)]
struct FailurePlan {
    delete: bool,
    insert: bool,
    grading: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failures: Mutex<FailurePlan>,
}

fn poisoned() -> StoreError {
    StoreError::Rejected("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| poisoned())
    }

    fn take_failure(&self, pick: impl FnOnce(&mut FailurePlan) -> &mut bool) -> bool {
        match self.failures.lock() {
            Ok(mut plan) => std::mem::take(pick(&mut *plan)),
            Err(_) => false,
        }
    }

    fn arm_failure(&self, pick: impl FnOnce(&mut FailurePlan) -> &mut bool) {
        if let Ok(mut plan) = self.failures.lock() {
            *pick(&mut *plan) = true;
        }
    }

    pub fn with_sheet(self, sheet: AnswerSheet) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.sheets.push(sheet);
        }
        self
    }

    pub fn with_assignment(self, exam_id: &str, grader_id: &str, assignment: Assignment) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .assignments
                .insert((exam_id.to_string(), grader_id.to_string()), assignment);
        }
        self
    }

    pub fn fail_next_delete(&self) {
        self.arm_failure(|p| &mut p.delete);
    }

    pub fn fail_next_insert(&self) {
        self.arm_failure(|p| &mut p.insert);
    }

    pub fn fail_next_grading_save(&self) {
        self.arm_failure(|p| &mut p.grading);
    }

    pub fn sheet(&self, sheet_id: &str) -> Option<AnswerSheet> {
        self.state
            .lock()
            .ok()?
            .sheets
            .iter()
            .find(|s| s.id == sheet_id)
            .cloned()
    }
}

impl GradingStore for MemoryStore {
    fn list_answer_sheets(&self, exam_id: &str) -> Result<Vec<AnswerSheet>, StoreError> {
        Ok(self
            .state()?
            .sheets
            .iter()
            .filter(|s| s.exam_id == exam_id)
            .cloned()
            .collect())
    }

    fn list_annotations(&self, sheet_id: &str) -> Result<Vec<Annotation>, StoreError> {
        Ok(self
            .state()?
            .annotations
            .get(sheet_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_annotations(&self, sheet_id: &str) -> Result<(), StoreError> {
        if self.take_failure(|p| &mut p.delete) {
            return Err(StoreError::Rejected(format!(
                "delete of annotations for {} refused",
                sheet_id
            )));
        }
        self.state()?.annotations.remove(sheet_id);
        Ok(())
    }

    fn insert_annotations(
        &self,
        sheet_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), StoreError> {
        if self.take_failure(|p| &mut p.insert) {
            return Err(StoreError::Rejected(format!(
                "insert of annotations for {} refused",
                sheet_id
            )));
        }
        self.state()?
            .annotations
            .entry(sheet_id.to_string())
            .or_default()
            .extend(annotations.iter().cloned());
        Ok(())
    }

    fn get_assignment(&self, exam_id: &str, grader_id: &str) -> Result<Assignment, StoreError> {
        Ok(self
            .state()?
            .assignments
            .get(&(exam_id.to_string(), grader_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn save_grading(
        &self,
        sheet_id: &str,
        total_marks: f32,
        question_marks: &[QuestionMark],
    ) -> Result<(), StoreError> {
        if self.take_failure(|p| &mut p.grading) {
            return Err(StoreError::Rejected(format!(
                "grading save for {} refused",
                sheet_id
            )));
        }

        let mut state = self.state()?;
        let sheet = state
            .sheets
            .iter_mut()
            .find(|s| s.id == sheet_id)
            .ok_or_else(|| StoreError::NotFound(format!("answer sheet {}", sheet_id)))?;
        sheet.status = GradingStatus::Completed;
        sheet.total_marks = Some(total_marks);

        merge_question_marks(
            state
                .question_marks
                .entry(sheet_id.to_string())
                .or_default(),
            question_marks,
        );
        Ok(())
    }

    fn list_question_marks(&self, sheet_id: &str) -> Result<Vec<QuestionMark>, StoreError> {
        Ok(self
            .state()?
            .question_marks
            .get(sheet_id)
            .cloned()
            .unwrap_or_default())
    }
}
