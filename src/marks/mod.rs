//! Per-question marks and their capped, assignment-aware total.
//!
//! The [`Assignment`] says which questions a grader owns and what each is out
//! of. [`MarksEngine`] clamps input into that range, ignores questions outside
//! the assignment when totalling, and produces one [`QuestionMark`] row per
//! assigned question on save.

use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Questions a grader owns for one exam, with their mark ceilings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Owned question numbers in display order
    pub question_numbers: Vec<u32>,
    /// Ceiling per question; questions missing here are unbounded above
    #[serde(default)]
    pub max_marks: HashMap<u32, f32>,
}

impl Assignment {
    pub fn is_empty(&self) -> bool {
        self.question_numbers.is_empty()
    }

    pub fn owns(&self, question_number: u32) -> bool {
        self.question_numbers.contains(&question_number)
    }

    pub fn max_for(&self, question_number: u32) -> Option<f32> {
        self.max_marks.get(&question_number).copied()
    }

    /// Keep only the first occurrence of each question number.
    fn dedup_questions(mut self) -> Self {
        let mut seen = HashSet::new();
        let before = self.question_numbers.len();
        self.question_numbers.retain(|q| seen.insert(*q));
        if self.question_numbers.len() != before {
            warn!(
                "Assignment listed {} duplicate question number(s)",
                before - self.question_numbers.len()
            );
        }
        self
    }
}

#[cfg(test)]
impl Assignment {
    /// Build from `(question, max)` pairs, in order.
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        Self {
            question_numbers: pairs.iter().map(|(q, _)| *q).collect(),
            max_marks: pairs.iter().copied().collect(),
        }
    }
}

/// One question's outcome for one answer sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMark {
    pub question_number: u32,
    pub obtained_marks: f32,
    /// `None` when the assignment sets no ceiling for the question
    pub max_marks: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Clamp a raw mark into `[0, max]`; without a ceiling only the lower bound
/// applies. NaN counts as zero.
pub fn clamp_mark(raw: f32, max: Option<f32>) -> f32 {
    if raw.is_nan() {
        return 0.0;
    }
    let floor = raw.max(0.0);
    match max {
        Some(max) if max.is_finite() => floor.min(max.max(0.0)),
        _ => floor,
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarksEngine {
    assignment: Assignment,
    marks: BTreeMap<u32, f32>,
    comments: BTreeMap<u32, String>,
}

impl MarksEngine {
    pub fn new(assignment: Assignment) -> Self {
        Self {
            assignment: assignment.dedup_questions(),
            marks: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Store a clamped mark and return the stored value.
    pub fn set_question_mark(&mut self, question_number: u32, raw: f32) -> f32 {
        let stored = clamp_mark(raw, self.assignment.max_for(question_number));
        if stored != raw {
            debug!(
                "Clamped mark for question {} from {} to {}",
                question_number, raw, stored
            );
        }
        self.marks.insert(question_number, stored);
        stored
    }

    pub fn mark(&self, question_number: u32) -> Option<f32> {
        self.marks.get(&question_number).copied()
    }

    pub fn set_comment(&mut self, question_number: u32, comment: impl Into<String>) {
        let comment = comment.into();
        if comment.is_empty() {
            self.comments.remove(&question_number);
        } else {
            self.comments.insert(question_number, comment);
        }
    }

    pub fn comment(&self, question_number: u32) -> Option<&str> {
        self.comments.get(&question_number).map(String::as_str)
    }

    /// Sum of stored marks over assigned questions only.
    pub fn total_obtained_marks(&self) -> f32 {
        self.assignment
            .question_numbers
            .iter()
            .filter_map(|q| self.marks.get(q))
            .sum()
    }

    /// Sum of the ceilings of assigned questions that have one.
    pub fn total_max_marks(&self) -> f32 {
        self.assignment
            .question_numbers
            .iter()
            .filter_map(|q| self.assignment.max_for(*q))
            .sum()
    }

    /// One row per assigned question; untouched questions report zero.
    pub fn question_rows(&self) -> Vec<QuestionMark> {
        self.assignment
            .question_numbers
            .iter()
            .map(|q| QuestionMark {
                question_number: *q,
                obtained_marks: self.marks.get(q).copied().unwrap_or(0.0),
                max_marks: self.assignment.max_for(*q),
                comment: self.comments.get(q).cloned(),
            })
            .collect()
    }
}
