//! REST backend.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::annotation::Annotation;
use crate::marks::{Assignment, QuestionMark};

use super::{AnswerSheet, GradingStatus, GradingStore, StoreError};

const USER_AGENT: &str = concat!("papermark/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Serialize)]
struct GradingPayload<'a> {
    status: GradingStatus,
    total_marks: f32,
    question_marks: &'a [QuestionMark],
}

pub struct HttpStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn sheet_url(&self, sheet_id: &str, tail: &str) -> Result<String, StoreError> {
        Ok(self.url(&format!("/sheets/{}/{}", segment(sheet_id)?, tail)))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        let response = self.agent.get(url).call().map_err(|e| map_error(url, e))?;
        response.into_json::<T>().map_err(|e| StoreError::Http {
            url: url.to_string(),
            message: format!("invalid response body: {}", e),
        })
    }
}

/// Percent-encode an id for use as one path segment. Ids that would be
/// dropped or collapsed by URL normalization are refused.
fn segment(id: &str) -> Result<String, StoreError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(StoreError::Rejected(format!("'{}' is not a valid id", id)));
    }
    Ok(urlencoding::encode(id).into_owned())
}

fn map_error(url: &str, error: ureq::Error) -> StoreError {
    match error {
        ureq::Error::Status(404, _) => StoreError::NotFound(url.to_string()),
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            StoreError::Rejected(format!("{} returned {}: {}", url, code, body.trim()))
        }
        ureq::Error::Transport(transport) => StoreError::Http {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

impl GradingStore for HttpStore {
    fn list_answer_sheets(&self, exam_id: &str) -> Result<Vec<AnswerSheet>, StoreError> {
        self.get_json(&self.url(&format!("/exams/{}/sheets", segment(exam_id)?)))
    }

    fn list_annotations(&self, sheet_id: &str) -> Result<Vec<Annotation>, StoreError> {
        self.get_json(&self.sheet_url(sheet_id, "annotations")?)
    }

    fn delete_annotations(&self, sheet_id: &str) -> Result<(), StoreError> {
        let url = self.sheet_url(sheet_id, "annotations")?;
        self.agent
            .delete(&url)
            .call()
            .map(|_| ())
            .map_err(|e| map_error(&url, e))
    }

    fn insert_annotations(
        &self,
        sheet_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), StoreError> {
        let url = self.sheet_url(sheet_id, "annotations")?;
        self.agent
            .post(&url)
            .send_json(annotations)
            .map(|_| ())
            .map_err(|e| map_error(&url, e))
    }

    fn get_assignment(&self, exam_id: &str, grader_id: &str) -> Result<Assignment, StoreError> {
        let url = self.url(&format!(
            "/exams/{}/graders/{}/assignment",
            segment(exam_id)?,
            segment(grader_id)?
        ));
        match self.get_json(&url) {
            // No assignment yet for this grader
            Err(StoreError::NotFound(_)) => Ok(Assignment::default()),
            other => other,
        }
    }

    fn save_grading(
        &self,
        sheet_id: &str,
        total_marks: f32,
        question_marks: &[QuestionMark],
    ) -> Result<(), StoreError> {
        let url = self.sheet_url(sheet_id, "grading")?;
        self.agent
            .put(&url)
            .send_json(GradingPayload {
                status: GradingStatus::Completed,
                total_marks,
                question_marks,
            })
            .map(|_| ())
            .map_err(|e| map_error(&url, e))
    }

    fn list_question_marks(&self, sheet_id: &str) -> Result<Vec<QuestionMark>, StoreError> {
        self.get_json(&self.sheet_url(sheet_id, "question-marks")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let store = HttpStore::new("https://grading.example.edu/api/");
        assert_eq!(
            store.url("/sheets/s1/annotations"),
            "https://grading.example.edu/api/sheets/s1/annotations"
        );
    }

    #[test]
    fn test_ids_are_one_path_segment_each() {
        let store = HttpStore::new("https://grading.example.edu/api");
        assert_eq!(
            store.sheet_url("a/b?c#d", "grading").unwrap(),
            "https://grading.example.edu/api/sheets/a%2Fb%3Fc%23d/grading"
        );
        assert_eq!(
            store.sheet_url("sheet-7", "annotations").unwrap(),
            "https://grading.example.edu/api/sheets/sheet-7/annotations"
        );
    }

    #[test]
    fn test_dot_and_empty_ids_are_refused() {
        let store = HttpStore::new("https://grading.example.edu/api");
        for id in ["", ".", ".."] {
            assert!(matches!(
                store.sheet_url(id, "annotations"),
                Err(StoreError::Rejected(_))
            ));
            // Refused before any request is made
            assert!(matches!(
                store.list_annotations(id),
                Err(StoreError::Rejected(_))
            ));
        }
    }

    #[test]
    fn test_grading_payload_shape() {
        let rows = [QuestionMark {
            question_number: 1,
            obtained_marks: 7.0,
            max_marks: Some(10.0),
            comment: None,
        }];
        let json = serde_json::to_value(GradingPayload {
            status: GradingStatus::Completed,
            total_marks: 7.0,
            question_marks: &rows,
        })
        .unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["total_marks"], 7.0);
        assert_eq!(json["question_marks"][0]["question_number"], 1);
    }
}
