//! Student quiz results. Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use veritas_state::RESULTS_COLLECTION;

use super::{DocumentKey, Record, RESULTS_KEY};

/// One student's submission for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub student_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub subject: String,
    pub bimester: String,
    pub score: f64,
    pub total_questions: u32,
    /// Chosen option per question; `None` when left blank.
    #[serde(default)]
    pub answers: Vec<Option<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudentResult {
    pub fn new(
        student_name: impl Into<String>,
        subject: impl Into<String>,
        bimester: impl Into<String>,
        score: f64,
        total_questions: u32,
    ) -> Self {
        Self {
            student_name: student_name.into(),
            class_name: None,
            subject: subject.into(),
            bimester: bimester.into(),
            score,
            total_questions,
            answers: Vec::new(),
            submitted_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_answers(mut self, answers: Vec<Option<usize>>) -> Self {
        self.answers = answers;
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(at);
        self
    }
}

impl Record for StudentResult {
    const KIND: &'static str = "student_result";
    const COLLECTION: &'static str = RESULTS_COLLECTION;
    const LOCAL_KEY: &'static str = RESULTS_KEY;

    fn document_key(&self) -> DocumentKey {
        DocumentKey::Generated
    }

    fn merge_into(self, local: &mut Vec<Self>) {
        local.push(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_results_are_both_kept() {
        let result = StudentResult::new("Bia", "Math", "B1", 8.0, 10);
        let mut local = Vec::new();
        result.clone().merge_into(&mut local);
        result.merge_into(&mut local);
        assert_eq!(local.len(), 2);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let result = StudentResult::new("Bia", "Math", "B1", 8.0, 10)
            .with_class("7A")
            .with_answers(vec![Some(1), None]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["studentName"], "Bia");
        assert_eq!(json["className"], "7A");
        assert_eq!(json["totalQuestions"], 10);
        assert_eq!(json["answers"][1], Value::Null);
    }
}
