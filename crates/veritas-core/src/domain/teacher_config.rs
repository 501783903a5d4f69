//! Teacher-authored quiz configurations, one per (subject, bimester).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use veritas_state::CONFIGS_COLLECTION;

use super::{DocumentKey, Record, CONFIGS_KEY};

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
}

/// Quiz configuration for one subject in one bimester.
///
/// Fields this type does not model are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherConfig {
    pub subject: String,
    pub bimester: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeacherConfig {
    pub fn new(subject: impl Into<String>, bimester: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            bimester: bimester.into(),
            teacher: None,
            questions: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Whether this config covers the given pair.
    pub fn is_for(&self, subject: &str, bimester: &str) -> bool {
        self.subject == subject && self.bimester == bimester
    }
}

/// Remote document id for a (subject, bimester) pair.
///
/// `"{subject}-{bimester}"` with every run of whitespace replaced by `_`.
pub fn config_document_id(subject: &str, bimester: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(&format!("{}-{}", subject, bimester), "_")
        .into_owned()
}

impl Record for TeacherConfig {
    const KIND: &'static str = "teacher_config";
    const COLLECTION: &'static str = CONFIGS_COLLECTION;
    const LOCAL_KEY: &'static str = CONFIGS_KEY;

    fn document_key(&self) -> DocumentKey {
        DocumentKey::Fixed(config_document_id(&self.subject, &self.bimester))
    }

    fn merge_into(self, local: &mut Vec<Self>) {
        local.retain(|c| !c.is_for(&self.subject, &self.bimester));
        local.push(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_collapses_whitespace_runs() {
        assert_eq!(
            config_document_id("Língua  Portuguesa", "1º Bimestre"),
            "Língua_Portuguesa-1º_Bimestre"
        );
    }

    #[test]
    fn document_id_without_whitespace_is_plain_concatenation() {
        assert_eq!(config_document_id("Math", "B2"), "Math-B2");
    }

    #[test]
    fn local_merge_replaces_same_pair() {
        let mut local = vec![
            TeacherConfig::new("Math", "B1").with_teacher("ana"),
            TeacherConfig::new("Math", "B2"),
        ];
        TeacherConfig::new("Math", "B1")
            .with_teacher("bia")
            .merge_into(&mut local);

        assert_eq!(local.len(), 2);
        let b1: Vec<_> = local.iter().filter(|c| c.is_for("Math", "B1")).collect();
        assert_eq!(b1.len(), 1);
        assert_eq!(b1[0].teacher.as_deref(), Some("bia"));
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let raw = r#"{"subject":"Math","bimester":"B1","timeLimit":30,"questions":[{"text":"2+2","options":["3","4"],"correctOption":1}]}"#;
        let config: TeacherConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.extra.get("timeLimit"), Some(&Value::from(30)));
        assert_eq!(config.questions[0].correct_option, Some(1));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["timeLimit"], 30);
        assert_eq!(back["questions"][0]["correctOption"], 1);
    }
}
