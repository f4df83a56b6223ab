use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::course::PublicationStatus;
use super::{non_blank, require, ValidationError};
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    #[serde(rename = "courseTitle", default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub status: PublicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Quiz {
    const COLLECTION: &'static str = "quizzes";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "questionText")]
    pub question_text: String,
    pub options: AnswerOptions,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: AnswerKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "A" => Some(AnswerKey::A),
            "B" => Some(AnswerKey::B),
            "C" => Some(AnswerKey::C),
            "D" => Some(AnswerKey::D),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

/// Unvalidated question. Used for incoming bodies and as the merge target
/// when a stored question is partially patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "questionText", default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub options: Option<OptionsDraft>,
    #[serde(rename = "correctAnswer", default)]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsDraft {
    #[serde(rename = "A", default)]
    pub a: Option<String>,
    #[serde(rename = "B", default)]
    pub b: Option<String>,
    #[serde(rename = "C", default)]
    pub c: Option<String>,
    #[serde(rename = "D", default)]
    pub d: Option<String>,
}

impl From<&Question> for QuestionDraft {
    fn from(question: &Question) -> Self {
        Self {
            question_text: Some(question.question_text.clone()),
            options: Some(OptionsDraft {
                a: Some(question.options.a.clone()),
                b: Some(question.options.b.clone()),
                c: Some(question.options.c.clone()),
                d: Some(question.options.d.clone()),
            }),
            correct_answer: Some(question.correct_answer.as_str().to_string()),
        }
    }
}

impl QuestionDraft {
    /// Field-level overlay: fields present in `patch` win, options merge per key.
    pub fn merge(mut self, patch: QuestionDraft) -> Self {
        if patch.question_text.is_some() {
            self.question_text = patch.question_text;
        }
        if let Some(patch_options) = patch.options {
            let mut options = self.options.unwrap_or_default();
            if patch_options.a.is_some() {
                options.a = patch_options.a;
            }
            if patch_options.b.is_some() {
                options.b = patch_options.b;
            }
            if patch_options.c.is_some() {
                options.c = patch_options.c;
            }
            if patch_options.d.is_some() {
                options.d = patch_options.d;
            }
            self.options = Some(options);
        }
        if patch.correct_answer.is_some() {
            self.correct_answer = patch.correct_answer;
        }
        self
    }

    pub fn validate(self) -> Result<Question, ValidationError> {
        let question_text = non_blank(self.question_text).ok_or_else(|| {
            ValidationError::new("Each question must include a non-empty questionText")
        })?;
        let options = self
            .options
            .ok_or_else(|| ValidationError::new("Each question must include an options object"))?;

        let option = |value: Option<String>, key: &str| {
            non_blank(value).ok_or_else(|| {
                ValidationError::new(format!("Option {} is required and must be a non-empty string", key))
            })
        };
        let options = AnswerOptions {
            a: option(options.a, "A")?,
            b: option(options.b, "B")?,
            c: option(options.c, "C")?,
            d: option(options.d, "D")?,
        };

        let correct_answer = self
            .correct_answer
            .as_deref()
            .and_then(AnswerKey::parse)
            .ok_or_else(|| {
                ValidationError::new(r#"correctAnswer is required and must be one of "A","B","C","D""#)
            })?;

        Ok(Question {
            question_text,
            options,
            correct_answer,
        })
    }
}

/// Validate a list of drafts, reporting the first failing index.
pub fn validate_questions(drafts: Vec<QuestionDraft>) -> Result<Vec<Question>, ValidationError> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft.validate().map_err(|e| {
                ValidationError::new(format!("Invalid question at index {}: {}", index, e.message))
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizInput {
    #[serde(rename = "courseTitle")]
    pub course_title: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub teacher_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<QuestionDraft>>,
    pub status: Option<PublicationStatus>,
}

impl QuizInput {
    pub fn into_quiz(self, created_by: Uuid) -> Result<Quiz, ValidationError> {
        let title = require(self.title, "title", "Title is required")?;
        let questions = validate_questions(self.questions.unwrap_or_default())?;
        let now = Utc::now();
        Ok(Quiz {
            id: Uuid::new_v4(),
            course_title: non_blank(self.course_title),
            teacher_id: self.teacher_id,
            teacher_name: non_blank(self.teacher_name),
            title,
            description: non_blank(self.description).unwrap_or_default(),
            questions,
            created_by: Some(created_by),
            status: self.status.unwrap_or(PublicationStatus::Published),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn overlay(self, quiz: &Quiz) -> Result<Quiz, ValidationError> {
        let mut updated = quiz.clone();
        if let Some(course_title) = self.course_title {
            updated.course_title = non_blank(Some(course_title));
        }
        if let Some(teacher_id) = self.teacher_id {
            updated.teacher_id = Some(teacher_id);
        }
        if let Some(teacher_name) = self.teacher_name {
            updated.teacher_name = non_blank(Some(teacher_name));
        }
        if let Some(title) = self.title {
            updated.title = require(Some(title), "title", "Title is required")?;
        }
        if let Some(description) = self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(questions) = self.questions {
            updated.questions = validate_questions(questions)?;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        updated.touch();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, answer: &str) -> QuestionDraft {
        QuestionDraft {
            question_text: Some(text.into()),
            options: Some(OptionsDraft {
                a: Some("uno".into()),
                b: Some("dos".into()),
                c: Some("tres".into()),
                d: Some("cuatro".into()),
            }),
            correct_answer: Some(answer.into()),
        }
    }

    #[test]
    fn validates_complete_question() {
        let question = draft("Two in Spanish?", "B").validate().unwrap();
        assert_eq!(question.correct_answer, AnswerKey::B);
        assert_eq!(question.options.d, "cuatro");
    }

    #[test]
    fn rejects_bad_answer_and_blank_option() {
        let err = draft("Two?", "E").validate().unwrap_err();
        assert!(err.message.starts_with("correctAnswer is required"));

        let mut blank = draft("Two?", "A");
        blank.options.as_mut().unwrap().c = Some("   ".into());
        let err = blank.validate().unwrap_err();
        assert_eq!(err.message, "Option C is required and must be a non-empty string");
    }

    #[test]
    fn reports_failing_index() {
        let err = validate_questions(vec![draft("ok", "A"), QuestionDraft::default()]).unwrap_err();
        assert_eq!(
            err.message,
            "Invalid question at index 1: Each question must include a non-empty questionText"
        );
    }

    #[test]
    fn patch_overlays_single_fields_then_revalidates() {
        let stored = draft("Two?", "B").validate().unwrap();

        let patch = QuestionDraft {
            options: Some(OptionsDraft {
                b: Some("deux".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = QuestionDraft::from(&stored).merge(patch).validate().unwrap();
        assert_eq!(merged.options.b, "deux");
        assert_eq!(merged.options.a, "uno");
        assert_eq!(merged.question_text, "Two?");

        let bad_patch = QuestionDraft {
            question_text: Some("".into()),
            ..Default::default()
        };
        assert!(QuestionDraft::from(&stored).merge(bad_patch).validate().is_err());
    }

    #[test]
    fn quiz_defaults_to_published() {
        let quiz = QuizInput {
            title: Some("Numbers".into()),
            ..Default::default()
        }
        .into_quiz(Uuid::new_v4())
        .unwrap();
        assert_eq!(quiz.status, PublicationStatus::Published);
        assert!(quiz.questions.is_empty());
    }
}
