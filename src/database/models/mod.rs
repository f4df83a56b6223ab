pub mod certificate;
pub mod coupon;
pub mod course;
pub mod feedback;
pub mod quiz;
pub mod user;

pub use certificate::{Certificate, CertificateInput, CertificateStatus};
pub use coupon::{Coupon, CouponInput};
pub use course::{Course, CourseInput, CourseLevel, PublicationStatus};
pub use feedback::{Feedback, FeedbackInput, FeedbackStatus};
pub use quiz::{Question, QuestionDraft, Quiz, QuizInput};
pub use user::{AccountStatus, Gender, PublicUser, Role, User};

use std::collections::HashMap;
use thiserror::Error;

/// Field-level validation failure, surfaced as 400.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: Option<HashMap<String, String>>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Single-field failure; the field message doubles as the top-level message.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        Self {
            message,
            field_errors: Some(field_errors),
        }
    }
}

/// Trimmed, non-empty string or `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn require(value: Option<String>, field: &str, message: &str) -> Result<String, ValidationError> {
    non_blank(value).ok_or_else(|| ValidationError::field(field, message))
}
