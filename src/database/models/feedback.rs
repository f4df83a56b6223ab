use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, ValidationError};
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub rating: u8,
    pub status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Feedback {
    const COLLECTION: &'static str = "feedbacks";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Feedback {
    pub fn is_visible(&self) -> bool {
        self.status == FeedbackStatus::Active
    }

    /// Soft delete.
    pub fn hide(&mut self) {
        self.status = FeedbackStatus::Hidden;
        self.touch();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    Active,
    Hidden,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackInput {
    pub content: Option<String>,
    pub rating: Option<i64>,
}

fn rating(value: i64) -> Result<u8, ValidationError> {
    if !(1..=5).contains(&value) {
        return Err(ValidationError::field("rating", "Rating must be between 1 and 5"));
    }
    Ok(value as u8)
}

impl FeedbackInput {
    pub fn into_feedback(self, user_id: Uuid) -> Result<Feedback, ValidationError> {
        let (content, value) = match (non_blank(self.content), self.rating) {
            (Some(content), Some(value)) => (content, value),
            _ => return Err(ValidationError::new("Content and rating are required")),
        };
        let now = Utc::now();
        Ok(Feedback {
            id: Uuid::new_v4(),
            user_id,
            content,
            rating: rating(value)?,
            status: FeedbackStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn overlay(self, feedback: &Feedback) -> Result<Feedback, ValidationError> {
        let mut updated = feedback.clone();
        if let Some(content) = non_blank(self.content) {
            updated.content = content;
        }
        if let Some(value) = self.rating {
            updated.rating = rating(value)?;
        }
        updated.touch();
        Ok(updated)
    }
}
