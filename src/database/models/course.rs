use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, require, User, ValidationError};
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub teacher_id: Uuid,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    /// Length in hours.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub status: PublicationStatus,
    #[serde(default)]
    pub enrolled_count: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Course {
    const COLLECTION: &'static str = "courses";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Course {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::field("title", "Title is required"));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ValidationError::field("duration", "Duration must be a non-negative number"));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ValidationError::field("price", "Price must not be negative"));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ValidationError::field("rating", "Rating must be between 0 and 5"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Lifecycle shared by courses and quizzes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
            PublicationStatus::Archived => "archived",
        }
    }
}

/// Create/update body for courses. Every field is optional so that the same
/// shape serves as a full create payload and as an update overlay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub duration: Option<f64>,
    pub price: Option<Decimal>,
    pub thumbnail: Option<String>,
    pub status: Option<PublicationStatus>,
}

impl CourseInput {
    /// New course owned by `teacher`.
    pub fn into_course(self, teacher: &User) -> Result<Course, ValidationError> {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: require(self.title, "title", "Title is required")?,
            description: non_blank(self.description).unwrap_or_default(),
            teacher_id: teacher.id,
            teacher_name: teacher.display_name().to_string(),
            category: non_blank(self.category).unwrap_or_default(),
            level: self.level.unwrap_or_default(),
            duration: self.duration.unwrap_or(0.0),
            price: self.price.unwrap_or_default(),
            thumbnail: non_blank(self.thumbnail).unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            enrolled_count: 0,
            rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        course.validate()?;
        Ok(course)
    }

    /// Apply the provided fields on top of `course` and re-validate the result.
    pub fn overlay(self, course: &Course) -> Result<Course, ValidationError> {
        let mut updated = course.clone();
        if let Some(title) = self.title {
            updated.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(category) = self.category {
            updated.category = category.trim().to_string();
        }
        if let Some(level) = self.level {
            updated.level = level;
        }
        if let Some(duration) = self.duration {
            updated.duration = duration;
        }
        if let Some(price) = self.price {
            updated.price = price;
        }
        if let Some(thumbnail) = self.thumbnail {
            updated.thumbnail = thumbnail.trim().to_string();
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        updated.validate()?;
        updated.touch();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AccountStatus, Role};

    fn teacher() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            full_name: "Binh Tran".into(),
            name: None,
            email: "binh@x.com".into(),
            password: String::new(),
            role: Role::Teacher,
            gender: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_requires_title_and_applies_defaults() {
        let owner = teacher();
        let err = CourseInput::default().into_course(&owner).unwrap_err();
        assert_eq!(err.message, "Title is required");

        let course = CourseInput {
            title: Some("  Spanish A1 ".into()),
            ..Default::default()
        }
        .into_course(&owner)
        .unwrap();
        assert_eq!(course.title, "Spanish A1");
        assert_eq!(course.teacher_id, owner.id);
        assert_eq!(course.teacher_name, "Binh Tran");
        assert_eq!(course.level, CourseLevel::Beginner);
        assert_eq!(course.status, PublicationStatus::Draft);
    }

    #[test]
    fn overlay_keeps_untouched_fields_and_revalidates() {
        let course = CourseInput {
            title: Some("French".into()),
            category: Some("languages".into()),
            ..Default::default()
        }
        .into_course(&teacher())
        .unwrap();

        let updated = CourseInput {
            price: Some(Decimal::new(1999, 2)),
            status: Some(PublicationStatus::Published),
            ..Default::default()
        }
        .overlay(&course)
        .unwrap();
        assert_eq!(updated.category, "languages");
        assert_eq!(updated.price, Decimal::new(1999, 2));
        assert_eq!(updated.status, PublicationStatus::Published);

        let err = CourseInput {
            duration: Some(-1.0),
            ..Default::default()
        }
        .overlay(&course)
        .unwrap_err();
        assert_eq!(err.field_errors.unwrap()["duration"], "Duration must be a non-negative number");
    }
}
