use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// bcrypt hash of the current password, never plaintext.
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn conflict_message(_field: &str) -> String {
        "Email already exists".to_string()
    }
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            self.name.as_deref().unwrap_or_default()
        } else {
            &self.full_name
        }
    }
}

/// User as returned over the API: everything except the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub gender: Option<Gender>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            gender: user.gender,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser::from(&user)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    #[default]
    Learner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Learner => "learner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "learner" => Ok(Role::Learner),
            other => Err(ValidationError::field(
                "role",
                format!("Invalid role '{}': expected admin, teacher or learner", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "suspended" => Ok(AccountStatus::Suspended),
            other => Err(ValidationError::field(
                "status",
                format!("Invalid status '{}': expected active, inactive or suspended", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::field(
                "gender",
                format!("Invalid gender '{}': expected male, female or other", other),
            )),
        }
    }
}

/// Lower-cased, trimmed login key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::field("email", "Invalid email format");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_learner() {
        assert_eq!(Role::default(), Role::Learner);
        assert_eq!(AccountStatus::default(), AccountStatus::Active);
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!("TEACHER".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert!("root".parse::<Role>().is_err());
        assert!("banned".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn email_normalization_and_format() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("a.x.com").is_err());
        assert!(validate_email_format("a@x").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
    }

    #[test]
    fn public_view_omits_password() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Ana".into(),
            name: None,
            email: "a@x.com".into(),
            password: "$2b$12$abcdefghijklmnopqrstuv".into(),
            role: Role::Learner,
            gender: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "learner");
    }
}
