use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::policy::forbid_self_delete;
use crate::auth::{PasswordError, PasswordHasher, PolicyError, TokenError, TokenService};
use crate::database::models::user::{normalize_email, validate_email_format};
use crate::database::models::{AccountStatus, Gender, Role, User, ValidationError};
use crate::database::{Collection, DatabaseError};
use crate::filter::{Filter, FilterError};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("email already exists")]
    EmailTaken,

    #[error("user not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    Inactive,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for UserServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => UserServiceError::EmailTaken,
            DatabaseError::NotFound(_) => UserServiceError::NotFound,
            other => UserServiceError::Database(other),
        }
    }
}

impl From<FilterError> for UserServiceError {
    fn from(err: FilterError) -> Self {
        UserServiceError::Database(DatabaseError::Filter(err))
    }
}

/// Registration and admin-create body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    /// Honoured by `create` only.
    pub role: Option<String>,
    /// Honoured by `create` only.
    pub status: Option<String>,
}

/// Admin update body. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    /// An empty string clears the gender.
    pub gender: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub role: Role,
    pub token: String,
    pub expires_in: i64,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_gender(value: Option<String>) -> Result<Option<Gender>, ValidationError> {
    present(value).map(|g| g.parse()).transpose()
}

/// Every write to the user collection goes through here, so passwords are
/// hashed in exactly one place.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn Collection<User>>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(users: Arc<dyn Collection<User>>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Self-service sign-up. Always a learner, always active.
    pub async fn register(&self, input: NewUser) -> Result<User, UserServiceError> {
        let user = self.build(input, Role::Learner, AccountStatus::Active).await?;
        let user = self.users.insert(user).await?;
        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn create(&self, input: NewUser) -> Result<User, UserServiceError> {
        let role = match present(input.role.clone()) {
            Some(r) => r.parse()?,
            None => Role::Learner,
        };
        let status = match present(input.status.clone()) {
            Some(s) => s.parse()?,
            None => AccountStatus::Active,
        };
        let user = self.build(input, role, status).await?;
        let user = self.users.insert(user).await?;
        info!("Created {} user {} ({})", user.role, user.id, user.email);
        Ok(user)
    }

    async fn build(&self, input: NewUser, role: Role, status: AccountStatus) -> Result<User, UserServiceError> {
        let (full_name, email, password) = match (
            present(input.full_name),
            present(input.email),
            input.password.filter(|p| !p.is_empty()),
        ) {
            (Some(f), Some(e), Some(p)) => (f, e, p),
            _ => {
                return Err(ValidationError::new("full_name, email, and password are required").into())
            }
        };

        let email = normalize_email(&email);
        validate_email_format(&email)?;
        let gender = parse_gender(input.gender)?;
        self.ensure_email_free(&email, None).await?;

        let now = Utc::now();
        Ok(User {
            id: Uuid::new_v4(),
            full_name,
            name: present(input.name),
            email,
            // A value already in bcrypt form is stored as given, so it is never hashed twice.
            password: self.hasher.prepare(&password).await?,
            role,
            gender,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> Result<(), UserServiceError> {
        let existing = self.users.find_one(&Filter::by("email", email)?).await?;
        match existing {
            Some(other) if Some(other.id) != except => Err(UserServiceError::EmailTaken),
            _ => Ok(()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, UserServiceError> {
        self.users.find_by_id(id).await?.ok_or(UserServiceError::NotFound)
    }

    /// All users, newest first.
    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.users.find(&Filter::new().order("created_at desc")?).await?)
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, UserServiceError> {
        let mut user = self.get(id).await?;

        if let Some(full_name) = present(patch.full_name) {
            user.full_name = full_name;
        }
        if let Some(name) = patch.name {
            user.name = present(Some(name));
        }
        if let Some(email) = present(patch.email) {
            let email = normalize_email(&email);
            validate_email_format(&email)?;
            self.ensure_email_free(&email, Some(id)).await?;
            user.email = email;
        }
        if let Some(password) = patch.password.filter(|p| !p.is_empty()) {
            // Clients that echo the stored hash back leave the credential unchanged.
            // Any bcrypt-shaped value is kept verbatim, never re-hashed.
            user.password = self.hasher.prepare(&password).await?;
        }
        if let Some(role) = present(patch.role) {
            user.role = role.parse()?;
        }
        if patch.gender.is_some() {
            user.gender = parse_gender(patch.gender)?;
        }
        if let Some(status) = present(patch.status) {
            user.status = status.parse()?;
        }

        user.updated_at = Utc::now();
        let user = self.users.replace(user).await?;
        info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Caller must already hold the admin role.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), UserServiceError> {
        let target = self.get(id).await?;
        forbid_self_delete(actor, target.id)?;
        if !self.users.delete(target.id).await? {
            return Err(UserServiceError::NotFound);
        }
        info!("User {} deleted by {}", target.id, actor.id);
        Ok(())
    }

    /// Login: unknown email and wrong password are indistinguishable.
    pub async fn authenticate_credentials(&self, request: LoginRequest) -> Result<LoginOutcome, UserServiceError> {
        let (email, password) = match (present(request.email), request.password.filter(|p| !p.is_empty())) {
            (Some(e), Some(p)) => (normalize_email(&e), p),
            _ => return Err(ValidationError::new("Email and password are required").into()),
        };

        let user = match self.users.find_one(&Filter::by("email", email.as_str())?).await? {
            Some(user) => user,
            None => {
                warn!("Login failed: unknown email");
                return Err(UserServiceError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&password, &user.password).await? {
            warn!("Login failed: bad password for {}", user.id);
            return Err(UserServiceError::InvalidCredentials);
        }

        if !user.is_active() {
            warn!("Login refused: {} account {}", user.status, user.id);
            return Err(UserServiceError::Inactive);
        }

        let issued = self.tokens.issue(&user)?;
        info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            role: user.role,
            token: issued.token,
            expires_in: issued.expires_in,
        })
    }
}
