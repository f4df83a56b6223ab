use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// bcrypt with a fixed work factor. Hashing and verification run on the
/// blocking pool so other requests keep moving.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Fresh salt on every call.
    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
        Ok(hashed)
    }

    /// A stored value that is not a valid bcrypt hash never verifies.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await?;
        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                Ok(false)
            }
        }
    }

    /// Hash `value` unless it already is a bcrypt hash.
    pub async fn prepare(&self, value: &str) -> Result<String, PasswordError> {
        if is_password_hash(value) {
            return Ok(value.to_owned());
        }
        self.hash(value).await
    }
}

/// `$2a$`, `$2b$` or `$2y$`, two-digit cost, `$`, then 53 characters of salt and digest.
pub fn is_password_hash(value: &str) -> bool {
    let bytes = value.as_bytes();
    value.len() == 60
        && (value.starts_with("$2a$") || value.starts_with("$2b$") || value.starts_with("$2y$"))
        && bytes[4].is_ascii_digit()
        && bytes[5].is_ascii_digit()
        && bytes[6] == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[tokio::test]
    async fn hash_verifies_and_salts_differ() {
        let hasher = PasswordHasher::new(COST);
        let first = hasher.hash("secret123").await.unwrap();
        let second = hasher.hash("secret123").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret123", &first).await.unwrap());
        assert!(hasher.verify("secret123", &second).await.unwrap());
        assert!(!hasher.verify("secret124", &first).await.unwrap());
    }

    #[tokio::test]
    async fn configured_cost_is_embedded() {
        let hashed = PasswordHasher::new(COST).hash("pw").await.unwrap();
        assert!(hashed.starts_with("$2b$04$"));
        assert!(is_password_hash(&hashed));
    }

    #[tokio::test]
    async fn prepare_never_rehashes_a_hash() {
        let hasher = PasswordHasher::new(COST);
        let hashed = hasher.hash("secret123").await.unwrap();

        let again = hasher.prepare(&hashed).await.unwrap();
        assert_eq!(again, hashed);

        let fresh = hasher.prepare("secret123").await.unwrap();
        assert_ne!(fresh, "secret123");
        assert!(hasher.verify("secret123", &fresh).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_does_not_verify() {
        let hasher = PasswordHasher::new(COST);
        assert!(!hasher.verify("secret123", "plaintext-in-db").await.unwrap());
    }

    #[test]
    fn recognizes_hash_format() {
        assert!(!is_password_hash("secret123"));
        assert!(!is_password_hash("$2b$12$short"));
        assert!(!is_password_hash(&format!("$1$12${}", "a".repeat(53))));
        assert!(is_password_hash(&format!("$2y$10${}", "a".repeat(53))));
    }
}
