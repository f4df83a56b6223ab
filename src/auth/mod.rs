//! Credential hashing, session tokens, and the two request gates.

pub mod gate;
pub mod password;
pub mod policy;
pub mod token;

pub use gate::{authenticate, bearer_token, AuthError};
pub use password::{is_password_hash, PasswordError, PasswordHasher};
pub use policy::{forbid_self_delete, require_ownership, require_role, PolicyError};
pub use token::{Claims, IssuedToken, TokenError, TokenRejection, TokenService};
