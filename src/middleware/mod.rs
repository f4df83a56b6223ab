pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{auth_middleware, AuthUser};
pub use extract::ApiJson;
pub use response::{ApiResponse, ApiResult};
