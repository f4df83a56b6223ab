pub mod users;

pub use users::{LoginOutcome, LoginRequest, NewUser, UserPatch, UserService, UserServiceError};
