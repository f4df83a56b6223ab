// Protected handlers: every route here sits behind `auth_middleware`, which
// puts the live `AuthUser` into request extensions.
//
// Role and ownership checks happen per handler through `crate::auth::policy`.

pub mod certificates;
pub mod courses;
pub mod feedbacks;
pub mod profile;
