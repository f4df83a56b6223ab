// Public handlers: no authentication required.
//
// Service descriptor and health, token acquisition, the published course
// catalog and quiz browsing.

pub mod auth;
pub mod catalog;
pub mod quizzes;
pub mod system;
