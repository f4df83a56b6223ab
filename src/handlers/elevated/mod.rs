// Elevated handlers: authenticated and restricted to the admin role.
//
// Each handler opens with `require_role(&user, ADMIN_ONLY)`, so the role gate
// always runs before any lookup or self-protection check.

pub mod coupons;
pub mod questions;
pub mod quizzes;
pub mod users;
