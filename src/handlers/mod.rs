// Three handler tiers, mirrored by the route groups in `crate::app`:
// Public (no auth) → Protected (authentication gate) → Elevated (admin role)

pub mod elevated;
pub mod protected;
pub mod public;
