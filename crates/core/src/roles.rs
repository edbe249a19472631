//! Well-known role name constants carried in the identity token's `role` claim.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LEARNER: &str = "learner";
