//! Request identity and role gates.
//!
//! [`auth::Principal`] reads the bearer token; [`rbac`] wraps it with the
//! admin-only and signed-in checks handlers declare in their signatures.

pub mod auth;
pub mod rbac;
