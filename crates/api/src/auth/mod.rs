//! Identity token handling.
//!
//! Tokens are issued by an external authentication service; this server only
//! validates them. [`jwt::issue_token`] exists for tests and tooling.

pub mod jwt;
