//! Domain logic for the course platform.
//!
//! Everything in this crate is free of network and database I/O:
//!
//! - [`resolver`] -- external course identifiers and their resolution to row keys.
//! - [`progress`] -- module lock rule and progress percentage.
//! - [`draft`] -- the administrator's local edit buffer and its persistence port.
//! - [`course`] -- course/module records, enums and sparse patch types.

pub mod course;
pub mod draft;
pub mod error;
pub mod progress;
pub mod resolver;
pub mod roles;
pub mod types;
