//! Administrator-side course editing.
//!
//! An [`EditorSession`](session::EditorSession) records edits in a draft
//! buffer mirrored to durable storage, and [`save`](session::EditorSession::save)
//! reconciles them against the course API through a
//! [`CourseBackend`](backend::CourseBackend).

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod persistence;
pub mod reconcile;
pub mod session;
