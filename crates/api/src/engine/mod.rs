//! Learner completion engine.
//!
//! Records completion facts, keeps progress summaries derived from them, and
//! evaluates the module lock rule for a learner.

pub mod completion;
