pub mod course;
pub mod module;
pub mod progress;
