//! Repository layer: one zero-sized type per table with async query methods.

pub mod completion_repo;
pub mod course_repo;
pub mod module_repo;
pub mod progress_repo;

pub use completion_repo::CompletionRepo;
pub use course_repo::CourseRepo;
pub use module_repo::ModuleRepo;
pub use progress_repo::ProgressRepo;
