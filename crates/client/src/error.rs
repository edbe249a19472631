use academy_core::types::DbId;
use uuid::Uuid;

pub use academy_core::draft::PersistenceError;

/// Failure of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status other than 404.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The addressed course or module does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Where in a course's reconciliation a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    Resolve,
    UpdateCourse,
    UpdateModule(DbId),
    InsertModule(Uuid),
    DeleteModule(DbId),
    /// Storage accepted every change but the local mirror could not be
    /// rewritten.
    Persist,
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStep::Resolve => write!(f, "resolve"),
            SaveStep::UpdateCourse => write!(f, "update course"),
            SaveStep::UpdateModule(id) => write!(f, "update module {id}"),
            SaveStep::InsertModule(key) => write!(f, "insert staged module {key}"),
            SaveStep::DeleteModule(id) => write!(f, "delete module {id}"),
            SaveStep::Persist => write!(f, "persist drafts"),
        }
    }
}

/// Cause carried by a [`SaveFailure`].
#[derive(Debug, thiserror::Error)]
pub enum FailureCause {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// One course's reconciliation stopped partway. Its pending edits are kept
/// for a retry.
#[derive(Debug, thiserror::Error)]
#[error("Saving course '{course_id}' failed at {step}: {cause}")]
pub struct SaveFailure {
    /// External identifier the edits were recorded under.
    pub course_id: String,
    pub step: SaveStep,
    #[source]
    pub cause: FailureCause,
}

impl SaveFailure {
    pub fn new(course_id: &str, step: SaveStep, cause: impl Into<FailureCause>) -> Self {
        Self {
            course_id: course_id.to_string(),
            step,
            cause: cause.into(),
        }
    }

    /// Whether the course itself could not be found.
    pub fn is_course_not_found(&self) -> bool {
        self.step == SaveStep::Resolve
            && matches!(self.cause, FailureCause::Backend(BackendError::NotFound(_)))
    }
}

/// Errors that reject a save as a whole.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Another save on the same session has not finished yet.
    #[error("A save is already in progress")]
    ConcurrentSaveRejected,
}
