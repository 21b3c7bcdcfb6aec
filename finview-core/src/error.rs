use finview_contracts::error::{ApiError, StoreError};
use thiserror::Error;

/// Error value view-models publish through `State::Error` and
/// `Event::Error`. Only carries a display message so it can live inside
/// hashable state enums.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CoreError {
    /// Network or server failure. Retrying the same action may succeed.
    #[error("{0}")]
    Transport(String),

    /// A precondition failed, e.g. the item has no identifier.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),

    /// The view-model's mailbox is full. Nothing reached the server.
    #[error("view-model is busy")]
    Busy,

    #[error("view-model has shut down")]
    Closed,
}

impl CoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        CoreError::Transport(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Transport(_))
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err.to_string())
    }
}

/// Outcome of failed async work, as seen at the task boundary.
///
/// `Cancelled` never reaches a reducer: the runtime drops it and releases
/// the task's background markers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task cancelled")]
    Cancelled,

    #[error(transparent)]
    Failed(#[from] CoreError),
}

impl From<ApiError> for TaskError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => TaskError::Cancelled,
            other => TaskError::Failed(CoreError::Transport(other.to_string())),
        }
    }
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        TaskError::Failed(err.into())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
