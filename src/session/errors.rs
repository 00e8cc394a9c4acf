/// Precondition violations reported by the session engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A session is already active")]
    AlreadyActive,

    #[error("No selectable techniques: select at least one technique before starting")]
    NoSelectableTechniques,

    #[error("Invalid session configuration for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    #[error("No active session")]
    NotActive,
}
