use crate::context::AccountRole;

#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("no list item with key {0}")]
    ItemNotFound(String),

    #[error("section is not present: {0}")]
    SectionAbsent(&'static str),

    #[error("{kind} key already in use: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("{0} is a preset and cannot be modified")]
    ReadOnlyAsset(String),

    #[error("{role} accounts may not {action}")]
    PermissionDenied {
        role: AccountRole,
        action: &'static str,
    },

    #[error("an invite acceptance is already in progress")]
    AlreadyProcessing,

    #[error("translation error: {0}")]
    Translation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reference data error: {0}")]
    Reference(#[from] medsim_reference::ReferenceError),

    #[error("identifier error: {0}")]
    Identifier(#[from] medsim_uuid::UuidError),

    #[error("text error: {0}")]
    Text(#[from] medsim_types::TextError),
}

pub type AuthoringResult<T> = std::result::Result<T, AuthoringError>;
