use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Project {0} is not in the loaded list")]
    UnknownProject(DbId),

    #[error("Invalid project status: {0:?}")]
    InvalidStatus(String),
}
