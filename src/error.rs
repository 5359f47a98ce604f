//! Error types for Assistbot

use thiserror::Error;

use crate::bootstrap::Stage;

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Workspace failed: {0}")]
    Workspace(String),

    #[error("Environment creation failed: {0}")]
    Environment(String),

    #[error("Dependency installation failed: {0}")]
    Dependency(String),

    #[error("Entry program failed: {0}")]
    Entry(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Manifest error at line {line}: {message}")]
    Manifest { line: usize, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssistError {
    /// The bootstrap stage this failure aborted, if it belongs to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AssistError::Provisioning(_) => Some(Stage::SelectRuntime),
            AssistError::Workspace(_) => Some(Stage::Materialize),
            AssistError::Environment(_) => Some(Stage::CreateEnv),
            AssistError::Dependency(_) | AssistError::Manifest { .. } => Some(Stage::InstallDeps),
            AssistError::Entry(_) => Some(Stage::Launch),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistError>;
