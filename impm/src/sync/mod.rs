pub mod albums;
pub mod aliases;
pub mod engine;
pub mod library;
pub mod projects;
pub mod proxy;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("api error: {0}")]
    Api(#[from] immich_core::ImmichError),
    #[error("library {0} not found")]
    LibraryNotFound(String),
    #[error("library {0} has no import paths")]
    MissingImportPaths(String),
    #[error("invalid filter pattern: {0}")]
    InvalidFilter(#[from] glob::PatternError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiles an optional project-name filter.
pub fn compile_filter(filter: Option<&str>) -> Result<Option<glob::Pattern>, SyncError> {
    Ok(filter.map(glob::Pattern::new).transpose()?)
}
