use thiserror::Error;

/// Failures that make an input archive unusable. These abort the run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid ZIP archive: {0}")]
    InvalidZip(#[from] zip::result::ZipError),
    #[error("Archive entry '{0}' is password-protected")]
    PasswordProtected(String),
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}
