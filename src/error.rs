use std::path::PathBuf;

/// Failure classes surfaced to the user; each maps to its own exit code.
///
/// Underlying `git2` errors are wrapped at the repository boundary and
/// never shown raw.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No repository was found from the search path upward.
    #[error("Not a git repository: {}", path.display())]
    RepositoryNotFound { path: PathBuf },

    /// The repository has nothing to list, e.g. no commits yet.
    #[error("No branches found in repository")]
    NoBranchesFound,

    /// A git operation failed after the repository was resolved.
    #[error("{context}: {source}")]
    OperationFailed {
        context: String,
        source: git2::Error,
    },
}

impl Error {
    /// Wraps a libgit2 failure with a short description of the attempted step.
    pub fn op(context: impl Into<String>, source: git2::Error) -> Self {
        Self::OperationFailed {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OperationFailed { .. } => 1,
            Self::RepositoryNotFound { .. } => 2,
            Self::NoBranchesFound => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
