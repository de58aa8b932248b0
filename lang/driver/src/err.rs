use std::path::PathBuf;
use thiserror::Error;

/// Ways the self-hosting bootstrap can fail. Ordinary load failures stay
/// inside the loader as logged `None`s; the bootstrap is the one boundary
/// that reports structured host errors.
#[derive(Error, Debug)]
pub enum BootError {
    #[error("no file on the search path provides module `{0}`")]
    MissingBase(String),
    #[error("module `{0}` is ambiguous between {1:#?}")]
    AmbiguousBase(String, Vec<PathBuf>),
    #[error("failed to compile `{0}`")]
    CompileFailed(PathBuf),
    #[error("`{0}` does not satisfy the compiler contract")]
    BadContract(PathBuf),
    #[error("bootstrap of `{0}` did not reach a fixed point")]
    Diverged(PathBuf),
}

pub type Result<T> = std::result::Result<T, BootError>;
