use thiserror::Error;

/// Errors returned by cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GcCacheError {
    /// An argument handle no longer refers to a live value.
    #[error("invalid argument: `{0}` has already been dropped")]
    InvalidArgument(&'static str),
}

pub(crate) type Result<T> = std::result::Result<T, GcCacheError>;
