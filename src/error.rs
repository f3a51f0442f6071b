//! Error types shared by every operation.
//!
//! Operations never hand an [`OpsError`] to their caller directly; they build
//! one internally with `?` and convert it into a failed
//! [`Outcome`](crate::Outcome) at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can make an operation fail.
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("GitHub token is required.")]
    MissingCredential,

    #[error("GitHub token contains characters that cannot be sent in a header.")]
    InvalidCredential,

    #[error("{0}")]
    MissingArguments(String),

    #[error("Unexpected {kind} format: {url}")]
    MalformedUrl { kind: &'static str, url: String },

    #[error("Local path '{}' already exists and is not empty.", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("Invalid git repository at {}.", .0.display())]
    InvalidRepository(PathBuf),

    #[error("Remote '{0}' does not exist.")]
    RemoteNotFound(String),

    #[error("Push failed: {0}")]
    PushFailed(String),

    #[error("Push rejected: {0}")]
    PushRejected(String),

    #[error("Push command returned no information.")]
    NoPushInformation,

    #[error("{message}")]
    Api { message: String },

    #[error("{}", .0.message())]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// Result alias used inside operation bodies.
pub type Result<T> = std::result::Result<T, OpsError>;
