//! Repository-management HTTP API.
//!
//! Every call takes the token as an argument, checks it before any network
//! traffic, and reports through [`Outcome`](crate::Outcome). Error bodies are
//! normalized by the strategies in [`errors`].
//!
//! ```rust,no_run
//! use ghops::api::{ApiClient, NewRepository, RepoUpdate};
//!
//! let api = ApiClient::github()?;
//! let token = std::env::var("GITHUB_TOKEN").ok();
//!
//! let created = api.create_repository(&NewRepository::new("tools", "", true), token.as_deref());
//! let updated = api.update_repository(
//!     "octocat",
//!     "tools",
//!     &RepoUpdate::new().homepage("https://example.com"),
//!     token.as_deref(),
//! );
//! # Ok::<(), ghops::OpsError>(())
//! ```

mod branches;
mod client;
mod contents;
pub mod errors;
mod repos;
mod user;

pub use client::{ApiClient, DEFAULT_API_URL, DEFAULT_USER_AGENT};
pub use contents::{FileContent, FileUpload};
pub use repos::{Field, NewRepository, RepoUpdate, create_repository};

use crate::error::{OpsError, Result};

/// Fail with `message` when any of `values` is blank.
fn require(values: &[&str], message: &str) -> Result<()> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(OpsError::MissingArguments(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_flags_blank_values() {
        assert!(require(&["a", "b"], "msg").is_ok());
        let err = require(&["a", " "], "msg").unwrap_err();
        assert_eq!(err.to_string(), "msg");
    }
}
