//! Git integration layer.
//!
//! Clone and push are implemented against the [`WorkingCopy`] trait; the
//! `git2` backend is the only production implementation. Keeping the push
//! logic behind the trait lets the per-ref result interpretation and the
//! remote URL rewrite be exercised without a network.

mod clone;
mod git2_backend;
mod push;

use git2::Oid;

use crate::credential::Credential;
use crate::error::Result;

pub use clone::clone_repository;
pub use git2_backend::Git2WorkingCopy;
pub use push::{PushTarget, push_repository, push_with};

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

/// Per-ref verdict reported by a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStatus {
    Pushed,
    UpToDate,
    Rejected,
    Error,
}

/// One entry of a push result: the verdict plus the tool's summary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub status: RefStatus,
    pub summary: String,
}

impl RefUpdate {
    pub fn new(status: RefStatus, summary: impl Into<String>) -> Self {
        Self {
            status,
            summary: summary.into(),
        }
    }
}

/// Successful push payload.
///
/// "Nothing to push" is still a success; the variant lets callers tell it
/// apart from an actual transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Pushed,
    UpToDate,
}

/// The operations push needs from a local repository.
pub trait WorkingCopy {
    /// URL of `remote`, or `None` if no such remote exists.
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    fn set_remote_url(&self, remote: &str, url: &str) -> Result<()>;

    /// Push `branch` to the identically named branch on `remote`.
    ///
    /// An `Err` means the transfer itself failed. Refusals by the remote are
    /// reported as entries in the returned list.
    fn push(&self, remote: &str, branch: &str, credential: &Credential) -> Result<Vec<RefUpdate>>;

    /// Commit that `HEAD` points at, if any.
    fn local_head(&self) -> Result<Option<Oid>>;

    /// Commit at the tip of `branch` on `remote` after refreshing it.
    fn remote_head(&self, remote: &str, branch: &str, credential: &Credential)
    -> Result<Option<Oid>>;
}
