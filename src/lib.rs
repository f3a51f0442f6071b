//! Crate entry point for **ghops**.
//!
//! A thin layer over git and the GitHub REST API: clone and push with a
//! token injected into the transfer URL, and create/update/delete
//! repositories over HTTP. Every operation reports through [`Outcome`]
//! instead of returning errors, and no operation writes the token to logs
//! or error messages.
//!
//! ```rust,no_run
//! use ghops::git::{PushTarget, clone_repository, push_repository};
//! use std::path::Path;
//!
//! let token = std::env::var("GITHUB_TOKEN").ok();
//! let dest = Path::new("work/tools");
//!
//! let cloned = clone_repository("https://github.com/octocat/tools.git", dest, token.as_deref());
//! if !cloned.is_success() {
//!     eprintln!("{}", cloned.message().unwrap_or_default());
//! }
//! let pushed = push_repository(dest, &PushTarget::default(), token.as_deref());
//! println!("{:?}", pushed);
//! ```

pub mod api;
mod config;
pub mod credential;
mod error;
pub mod git;
mod outcome;
mod paths;

pub use config::{Config, load_config, load_config_from};
pub use error::OpsError;
pub use outcome::Outcome;
pub use paths::{config_file, ghops_home};
