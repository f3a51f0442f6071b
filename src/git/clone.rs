use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::git2_backend::clone_into;
use crate::credential::{authenticated_url, redact_url};
use crate::error::{OpsError, Result};
use crate::outcome::Outcome;

/// Make sure `dest` can receive a clone.
///
/// - missing → created together with its parents
/// - existing and empty → used in place
/// - existing and non-empty → refused, left untouched
fn prepare_destination(dest: &Path) -> Result<()> {
    if dest.exists() {
        if fs::read_dir(dest)?.next().is_some() {
            warn!(path = %dest.display(), "destination is not empty, clone aborted");
            return Err(OpsError::DestinationNotEmpty(dest.to_path_buf()));
        }
        info!(path = %dest.display(), "destination exists but is empty");
    } else {
        fs::create_dir_all(dest)?;
        info!(path = %dest.display(), "created destination directory");
    }
    Ok(())
}

/// Clone `source` into `destination` using `token` for authentication.
///
/// The token is injected into the transfer URL only; once the clone
/// completes, `origin` points back at `source`.
///
/// Fails without side effects when the token is missing, `source` has no
/// `scheme://` prefix, or `destination` is a non-empty directory.
pub fn clone_repository(source: &str, destination: &Path, token: Option<&str>) -> Outcome<()> {
    Outcome::run("clone", token, |credential| {
        let url = authenticated_url(source, credential, "repository URL")?;
        prepare_destination(destination)?;

        info!(
            source = %redact_url(source),
            path = %destination.display(),
            "cloning repository"
        );
        clone_into(&url, source, destination, credential)?;
        info!(path = %destination.display(), "repository cloned");
        Ok(Outcome::success(()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prepare_creates_missing_parents() {
        let td = tempdir().unwrap();
        let dest = td.path().join("a").join("b");
        prepare_destination(&dest).unwrap();
        assert!(dest.is_dir());
    }

    #[test]
    fn prepare_accepts_empty_directory() {
        let td = tempdir().unwrap();
        prepare_destination(td.path()).unwrap();
    }

    #[test]
    fn prepare_refuses_non_empty_directory() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("keep.txt"), "x").unwrap();
        let err = prepare_destination(td.path()).unwrap_err();
        assert!(matches!(err, OpsError::DestinationNotEmpty(_)));
        assert!(td.path().join("keep.txt").exists());
    }
}
