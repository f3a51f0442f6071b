use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, Oid, PushOptions, RemoteCallbacks, Repository,
    build::RepoBuilder,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::{RefStatus, RefUpdate, WorkingCopy};
use crate::credential::Credential;
use crate::error::{OpsError, Result};

/// Build callbacks that answer HTTPS auth challenges with the token.
///
/// libgit2 keeps asking as long as the callback hands out credentials, so a
/// second request means the token was refused and the call errors out.
fn callbacks_with_token<'a>(credential: &Credential) -> RemoteCallbacks<'a> {
    let token = credential.expose().to_string();
    let attempts = Cell::new(0u8);
    let mut cb = RemoteCallbacks::new();
    cb.credentials(move |_url, username_from_url, allowed| {
        attempts.set(attempts.get() + 1);
        if attempts.get() > 1 {
            return Err(git2::Error::from_str("authentication rejected by remote"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::userpass_plaintext(username_from_url.unwrap_or(token.as_str()), "")
        } else {
            Cred::default()
        }
    });
    cb
}

fn fetch_opts_with_token<'a>(credential: &Credential) -> FetchOptions<'a> {
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(callbacks_with_token(credential));
    fo
}

/// Clone `url` into `dest`, then point `origin` back at `public_url` so the
/// token does not stay behind in `.git/config`.
///
/// # Errors
/// Returns an error if the clone or the remote rewrite fails.
pub(super) fn clone_into(
    url: &str,
    public_url: &str,
    dest: &Path,
    credential: &Credential,
) -> Result<()> {
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_opts_with_token(credential));
    let repo = builder.clone(url, dest)?;
    repo.remote_set_url("origin", public_url)?;
    Ok(())
}

/// A working copy on disk, driven through `git2`.
pub struct Git2WorkingCopy {
    repo: Repository,
}

impl Git2WorkingCopy {
    /// Open the repository at `path`.
    ///
    /// # Errors
    /// Returns [`OpsError::InvalidRepository`] if `path` is not a git working copy.
    pub fn open(path: &Path) -> Result<Self> {
        let repo =
            Repository::open(path).map_err(|_| OpsError::InvalidRepository(path.to_path_buf()))?;
        Ok(Self { repo })
    }
}

impl WorkingCopy for Git2WorkingCopy {
    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(r) => Ok(Some(r.url().unwrap_or_default().to_string())),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_remote_url(&self, remote: &str, url: &str) -> Result<()> {
        self.repo.remote_set_url(remote, url)?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, credential: &Credential) -> Result<Vec<RefUpdate>> {
        let local_ref = format!("refs/heads/{}", branch);
        if self.repo.find_reference(&local_ref).is_err() {
            return Ok(vec![RefUpdate::new(
                RefStatus::Error,
                format!("src refspec {} does not match any", branch),
            )]);
        }

        let mut remote = self.repo.find_remote(remote)?;
        let refspec = format!("{}:{}", local_ref, local_ref);

        // dst refname -> (old, new)
        let negotiated: RefCell<HashMap<String, (Oid, Oid)>> = RefCell::new(HashMap::new());
        let updates: RefCell<Vec<RefUpdate>> = RefCell::new(Vec::new());
        {
            let mut cb = callbacks_with_token(credential);
            cb.push_negotiation(|proposed| {
                let mut seen = negotiated.borrow_mut();
                for u in proposed {
                    if let Some(dst) = u.dst_refname() {
                        seen.insert(dst.to_string(), (u.src(), u.dst()));
                    }
                }
                Ok(())
            });
            cb.push_update_reference(|refname, status| {
                let update = match status {
                    Some(reason) => RefUpdate::new(RefStatus::Rejected, reason),
                    None => match negotiated.borrow().get(refname) {
                        Some((old, new)) if old == new => {
                            RefUpdate::new(RefStatus::UpToDate, "[up to date]")
                        }
                        Some((old, new)) => RefUpdate::new(
                            RefStatus::Pushed,
                            format!("{:.7}..{:.7}", old.to_string(), new.to_string()),
                        ),
                        None => RefUpdate::new(RefStatus::Pushed, refname),
                    },
                };
                debug!(refname, status = ?update.status, "push reference updated");
                updates.borrow_mut().push(update);
                Ok(())
            });

            let mut opts = PushOptions::new();
            opts.remote_callbacks(cb);
            // libgit2 refuses non-fast-forward updates itself, before any
            // per-ref status reaches the callbacks.
            match remote.push(&[refspec.as_str()], Some(&mut opts)) {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::NotFastForward => {
                    debug!(branch, "push refused as non-fast-forward");
                    return Ok(vec![RefUpdate::new(RefStatus::Rejected, e.message())]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(updates.into_inner())
    }

    fn local_head(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_head(
        &self,
        remote: &str,
        branch: &str,
        credential: &Credential,
    ) -> Result<Option<Oid>> {
        let tracking = format!("refs/remotes/{}/{}", remote, branch);
        let mut r = self.repo.find_remote(remote)?;
        let mut fo = fetch_opts_with_token(credential);
        let refspec = format!("refs/heads/{}:{}", branch, tracking);
        r.fetch(&[refspec.as_str()], Some(&mut fo), None)?;
        match self.repo.find_reference(&tracking) {
            Ok(reference) => Ok(Some(reference.peel_to_commit()?.id())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
