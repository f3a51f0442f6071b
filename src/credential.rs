//! Credential handling and URL rewriting.
//!
//! A [`Credential`] only lives for the duration of one call. It is injected
//! into transfer URLs as user-info (`https://TOKEN@host/path`) and must never
//! show up in logs or error text, so this module also owns the helpers that
//! redact URLs and scrub messages.

use std::fmt;

use crate::error::{OpsError, Result};

const SCHEME_SEPARATOR: &str = "://";
const REDACTED: &str = "****";

/// Shorter tokens are only scrubbed where they sit as URL user-info.
const MIN_BARE_SCRUB_LEN: usize = 4;

/// An opaque API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept a caller-supplied token, rejecting absent or empty values.
    ///
    /// # Errors
    /// Returns [`OpsError::MissingCredential`] when `token` is `None` or empty.
    pub fn new(token: Option<&str>) -> Result<Self> {
        match token {
            Some(t) if !t.is_empty() => Ok(Self(t.to_string())),
            _ => Err(OpsError::MissingCredential),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace the token in `text` with a placeholder.
    ///
    /// The `scheme://TOKEN@` form is always replaced. Bare occurrences are
    /// replaced only for tokens of at least four characters, since a shorter
    /// string would match inside unrelated words.
    pub fn scrub(&self, text: &str) -> String {
        let text = text.replace(
            &format!("{}{}@", SCHEME_SEPARATOR, self.0),
            &format!("{}{}@", SCHEME_SEPARATOR, REDACTED),
        );
        if self.0.len() < MIN_BARE_SCRUB_LEN {
            return text;
        }
        text.replace(&self.0, REDACTED)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Split `url` into `(scheme, rest)` at the first `://`.
fn split_scheme(url: &str) -> Option<(&str, &str)> {
    url.split_once(SCHEME_SEPARATOR)
}

/// Drop a `user[:password]@` prefix from the part of a URL after the scheme.
///
/// Only an `@` that appears before the first `/` counts as user-info, so
/// paths containing `@` are left alone.
fn strip_userinfo(rest: &str) -> &str {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}

/// Build `scheme://credential@rest` from `url`, replacing any user-info it
/// already carries.
///
/// `kind` names the input in the error message (e.g. `"remote URL"`).
///
/// # Errors
/// Returns [`OpsError::MalformedUrl`] when `url` has no scheme separator.
pub fn authenticated_url(url: &str, credential: &Credential, kind: &'static str) -> Result<String> {
    let (scheme, rest) = split_scheme(url).ok_or_else(|| OpsError::MalformedUrl {
        kind,
        url: redact_url(url),
    })?;
    Ok(format!(
        "{}{}{}@{}",
        scheme,
        SCHEME_SEPARATOR,
        credential.expose(),
        strip_userinfo(rest)
    ))
}

/// Like [`authenticated_url`], but insists on exactly one scheme separator.
///
/// Remote URLs such as `https://host/redirect?to=https://other` are refused
/// instead of being rewritten ambiguously.
pub fn authenticated_remote_url(url: &str, credential: &Credential) -> Result<String> {
    if url.matches(SCHEME_SEPARATOR).count() != 1 {
        return Err(OpsError::MalformedUrl {
            kind: "remote URL",
            url: redact_url(url),
        });
    }
    authenticated_url(url, credential, "remote URL")
}

/// Mask the user-info of a URL for diagnostics.
///
/// - `https://ghp_x@github.com/o/r.git` → `https://****@github.com/o/r.git`
/// - `https://github.com/o/r.git` → unchanged
/// - `git@github.com:o/r.git` → unchanged
pub fn redact_url(url: &str) -> String {
    if let Some((scheme, rest)) = split_scheme(url) {
        let stripped = strip_userinfo(rest);
        if stripped.len() != rest.len() {
            return format!("{}{}{}@{}", scheme, SCHEME_SEPARATOR, REDACTED, stripped);
        }
    }
    url.to_string()
}
