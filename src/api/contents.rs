//! File contents: read a file or the README, create or update a file.
//!
//! The API carries file bodies as base64. Reads decode them to text; writes
//! encode the caller's text and look up the current blob `sha` first, which
//! the API requires when the file already exists.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::errors::{DEFAULT_STRATEGIES, describe_failure};
use super::{ApiClient, require};
use crate::credential::Credential;
use crate::error::{OpsError, Result};
use crate::outcome::Outcome;

/// A text file as stored in a repository.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    /// Blob id; pass it back when updating the file.
    pub sha: String,
    pub content: String,
}

/// One file to create or overwrite.
///
/// Without an explicit commit message, `Create <path>` or `Update <path>` is
/// used depending on whether the file already exists. Without a branch the
/// repository's default branch is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: String,
    pub content: String,
    pub branch: Option<String>,
    pub message: Option<String>,
}

impl FileUpload {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            branch: None,
            message: None,
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn with_ref(endpoint: String, branch: Option<&str>) -> String {
    match branch {
        Some(b) if !b.is_empty() => format!("{}?ref={}", endpoint, b),
        _ => endpoint,
    }
}

/// Turn a contents document into text. Directories and submodules are refused.
fn decode(path: &str, doc: &Value) -> Result<FileContent> {
    let not_a_file = || OpsError::Api {
        message: format!("Path '{}' is not a file or content is missing.", path),
    };
    if doc.get("type").and_then(Value::as_str) != Some("file") {
        return Err(not_a_file());
    }
    let encoded = doc
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(not_a_file)?;
    // the API wraps base64 at 60 columns
    let packed: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(packed).map_err(|e| OpsError::Api {
        message: format!("Content of '{}' is not valid base64: {}", path, e),
    })?;
    let content = String::from_utf8(bytes).map_err(|_| OpsError::Api {
        message: format!("Content of '{}' is not UTF-8 text.", path),
    })?;
    Ok(FileContent {
        path: doc
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or(path)
            .to_string(),
        sha: doc
            .get("sha")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        content,
    })
}

impl ApiClient {
    /// GET a contents document; `404` means there is no such file.
    fn fetch_file(
        &self,
        endpoint: &str,
        path: &str,
        credential: &Credential,
    ) -> Result<Option<FileContent>> {
        let resp = self.send(Method::GET, endpoint, credential, None)?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(OpsError::Api {
                message: describe_failure(status, &body, DEFAULT_STRATEGIES),
            });
        }
        let doc: Value = resp.json()?;
        decode(path, &doc).map(Some)
    }

    /// Blob id of the file at `endpoint`. A failed lookup means the file is
    /// created rather than updated.
    fn existing_sha(&self, endpoint: &str, credential: &Credential) -> Result<Option<String>> {
        let resp = self.send(Method::GET, endpoint, credential, None)?;
        let status = resp.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "no existing file");
            return Ok(None);
        }
        let doc: Value = resp.json()?;
        Ok(doc.get("sha").and_then(Value::as_str).map(String::from))
    }

    /// Read `path` from `owner/repo`, on `branch` or the default branch.
    ///
    /// A missing file is a success with no payload content (`None`).
    pub fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
        token: Option<&str>,
    ) -> Outcome<Option<FileContent>> {
        Outcome::run("get_file", token, |credential| {
            require(&[owner, repo, path], "Owner, repo, and file path are required.")?;
            let endpoint = with_ref(format!("/repos/{}/{}/contents/{}", owner, repo, path), branch);
            Ok(Outcome::success(self.fetch_file(&endpoint, path, credential)?))
        })
    }

    /// Read the README of `owner/repo`, whatever its file name.
    pub fn get_readme(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        token: Option<&str>,
    ) -> Outcome<Option<FileContent>> {
        Outcome::run("get_readme", token, |credential| {
            require(&[owner, repo], "Owner and repository name are required.")?;
            let endpoint = with_ref(format!("/repos/{}/{}/readme", owner, repo), branch);
            Ok(Outcome::success(self.fetch_file(&endpoint, "README", credential)?))
        })
    }

    /// Create or overwrite one file with a single commit.
    ///
    /// The payload is the API's answer, holding the new `content` and `commit`.
    pub fn put_file(
        &self,
        owner: &str,
        repo: &str,
        upload: &FileUpload,
        token: Option<&str>,
    ) -> Outcome<Value> {
        Outcome::run("put_file", token, |credential| {
            require(
                &[owner, repo, upload.path.as_str()],
                "Owner, repo, and file path are required.",
            )?;
            let endpoint = format!("/repos/{}/{}/contents/{}", owner, repo, upload.path);
            let sha = self.existing_sha(
                &with_ref(endpoint.clone(), upload.branch.as_deref()),
                credential,
            )?;

            let message = upload.message.clone().unwrap_or_else(|| match &sha {
                Some(_) => format!("Update {}", upload.path),
                None => format!("Create {}", upload.path),
            });
            let mut body = json!({
                "message": message,
                "content": STANDARD.encode(upload.content.as_bytes()),
            });
            if let Some(branch) = &upload.branch {
                body["branch"] = json!(branch);
            }
            if let Some(sha) = &sha {
                body["sha"] = json!(sha);
            }

            info!(owner, repo, path = %upload.path, update = sha.is_some(), "writing file");
            let written = self.json(
                Method::PUT,
                &endpoint,
                credential,
                Some(&body),
                DEFAULT_STRATEGIES,
            )?;
            Ok(Outcome::success(written))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_joins_wrapped_base64() {
        let doc = json!({
            "type": "file",
            "path": "LICENSE",
            "sha": "abc",
            "content": "TUlUIExp\nY2Vuc2U=\n"
        });
        let f = decode("LICENSE", &doc).unwrap();
        assert_eq!(f.content, "MIT License");
        assert_eq!(f.sha, "abc");
        assert_eq!(f.path, "LICENSE");
    }

    #[test]
    fn decode_refuses_directories() {
        let err = decode("docs", &json!([{"type": "file"}])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Path 'docs' is not a file or content is missing."
        );
        let err = decode("docs", &json!({"type": "dir"})).unwrap_err();
        assert!(err.to_string().starts_with("Path 'docs'"));
    }

    #[test]
    fn decode_reports_bad_base64() {
        let err = decode("a", &json!({"type": "file", "content": "@@@"})).unwrap_err();
        assert!(err.to_string().starts_with("Content of 'a' is not valid base64"));
    }

    #[test]
    fn ref_query_only_for_named_branch() {
        assert_eq!(with_ref("/x".into(), Some("dev")), "/x?ref=dev");
        assert_eq!(with_ref("/x".into(), Some("")), "/x");
        assert_eq!(with_ref("/x".into(), None), "/x");
    }
}
