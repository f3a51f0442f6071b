use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{ApiClient, require};
use super::errors::{DEFAULT_STRATEGIES, describe_failure, top_level_message};
use crate::credential::Credential;
use crate::error::{OpsError, Result};
use crate::outcome::Outcome;

/// Top-level `message` of an error body, if any.
fn body_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| top_level_message(&v))
        .unwrap_or_default()
}

impl ApiClient {
    /// Branches of `owner/repo`, as the API lists them (first page only).
    pub fn list_branches(&self, owner: &str, repo: &str, token: Option<&str>) -> Outcome<Value> {
        Outcome::run("list_branches", token, |credential| {
            require(&[owner, repo], "Owner and repository name are required.")?;
            let branches = self.json(
                Method::GET,
                &format!("/repos/{}/{}/branches", owner, repo),
                credential,
                None,
                DEFAULT_STRATEGIES,
            )?;
            debug!(
                owner,
                repo,
                count = branches.as_array().map_or(0, Vec::len),
                "branches listed"
            );
            Ok(Outcome::success(branches))
        })
    }

    fn branch_head(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        credential: &Credential,
    ) -> Result<String> {
        let resp = self.send(
            Method::GET,
            &format!("/repos/{}/{}/git/ref/heads/{}", owner, repo, branch),
            credential,
            None,
        )?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OpsError::Api {
                message: format!("Base branch '{}' not found.", branch),
            });
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(OpsError::Api {
                message: describe_failure(status, &body, DEFAULT_STRATEGIES),
            });
        }
        let reference: Value = resp.json()?;
        reference
            .pointer("/object/sha")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| OpsError::Api {
                message: format!("Reference for branch '{}' carries no commit.", branch),
            })
    }

    /// Create `new_branch` in `owner/repo` pointing at the head of `base_branch`.
    ///
    /// The payload is the created reference.
    pub fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        new_branch: &str,
        base_branch: &str,
        token: Option<&str>,
    ) -> Outcome<Value> {
        Outcome::run("create_branch", token, |credential| {
            require(
                &[owner, repo, new_branch, base_branch],
                "Owner, repo, new branch name, and base branch name are required.",
            )?;
            let sha = self.branch_head(owner, repo, base_branch, credential)?;

            info!(owner, repo, new_branch, base_branch, %sha, "creating branch");
            let body = json!({ "ref": format!("refs/heads/{}", new_branch), "sha": sha });
            let resp = self.send(
                Method::POST,
                &format!("/repos/{}/{}/git/refs", owner, repo),
                credential,
                Some(&body),
            )?;
            let status = resp.status();
            if status.is_success() {
                return Ok(Outcome::success(resp.json::<Value>()?));
            }
            let text = resp.text().unwrap_or_default();
            let message = if status == StatusCode::UNPROCESSABLE_ENTITY
                && body_message(&text).contains("Reference already exists")
            {
                format!("Branch '{}' already exists.", new_branch)
            } else {
                describe_failure(status, &text, DEFAULT_STRATEGIES)
            };
            Err(OpsError::Api { message })
        })
    }

    /// Delete `branch` from `owner/repo`.
    pub fn delete_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        token: Option<&str>,
    ) -> Outcome<()> {
        Outcome::run("delete_branch", token, |credential| {
            require(
                &[owner, repo, branch],
                "Owner, repo, and branch name are required.",
            )?;
            info!(owner, repo, branch, "deleting branch");
            let resp = self.send(
                Method::DELETE,
                &format!("/repos/{}/{}/git/refs/heads/{}", owner, repo, branch),
                credential,
                None,
            )?;
            let status = resp.status();
            if status == StatusCode::NO_CONTENT {
                return Ok(Outcome::success(()));
            }
            let text = resp.text().unwrap_or_default();
            let api_message = body_message(&text);
            let message = if status == StatusCode::UNPROCESSABLE_ENTITY
                && api_message.contains("Reference does not exist")
            {
                format!("Branch '{}' not found or already deleted.", branch)
            } else if status == StatusCode::UNPROCESSABLE_ENTITY
                && api_message.contains("protected branch")
            {
                format!(
                    "Branch '{}' is protected and cannot be deleted through the API.",
                    branch
                )
            } else {
                describe_failure(status, &text, DEFAULT_STRATEGIES)
            };
            Err(OpsError::Api { message })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_message_tolerates_non_json() {
        assert_eq!(body_message("oops"), "");
        assert_eq!(body_message(r#"{"message":"Reference does not exist"}"#), "Reference does not exist");
    }
}
