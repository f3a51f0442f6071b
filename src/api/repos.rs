use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::ApiClient;
use super::errors::{CREATE_STRATEGIES, DEFAULT_STRATEGIES, describe_failure};
use crate::error::OpsError;
use crate::outcome::Outcome;

/// Body of `POST /user/repos`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
}

impl NewRepository {
    pub fn new(name: impl Into<String>, description: impl Into<String>, private: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            private,
        }
    }
}

/// An optional update field.
///
/// `Unset` is distinct from every value, including `""` and `false`: a field
/// set to an empty string is still sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Unset,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Unset, Self::Set)
    }
}

impl<T: Clone + Into<Value>> Field<T> {
    fn insert_into(&self, key: &str, payload: &mut Map<String, Value>) {
        if let Self::Set(v) = self {
            payload.insert(key.to_string(), v.clone().into());
        }
    }
}

/// Sparse body of `PATCH /repos/{owner}/{repo}`.
///
/// ```
/// use ghops::api::RepoUpdate;
///
/// let update = RepoUpdate::new().description("tools");
/// assert_eq!(update.to_payload().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoUpdate {
    pub description: Field<String>,
    pub homepage: Field<String>,
    pub private: Field<bool>,
    pub has_issues: Field<bool>,
    pub has_projects: Field<bool>,
    pub has_wiki: Field<bool>,
}

impl RepoUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, v: impl Into<String>) -> Self {
        self.description = Field::Set(v.into());
        self
    }

    pub fn homepage(mut self, v: impl Into<String>) -> Self {
        self.homepage = Field::Set(v.into());
        self
    }

    pub fn private(mut self, v: bool) -> Self {
        self.private = Field::Set(v);
        self
    }

    pub fn has_issues(mut self, v: bool) -> Self {
        self.has_issues = Field::Set(v);
        self
    }

    pub fn has_projects(mut self, v: bool) -> Self {
        self.has_projects = Field::Set(v);
        self
    }

    pub fn has_wiki(mut self, v: bool) -> Self {
        self.has_wiki = Field::Set(v);
        self
    }

    /// Only the fields that were set, in a JSON object.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        self.description.insert_into("description", &mut payload);
        self.homepage.insert_into("homepage", &mut payload);
        self.private.insert_into("private", &mut payload);
        self.has_issues.insert_into("has_issues", &mut payload);
        self.has_projects.insert_into("has_projects", &mut payload);
        self.has_wiki.insert_into("has_wiki", &mut payload);
        payload
    }
}

/// Create a repository on api.github.com without setting up a client first.
pub fn create_repository(repo: &NewRepository, token: Option<&str>) -> Outcome<Value> {
    Outcome::run("create_repository", token, |_| {
        Ok(ApiClient::github()?.create_repository(repo, token))
    })
}

impl ApiClient {
    /// Create a repository for the authenticated user.
    ///
    /// On success the payload is the created repository as returned by the API.
    pub fn create_repository(&self, repo: &NewRepository, token: Option<&str>) -> Outcome<Value> {
        Outcome::run("create_repository", token, |credential| {
            info!(name = %repo.name, private = repo.private, "creating repository");
            let body = serde_json::to_value(repo).map_err(|e| OpsError::Api {
                message: e.to_string(),
            })?;
            let created = self.json(
                Method::POST,
                "/user/repos",
                credential,
                Some(&body),
                CREATE_STRATEGIES,
            )?;
            info!(
                name = %repo.name,
                html_url = created.get("html_url").and_then(serde_json::Value::as_str).unwrap_or_default(),
                "repository created"
            );
            Ok(Outcome::success(created))
        })
    }

    /// Apply a partial update to `owner/repo`.
    ///
    /// An update with no fields set is still sent; how the API treats it is
    /// up to the API.
    pub fn update_repository(
        &self,
        owner: &str,
        repo: &str,
        update: &RepoUpdate,
        token: Option<&str>,
    ) -> Outcome<Value> {
        Outcome::run("update_repository", token, |credential| {
            let payload = update.to_payload();
            if payload.is_empty() {
                warn!(owner, repo, "no update fields provided");
            }
            info!(owner, repo, fields = ?payload.keys().collect::<Vec<_>>(), "updating repository");
            let updated = self.json(
                Method::PATCH,
                &format!("/repos/{}/{}", owner, repo),
                credential,
                Some(&Value::Object(payload)),
                DEFAULT_STRATEGIES,
            )?;
            info!(owner, repo, "repository updated");
            Ok(Outcome::success(updated))
        })
    }

    /// Delete `owner/repo`. Only `204 No Content` counts as success.
    pub fn delete_repository(&self, owner: &str, repo: &str, token: Option<&str>) -> Outcome<()> {
        Outcome::run("delete_repository", token, |credential| {
            info!(owner, repo, "deleting repository");
            let resp = self.send(
                Method::DELETE,
                &format!("/repos/{}/{}", owner, repo),
                credential,
                None,
            )?;
            let status = resp.status();
            if status == StatusCode::NO_CONTENT {
                info!(owner, repo, "repository deleted");
                return Ok(Outcome::success(()));
            }
            let body = resp.text().unwrap_or_default();
            let message = if status.is_success() {
                format!(
                    "Delete request returned status {}, expected 204. Response: {}",
                    status.as_u16(),
                    body
                )
            } else {
                describe_failure(status, &body, DEFAULT_STRATEGIES)
            };
            Err(OpsError::Api { message })
        })
    }

    /// Fetch `owner/repo`.
    pub fn get_repository(&self, owner: &str, repo: &str, token: Option<&str>) -> Outcome<Value> {
        Outcome::run("get_repository", token, |credential| {
            let found = self.json(
                Method::GET,
                &format!("/repos/{}/{}", owner, repo),
                credential,
                None,
                DEFAULT_STRATEGIES,
            )?;
            Ok(Outcome::success(found))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_description_is_sent() {
        let p = RepoUpdate::new().description("new text").to_payload();
        assert_eq!(Value::Object(p), json!({"description": "new text"}));
    }

    #[test]
    fn empty_and_false_values_are_still_sent() {
        let p = RepoUpdate::new().homepage("").private(false).to_payload();
        assert_eq!(Value::Object(p), json!({"homepage": "", "private": false}));
    }

    #[test]
    fn feature_toggles_are_sparse() {
        let p = RepoUpdate::new().has_issues(false).has_wiki(true).to_payload();
        assert_eq!(Value::Object(p), json!({"has_issues": false, "has_wiki": true}));
    }

    #[test]
    fn free_create_checks_token_first() {
        let out = create_repository(&NewRepository::new("r", "", false), None);
        assert_eq!(out.message(), Some("GitHub token is required."));
    }

    #[test]
    fn default_update_is_empty() {
        assert!(RepoUpdate::new().to_payload().is_empty());
    }

    #[test]
    fn field_from_option() {
        assert_eq!(Field::from(Some(true)), Field::Set(true));
        assert_eq!(Field::<bool>::from(None), Field::Unset);
    }

    #[test]
    fn new_repository_serializes_exact_fields() {
        let v = serde_json::to_value(NewRepository::new("r", "d", true)).unwrap();
        assert_eq!(v, json!({"name": "r", "description": "d", "private": true}));
    }
}
