use reqwest::Method;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::errors::{Extractor, describe_failure};
use crate::config::Config;
use crate::credential::Credential;
use crate::error::{OpsError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "ghops";
const API_VERSION: &str = "2022-11-28";

/// Blocking client for the repository-management API.
///
/// The client holds no credential; every call receives the token and the
/// authorization header is rebuilt for that request only.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Client for `base_url` (a trailing `/` is dropped).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client for api.github.com.
    pub fn github() -> Result<Self> {
        Self::new(DEFAULT_API_URL, DEFAULT_USER_AGENT)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, &config.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(credential: &Credential) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {}", credential.expose()))
            .map_err(|_| OpsError::InvalidCredential)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Send one authenticated request and hand back the raw response.
    pub(crate) fn send(
        &self,
        method: Method,
        endpoint: &str,
        credential: &Credential,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, %url, "api request");
        let mut req = self
            .client
            .request(method, &url)
            .headers(Self::headers(credential)?);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send()?;
        debug!(status = resp.status().as_u16(), "api response");
        Ok(resp)
    }

    /// Send a request that answers with a JSON document on success.
    ///
    /// Non-success statuses are turned into an [`OpsError::Api`] using
    /// `strategies` to pull a message out of the body.
    pub(crate) fn json(
        &self,
        method: Method,
        endpoint: &str,
        credential: &Credential,
        body: Option<&Value>,
        strategies: &[Extractor],
    ) -> Result<Value> {
        let resp = self.send(method, endpoint, credential, body)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(OpsError::Api {
                message: describe_failure(status, &text, strategies),
            });
        }
        Ok(resp.json()?)
    }
}
