use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::ApiClient;
use super::errors::DEFAULT_STRATEGIES;
use crate::outcome::Outcome;

impl ApiClient {
    /// Check a token by fetching the user it belongs to.
    pub fn validate_token(&self, token: Option<&str>) -> Outcome<Value> {
        Outcome::run("validate_token", token, |credential| {
            let user = self.json(Method::GET, "/user", credential, None, DEFAULT_STRATEGIES)?;
            info!(
                login = user.get("login").and_then(serde_json::Value::as_str).unwrap_or_default(),
                "token is valid"
            );
            Ok(Outcome::success(user))
        })
    }
}
