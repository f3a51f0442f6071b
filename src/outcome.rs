//! The uniform result shape returned by every operation.

use tracing::error;

use crate::credential::Credential;
use crate::error::{OpsError, Result};

/// Outcome of one operation: a payload (and maybe a note), or an error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success { payload: T, message: Option<String> },
    Failure { message: String },
}

impl<T> Outcome<T> {
    pub fn success(payload: T) -> Self {
        Self::Success {
            payload,
            message: None,
        }
    }

    pub fn success_with_message(payload: T, message: impl Into<String>) -> Self {
        Self::Success {
            payload,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The error message on failure, or the informational note on success.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Failure { message } => Some(message),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Run an operation body behind the credential precondition.
    ///
    /// The body only executes when `token` is a non-empty credential. Any
    /// error it returns becomes a failure whose message has the credential
    /// scrubbed out.
    pub(crate) fn run(
        op: &str,
        token: Option<&str>,
        body: impl FnOnce(&Credential) -> Result<Self>,
    ) -> Self {
        match Credential::new(token) {
            Ok(credential) => Self::from_result(op, body(&credential), Some(&credential)),
            Err(e) => Self::from_result(op, Err(e), None),
        }
    }

    /// Convert an operation body's result, scrubbing `credential` from the
    /// error text. `op` only labels the log line.
    fn from_result(op: &str, res: Result<Self>, credential: Option<&Credential>) -> Self {
        match res {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut message = e.to_string();
                if let Some(c) = credential {
                    message = c.scrub(&message);
                }
                error!(operation = op, "{}", message);
                Self::failure(message)
            }
        }
    }
}

impl<T> From<OpsError> for Outcome<T> {
    fn from(e: OpsError) -> Self {
        Self::failure(e.to_string())
    }
}
