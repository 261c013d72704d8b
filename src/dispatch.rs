use serde_json::json;
use std::fmt;
use tracing::{info, warn};

use crate::error::DispatchError;
use crate::secrets::SecretProvider;
use crate::transport::{OutboundRequest, Transport};

pub const DEFAULT_SECRET_NAME: &str = "GH_PAT";

const GITHUB_API: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const DISPATCH_ACCEPTED: u16 = 204;

/// Target of a repository dispatch: which repo, which event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub owner: String,
    pub repo: String,
    pub event_type: String,
}

impl DispatchRequest {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            event_type: event_type.into(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/repos/{}/{}/dispatches", GITHUB_API, self.owner, self.repo)
    }

    pub fn body(&self) -> String {
        json!({ "event_type": self.event_type }).to_string()
    }

    fn to_outbound(&self, credential: &Credential) -> OutboundRequest {
        OutboundRequest {
            method: "POST".to_string(),
            url: self.url(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", credential.expose()),
                ),
                ("Accept".to_string(), GITHUB_ACCEPT.to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: self.body(),
        }
    }
}

/// A bearer token, held only for the duration of one dispatch.
pub struct Credential(String);

impl Credential {
    /// Absent, empty and whitespace-only values are all treated as missing.
    pub fn from_secret(secret: Option<String>) -> Option<Self> {
        secret
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(Self)
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub message: String,
}

impl From<DispatchError> for DispatchResult {
    fn from(err: DispatchError) -> Self {
        Self {
            succeeded: false,
            status_code: err.status(),
            message: err.to_string(),
        }
    }
}

pub struct DispatchTrigger<S, T> {
    secrets: S,
    transport: T,
    secret_name: String,
}

impl<S: SecretProvider, T: Transport> DispatchTrigger<S, T> {
    pub fn new(secrets: S, transport: T) -> Self {
        Self {
            secrets,
            transport,
            secret_name: DEFAULT_SECRET_NAME.to_string(),
        }
    }

    pub fn with_secret_name(mut self, name: impl Into<String>) -> Self {
        self.secret_name = name.into();
        self
    }

    /// Sends exactly one dispatch. Anything other than `204 No Content` is an error.
    pub fn request_dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let credential = Credential::from_secret(self.secrets.get_secret(&self.secret_name))
            .ok_or_else(|| DispatchError::ConfigurationMissing {
                name: self.secret_name.clone(),
            })?;

        info!(
            owner = %request.owner,
            repo = %request.repo,
            event_type = %request.event_type,
            "sending repository dispatch"
        );
        let response = self.transport.send(&request.to_outbound(&credential))?;

        if response.status != DISPATCH_ACCEPTED {
            return Err(DispatchError::RemoteRejected {
                status: response.status,
                body: response.body,
            });
        }

        Ok(DispatchResult {
            succeeded: true,
            status_code: Some(response.status),
            message: format!(
                "Dispatched '{}' to {}/{}",
                request.event_type, request.owner, request.repo
            ),
        })
    }

    /// Like [`Self::request_dispatch`], with failures folded into the result.
    pub fn run(&self, request: &DispatchRequest) -> DispatchResult {
        self.request_dispatch(request).unwrap_or_else(|err| {
            warn!(kind = ?err.kind(), "repository dispatch failed: {}", err);
            DispatchResult::from(err)
        })
    }
}
