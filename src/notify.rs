//! Notify step: dispatch the deployment workflow over HTTP.
//!
//! Failures here are reported to the operator but never change the exit code.
use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::EnvSnapshot;

pub const ACCOUNT_ENV: &str = "SNOWFLAKE_ACCOUNT";
pub const USER_ENV: &str = "SNOWFLAKE_USER";
pub const PASSWORD_ENV: &str = "SNOWFLAKE_PASSWORD";
pub const ROLE_ENV: &str = "SNOWFLAKE_ROLE";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// All credentials the notify step requires, in reporting order.
pub const CREDENTIAL_VARS: [&str; 5] = [ACCOUNT_ENV, USER_ENV, PASSWORD_ENV, ROLE_ENV, TOKEN_ENV];

pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
/// The only status that counts as a triggered workflow.
pub const DISPATCH_ACCEPTED: u16 = 204;

/// Secrets read once at the start of the notify step.
///
/// Only the access token is sent; the rest gate whether dispatch is attempted.
#[derive(Clone)]
pub struct Credentials {
    pub account: String,
    pub user: String,
    pub password: String,
    pub role: String,
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("role", &self.role)
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl Credentials {
    /// Read all credentials, or return the names of those unset or empty.
    pub fn from_env(env: &EnvSnapshot) -> std::result::Result<Self, Vec<&'static str>> {
        let missing: Vec<&'static str> = CREDENTIAL_VARS
            .into_iter()
            .filter(|key| env.get_non_empty(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }
        let read = |key: &str| env.get_non_empty(key).unwrap_or_default().to_string();
        Ok(Self {
            account: read(ACCOUNT_ENV),
            user: read(USER_ENV),
            password: read(PASSWORD_ENV),
            role: read(ROLE_ENV),
            access_token: read(TOKEN_ENV),
        })
    }
}

/// Where the dispatch goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub workflow: String,
    pub git_ref: String,
}

impl DispatchTarget {
    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, self.owner, self.repo, self.workflow
        )
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DispatchBody {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// A fully addressed workflow dispatch, built and sent once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: DispatchBody,
}

impl DispatchRequest {
    pub fn new(target: &DispatchTarget, credentials: &Credentials) -> Self {
        Self {
            url: target.dispatch_url(),
            headers: vec![
                ("Accept", ACCEPT_HEADER.to_string()),
                (
                    "Authorization",
                    format!("Bearer {}", credentials.access_token),
                ),
            ],
            body: DispatchBody {
                git_ref: target.git_ref.clone(),
            },
        }
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of the dispatch response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: String,
}

/// Sends dispatch requests. Any HTTP status is a response, not an error;
/// errors are reserved for transport failures.
pub trait DispatchTransport {
    fn send(&self, request: &DispatchRequest) -> Result<DispatchResponse>;
}

/// Blocking HTTP transport.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTransport for UreqTransport {
    fn send(&self, request: &DispatchRequest) -> Result<DispatchResponse> {
        let mut builder = self.agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        let mut response = builder
            .send_json(&request.body)
            .with_context(|| format!("POST {}", request.url))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .context("read dispatch response body")?;
        Ok(DispatchResponse { status, body })
    }
}

/// How the notify step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    MissingCredentials(Vec<&'static str>),
    Triggered,
    Rejected { status: u16, body: String },
    TransportFailed(String),
}

/// Dispatch the workflow and report the result to the operator.
pub fn notify(
    env: &EnvSnapshot,
    target: &DispatchTarget,
    transport: &dyn DispatchTransport,
) -> NotifyOutcome {
    let credentials = match Credentials::from_env(env) {
        Ok(credentials) => credentials,
        Err(missing) => {
            println!(
                "Please set your credentials in the environment (missing: {}).",
                missing.join(", ")
            );
            return NotifyOutcome::MissingCredentials(missing);
        }
    };

    let request = DispatchRequest::new(target, &credentials);
    tracing::info!(
        url = %request.url,
        git_ref = %request.body.git_ref,
        "dispatching workflow"
    );
    match transport.send(&request) {
        Ok(response) if response.status == DISPATCH_ACCEPTED => {
            println!("Workflow triggered successfully.");
            NotifyOutcome::Triggered
        }
        Ok(response) => {
            println!("Failed to trigger workflow: {}", response.status);
            println!("{}", response.body);
            NotifyOutcome::Rejected {
                status: response.status,
                body: response.body,
            }
        }
        Err(err) => {
            let detail = format!("{err:#}");
            println!("Failed to trigger workflow: {detail}");
            NotifyOutcome::TransportFailed(detail)
        }
    }
}
