use crate::context::{AcsContext, Timeouts};
use acs::auth::{BearerToken, UserAgent, mint_token};
use acs::transport::http::HttpTransport;
use acs::{Client, Transport};
use anyhow::{Context, Result};
use reconcile::Waiter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub const ENV_SERVER: &str = "ACS_SERVER";
pub const ENV_STACK: &str = "SPLUNK_STACK";
pub const ENV_TOKEN: &str = "STACK_TOKEN";
pub const ENV_USERNAME: &str = "STACK_USERNAME";
pub const ENV_PASSWORD: &str = "STACK_PASSWORD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("server is required (set --server or ACS_SERVER)")]
    MissingServer,

    #[error("stack is required (set --stack or SPLUNK_STACK)")]
    MissingStack,

    #[error("either auth_token or both username and password must be provided")]
    MissingCredentials,
}

// ============================================================================
// Provider Config
// ============================================================================

/// Connection settings as given; every field may still be missing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// How requests authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Basic { username: String, password: String },
}

/// A validated provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub server: String,
    pub stack: String,
    pub credentials: Credentials,
}

impl ProviderConfig {
    /// Load a JSON provider config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid provider config format in {}", path.display()))
    }

    /// Settings taken from the environment through `lookup`.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server: lookup(ENV_SERVER),
            stack: lookup(ENV_STACK),
            auth_token: lookup(ENV_TOKEN),
            username: lookup(ENV_USERNAME),
            password: lookup(ENV_PASSWORD),
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Layer `over` on top of `self`: a value set in `over` wins.
    #[must_use]
    pub fn overlay(self, over: Self) -> Self {
        Self {
            server: over.server.or(self.server),
            stack: over.stack.or(self.stack),
            auth_token: over.auth_token.or(self.auth_token),
            username: over.username.or(self.username),
            password: over.password.or(self.password),
        }
    }

    /// Check required settings. A token wins over username and password.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let server = present(self.server).ok_or(ConfigError::MissingServer)?;
        let stack = present(self.stack).ok_or(ConfigError::MissingStack)?;
        let credentials = match (present(self.auth_token), present(self.username), present(self.password)) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Basic { username, password },
            _ => return Err(ConfigError::MissingCredentials),
        };

        Ok(ResolvedConfig {
            server,
            stack,
            credentials,
        })
    }
}

fn user_agent() -> UserAgent {
    UserAgent::for_version(env!("CARGO_PKG_VERSION"))
}

impl ResolvedConfig {
    /// Build the session context over `transport`, minting a token first
    /// when only basic credentials are configured.
    pub fn connect_with(self, transport: Arc<dyn Transport>, timeouts: Timeouts) -> Result<AcsContext> {
        let token = match self.credentials {
            Credentials::Token(token) => token,
            Credentials::Basic { username, password } => {
                mint_token(transport.clone(), &self.stack, &username, &password, user_agent())
                    .with_context(|| format!("Could not mint an ACS token for {username}"))?
            }
        };

        let client = Client::builder(transport)
            .editor(BearerToken::new(token))
            .editor(user_agent())
            .build();
        log::debug!("configured stack {} on {}", self.stack, self.server);
        Ok(AcsContext::new(client, self.stack, Waiter::default(), timeouts))
    }

    pub fn connect(self, timeouts: Timeouts) -> Result<AcsContext> {
        let transport = Arc::new(HttpTransport::new(self.server.clone()));
        self.connect_with(transport, timeouts)
    }
}

// ============================================================================
// Tests
// ============================================================================
