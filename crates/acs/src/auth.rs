//! Request decoration and credential bootstrap.
//!
//! A [`Client`](crate::Client) runs every outgoing request through a chain
//! of [`RequestEditor`]s fixed at construction time. The editors here inject
//! credentials and the user agent; credentials are never re-read afterwards.

use crate::error::{Error, Result};
use crate::transport::{Request, Transport};
use crate::types::{NewToken, Token};
use crate::Client;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::sync::Arc;

/// Audience recorded on tokens minted by this client.
pub const TOKEN_AUDIENCE: &str = "acs-terraform";

/// Lifetime requested for minted tokens.
pub const TOKEN_EXPIRY: &str = "+1d";

/// Mutates a request before it is sent.
pub trait RequestEditor: Send + Sync {
    /// Apply this editor to the request.
    fn edit(&self, request: &mut Request);
}

/// Adds `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl RequestEditor for BearerToken {
    fn edit(&self, request: &mut Request) {
        request.set_header("Authorization", format!("Bearer {}", self.0));
    }
}

/// Adds `Authorization: Basic <base64(user:password)>`.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn encoded(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl RequestEditor for BasicAuth {
    fn edit(&self, request: &mut Request) {
        request.set_header("Authorization", format!("Basic {}", self.encoded()));
    }
}

/// Adds `User-Agent: ACS-terraform-<version>`.
#[derive(Debug, Clone)]
pub struct UserAgent(String);

impl UserAgent {
    /// User agent for the given provider version.
    pub fn for_version(version: &str) -> Self {
        Self(format!("ACS-terraform-{version}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RequestEditor for UserAgent {
    fn edit(&self, request: &mut Request) {
        request.set_header("User-Agent", self.0.clone());
    }
}

/// Exchange basic credentials for an ephemeral bearer token.
///
/// Calls `POST /{stack}/adminconfig/v2/tokens` once with basic auth. Any
/// status other than 200 is reported as [`Error::TokenMint`].
pub fn mint_token(
    transport: Arc<dyn Transport>,
    stack: &str,
    username: &str,
    password: &str,
    user_agent: UserAgent,
) -> Result<String> {
    let client = Client::builder(transport)
        .editor(BasicAuth::new(username, password))
        .editor(user_agent)
        .build();

    let body = NewToken {
        user: username.to_string(),
        audience: TOKEN_AUDIENCE.to_string(),
        token_type: "ephemeral".to_string(),
        expires_on: Some(TOKEN_EXPIRY.to_string()),
    };
    let response = client.create_token(stack, &body)?;

    if response.status != 200 {
        return Err(Error::TokenMint {
            status: response.status,
            message: response.text(),
        });
    }

    let token: Token = response.json()?;
    log::info!(
        "minted ephemeral ACS token for user {} (request id: {})",
        username,
        response.request_id.as_deref().unwrap_or("-")
    );
    Ok(token.token)
}
