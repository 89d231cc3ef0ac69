//! ureq-backed transport.
//!
//! The agent is configured with `http_status_as_error(false)` so that 4xx/5xx
//! responses come back as ordinary [`Response`]s; judging a status is the
//! caller's job.

use super::{Method, Request, Response, Transport};
use crate::error::Result;
use std::time::Duration;

/// Per-request ceiling. Polling and deadlines are handled above this layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Largest response body accepted (ACS bodies are small JSON documents).
const MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// Transport sending requests to a real ACS server.
///
/// # Example
///
/// ```no_run
/// use acs::transport::http::HttpTransport;
/// use acs::transport::{Method, Request, Transport};
///
/// let transport = HttpTransport::new("https://admin.splunk.com");
/// let response = transport
///     .send(Request::new(Method::Get, "/my-stack/adminconfig/v2/indexes/main"))
///     .unwrap();
/// println!("{} {}", response.status, response.reason_phrase());
/// ```
pub struct HttpTransport {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// ACS server URL, without trailing slash.
    server: String,
}

impl HttpTransport {
    /// Create a transport for the given server URL.
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        let server = server.into().trim_end_matches('/').to_string();
        Self { agent, server }
    }

    /// The server URL requests are sent to.
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response> {
        let url = self.url(&request.path);
        let body = request.body.unwrap_or_default();
        let headers = &request.headers;

        let mut response = match request.method {
            Method::Get => with_headers(self.agent.get(&url), headers).call()?,
            Method::Post => with_headers(self.agent.post(&url), headers).send(&body[..])?,
            Method::Patch => with_headers(self.agent.patch(&url), headers).send(&body[..])?,
            Method::Delete if body.is_empty() => {
                with_headers(self.agent.delete(&url), headers).call()?
            }
            Method::Delete => with_headers(self.agent.delete(&url), headers)
                .force_send_body()
                .send(&body[..])?,
        };

        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()?;

        Ok(Response {
            status,
            request_id,
            body,
        })
    }
}
