//! Transport abstraction for ACS requests.
//!
//! The [`Transport`] trait sends one fully-built [`Request`] and returns a
//! [`Response`] whose body has already been read to completion, so no live
//! connection ever escapes this layer. The primary implementation is
//! [`http::HttpTransport`].
//!
//! # Testing
//!
//! Use [`MockTransport`] to script responses per route:
//!
//! ```
//! use acs::transport::{Method, MockTransport, Request, Transport};
//!
//! let mock = MockTransport::new();
//! mock.respond(Method::Get, "/stk/adminconfig/v2/indexes/main", 200, r#"{"name":"main"}"#);
//!
//! let response = mock.send(Request::new(Method::Get, "/stk/adminconfig/v2/indexes/main")).unwrap();
//! assert_eq!(response.status, 200);
//! ```

pub mod http;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP methods used by the ACS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Whether the method mutates server state.
    #[must_use]
    pub fn is_mutation(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A request relative to the ACS server root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Path below the server URL, starting with `/`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a request without headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set (or replace) a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Look up a header value, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8 text (empty if absent).
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

/// A drained HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Value of the `X-REQUEST-ID` header, used for server-side correlation.
    pub request_id: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response from a status and a text body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            request_id: None,
            body: body.into().into_bytes(),
        }
    }

    /// Attach a request id.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// The canonical reason phrase of the status code ("OK", "Accepted",
    /// "Too Many Requests", ...), or `""` for unregistered codes.
    #[must_use]
    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase(self.status)
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }
}

/// Canonical reason phrase for a status code.
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Sends requests to the ACS.
///
/// Implementations must be safe for concurrent use: a single transport is
/// shared by every resource reconciled in a session.
pub trait Transport: Send + Sync {
    /// Perform one round trip.
    ///
    /// Non-2xx statuses are returned as `Ok`; only a missing response is an
    /// error.
    fn send(&self, request: Request) -> Result<Response>;
}

type Route = (Method, String);
type Scripted = std::result::Result<Response, String>;

/// Scripted transport for tests.
///
/// Responses are queued per `(method, path)`. Each call pops the next
/// response; the final response of a route is sticky and repeats once the
/// queue is down to it. Every request is recorded for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<Route, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Ok(Response::new(status, body)))
    }

    /// Queue a prepared response (e.g. one carrying a request id).
    pub fn respond_with(&self, method: Method, path: &str, response: Response) -> &Self {
        self.push(method, path, Ok(response))
    }

    /// Queue a transport failure for a route.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Err(message.to_string()))
    }

    fn push(&self, method: Method, path: &str, outcome: Scripted) -> &Self {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(outcome);
        self
    }

    /// All requests sent so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Requests sent to one route.
    #[must_use]
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> Result<Response> {
        let route = (request.method, request.path.clone());
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = routes.get_mut(&route) else {
            return Err(Error::transport(format!(
                "no response scripted for {} {}",
                route.0, route.1
            )));
        };

        let outcome = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Transport(message)),
            None => Err(Error::transport("empty response queue")),
        }
    }
}
