//! # acs
//!
//! Blocking client for the Splunk Cloud Platform Admin Config Service (ACS)
//! v2 API.
//!
//! This crate provides:
//! - Sparse wire models for indexes, HEC tokens, IP allowlists, roles and users
//! - A [`Client`] exposing one method per ACS endpoint
//! - Request decoration (bearer/basic credentials, user agent)
//! - A one-shot token mint for basic credentials
//!
//! Endpoint methods return the raw, fully-read [`Response`] regardless of
//! status. Deciding whether a status means success, "try again" or failure
//! belongs to the caller.
//!
//! ## Example
//!
//! ```no_run
//! use acs::auth::{BearerToken, UserAgent};
//! use acs::transport::http::HttpTransport;
//! use acs::Client;
//! use std::sync::Arc;
//!
//! let client = Client::builder(Arc::new(HttpTransport::new("https://admin.splunk.com")))
//!     .editor(BearerToken::new("eyJ..."))
//!     .editor(UserAgent::for_version("0.1.0"))
//!     .build();
//!
//! let response = client.get_index("my-stack", "main").unwrap();
//! println!("{} {}", response.status, response.reason_phrase());
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use transport::{Method, Request, Response, Transport};

use auth::RequestEditor;
use serde::Serialize;
use std::sync::Arc;
use types::{
    HecTokenPatch, HecTokenSpec, Index, IndexPatch, IpVersion, NewToken, NewUser, Role, RoleSpec,
    Subnets, UserPatch,
};
use urlencoding::encode;

/// Header carrying the federated search acknowledgement for roles and users.
pub const FEDERATED_SEARCH_ACK_HEADER: &str = "Federated-Search-Manage-Ack";

/// Client for the ACS v2 API.
///
/// Cheap to clone and safe to share between threads; every clone uses the
/// same transport and editor chain.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    editors: Arc<Vec<Box<dyn RequestEditor>>>,
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    editors: Vec<Box<dyn RequestEditor>>,
}

impl ClientBuilder {
    /// Append an editor to the chain. Editors run in insertion order.
    #[must_use]
    pub fn editor(mut self, editor: impl RequestEditor + 'static) -> Self {
        self.editors.push(Box::new(editor));
        self
    }

    #[must_use]
    pub fn build(self) -> Client {
        Client {
            transport: self.transport,
            editors: Arc::new(self.editors),
        }
    }
}

impl Client {
    /// Start building a client over the given transport.
    pub fn builder(transport: Arc<dyn Transport>) -> ClientBuilder {
        ClientBuilder {
            transport,
            editors: Vec::new(),
        }
    }

    fn base(stack: &str) -> String {
        format!("/{}/adminconfig/v2", encode(stack))
    }

    fn send(&self, mut request: Request) -> Result<Response> {
        for editor in self.editors.iter() {
            editor.edit(&mut request);
        }
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request)?;
        log::debug!(
            "{} {} -> {} {}",
            method,
            path,
            response.status,
            response.reason_phrase()
        );
        Ok(response)
    }

    fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: String,
        body: &B,
        ack: Option<&str>,
    ) -> Result<Response> {
        let mut request = Request::new(method, path);
        request.body =
            Some(serde_json::to_vec(body).map_err(|e| Error::InvalidRequest(e.to_string()))?);
        request.set_header("Content-Type", "application/json");
        if let Some(ack) = ack {
            request.set_header(FEDERATED_SEARCH_ACK_HEADER, ack);
        }
        self.send(request)
    }

    fn get(&self, path: String) -> Result<Response> {
        self.send(Request::new(Method::Get, path))
    }

    fn delete(&self, path: String) -> Result<Response> {
        self.send(Request::new(Method::Delete, path))
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    pub fn create_index(&self, stack: &str, body: &Index) -> Result<Response> {
        self.send_json(Method::Post, format!("{}/indexes", Self::base(stack)), body, None)
    }

    pub fn get_index(&self, stack: &str, name: &str) -> Result<Response> {
        self.get(format!("{}/indexes/{}", Self::base(stack), encode(name)))
    }

    pub fn patch_index(&self, stack: &str, name: &str, body: &IndexPatch) -> Result<Response> {
        let path = format!("{}/indexes/{}", Self::base(stack), encode(name));
        self.send_json(Method::Patch, path, body, None)
    }

    pub fn delete_index(&self, stack: &str, name: &str) -> Result<Response> {
        self.delete(format!("{}/indexes/{}", Self::base(stack), encode(name)))
    }

    // =========================================================================
    // HEC tokens
    // =========================================================================

    fn hec_path(stack: &str) -> String {
        format!("{}/inputs/http-event-collectors", Self::base(stack))
    }

    pub fn create_hec_token(&self, stack: &str, body: &HecTokenSpec) -> Result<Response> {
        self.send_json(Method::Post, Self::hec_path(stack), body, None)
    }

    pub fn get_hec_token(&self, stack: &str, name: &str) -> Result<Response> {
        self.get(format!("{}/{}", Self::hec_path(stack), encode(name)))
    }

    pub fn patch_hec_token(&self, stack: &str, name: &str, body: &HecTokenPatch) -> Result<Response> {
        let path = format!("{}/{}", Self::hec_path(stack), encode(name));
        self.send_json(Method::Patch, path, body, None)
    }

    pub fn delete_hec_token(&self, stack: &str, name: &str) -> Result<Response> {
        self.delete(format!("{}/{}", Self::hec_path(stack), encode(name)))
    }

    // =========================================================================
    // IP allowlists
    // =========================================================================

    fn allowlist_path(stack: &str, version: IpVersion, feature: &str) -> String {
        format!(
            "{}/access/{}/{}",
            Self::base(stack),
            encode(feature),
            version.path_segment()
        )
    }

    pub fn get_allowlist(&self, stack: &str, version: IpVersion, feature: &str) -> Result<Response> {
        self.get(Self::allowlist_path(stack, version, feature))
    }

    pub fn add_subnets(
        &self,
        stack: &str,
        version: IpVersion,
        feature: &str,
        body: &Subnets,
    ) -> Result<Response> {
        let path = Self::allowlist_path(stack, version, feature);
        self.send_json(Method::Post, path, body, None)
    }

    pub fn delete_subnets(
        &self,
        stack: &str,
        version: IpVersion,
        feature: &str,
        body: &Subnets,
    ) -> Result<Response> {
        let path = Self::allowlist_path(stack, version, feature);
        self.send_json(Method::Delete, path, body, None)
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub fn create_role(&self, stack: &str, body: &Role, ack: Option<&str>) -> Result<Response> {
        self.send_json(Method::Post, format!("{}/roles", Self::base(stack)), body, ack)
    }

    pub fn get_role(&self, stack: &str, name: &str) -> Result<Response> {
        self.get(format!("{}/roles/{}", Self::base(stack), encode(name)))
    }

    pub fn patch_role(
        &self,
        stack: &str,
        name: &str,
        body: &RoleSpec,
        ack: Option<&str>,
    ) -> Result<Response> {
        let path = format!("{}/roles/{}", Self::base(stack), encode(name));
        self.send_json(Method::Patch, path, body, ack)
    }

    pub fn delete_role(&self, stack: &str, name: &str) -> Result<Response> {
        self.delete(format!("{}/roles/{}", Self::base(stack), encode(name)))
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn create_user(&self, stack: &str, body: &NewUser, ack: Option<&str>) -> Result<Response> {
        self.send_json(Method::Post, format!("{}/users", Self::base(stack)), body, ack)
    }

    pub fn get_user(&self, stack: &str, name: &str) -> Result<Response> {
        self.get(format!("{}/users/{}", Self::base(stack), encode(name)))
    }

    pub fn patch_user(
        &self,
        stack: &str,
        name: &str,
        body: &UserPatch,
        ack: Option<&str>,
    ) -> Result<Response> {
        let path = format!("{}/users/{}", Self::base(stack), encode(name));
        self.send_json(Method::Patch, path, body, ack)
    }

    pub fn delete_user(&self, stack: &str, name: &str) -> Result<Response> {
        self.delete(format!("{}/users/{}", Self::base(stack), encode(name)))
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    pub fn create_token(&self, stack: &str, body: &NewToken) -> Result<Response> {
        self.send_json(Method::Post, format!("{}/tokens", Self::base(stack)), body, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BearerToken, UserAgent};
    use crate::transport::MockTransport;

    fn client(mock: &MockTransport) -> Client {
        Client::builder(Arc::new(mock.clone()))
            .editor(BearerToken::new("jwt"))
            .editor(UserAgent::for_version("9.9.9"))
            .build()
    }

    #[test]
    fn test_editors_applied_to_every_request() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/stk/adminconfig/v2/indexes/main", 200, "{}");
        mock.respond(Method::Delete, "/stk/adminconfig/v2/roles/ops", 200, "");

        let client = client(&mock);
        client.get_index("stk", "main").unwrap();
        client.delete_role("stk", "ops").unwrap();

        for call in mock.calls() {
            assert_eq!(call.header("Authorization"), Some("Bearer jwt"));
            assert_eq!(call.header("User-Agent"), Some("ACS-terraform-9.9.9"));
        }
    }

    #[test]
    fn test_json_body_and_content_type() {
        let mock = MockTransport::new();
        mock.respond(Method::Patch, "/stk/adminconfig/v2/indexes/main", 202, "");

        let patch = IndexPatch {
            searchable_days: Some(180),
            ..Default::default()
        };
        let response = client(&mock).patch_index("stk", "main", &patch).unwrap();
        assert_eq!(response.reason_phrase(), "Accepted");

        let call = &mock.calls()[0];
        assert_eq!(call.header("Content-Type"), Some("application/json"));
        assert_eq!(call.body_text(), r#"{"searchableDays":180}"#);
    }

    #[test]
    fn test_allowlist_paths() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/stk/adminconfig/v2/access/hec/ipallowlists", 200, "{}");
        mock.respond(
            Method::Delete,
            "/stk/adminconfig/v2/access/hec/ipallowlists-v6",
            200,
            "",
        );

        let client = client(&mock);
        client.get_allowlist("stk", IpVersion::V4, "hec").unwrap();
        client
            .delete_subnets("stk", IpVersion::V6, "hec", &Subnets::new(["::1/128"]))
            .unwrap();

        let delete = &mock.calls()[1];
        assert_eq!(delete.method, Method::Delete);
        assert_eq!(delete.body_text(), r#"{"subnets":["::1/128"]}"#);
    }

    #[test]
    fn test_federated_search_ack_header() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/stk/adminconfig/v2/roles", 200, "");

        let role = Role {
            name: "fsh".to_string(),
            spec: RoleSpec::default(),
        };
        client(&mock).create_role("stk", &role, Some("Y")).unwrap();
        assert_eq!(
            mock.calls()[0].header(FEDERATED_SEARCH_ACK_HEADER),
            Some("Y")
        );
    }

    #[test]
    fn test_hec_paths() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/stk/adminconfig/v2/inputs/http-event-collectors/h1",
            404,
            "",
        );
        let response = client(&mock).get_hec_token("stk", "h1").unwrap();
        assert_eq!(response.reason_phrase(), "Not Found");
    }

    #[test]
    fn test_names_are_percent_encoded() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/stk/adminconfig/v2/users/a%2Fb%3Fc%23d", 200, "{}");
        mock.respond(Method::Delete, "/stk/adminconfig/v2/indexes/x%20y", 202, "");

        let client = client(&mock);
        client.get_user("stk", "a/b?c#d").unwrap();
        client.delete_index("stk", "x y").unwrap();

        let paths: Vec<_> = mock.calls().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/stk/adminconfig/v2/users/a%2Fb%3Fc%23d",
                "/stk/adminconfig/v2/indexes/x%20y"
            ]
        );
    }
}
