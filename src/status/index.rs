//! Refresh functions for indexes (asynchronous discipline).

use super::{decode, log_mutation, verified};
use crate::verify::verify_index_update;
use acs::types::{Index, IndexPatch};
use acs::{Client, Response};
use reconcile::status::{
    PENDING_CRUD, PENDING_VERIFY_CREATED, PENDING_VERIFY_DELETED, PENDING_VERIFY_UPDATED,
    PENDING_WRITE, TARGET_CHANGE_ASYNC, TARGET_DELETED_ASYNC, TARGET_EXISTS,
};
use reconcile::{RefreshResult, classify};

pub fn create(client: &Client, stack: &str, body: &Index) -> RefreshResult<Response> {
    let result = client.create_index(stack, body);
    log_mutation("create", &format!("index {}", body.name), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

/// Poll for a created index to become readable.
pub fn poll_created(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    classify(client.get_index(stack, name), TARGET_EXISTS, PENDING_VERIFY_CREATED)
}

pub fn read(client: &Client, stack: &str, name: &str) -> RefreshResult<Index> {
    let refresh = classify(client.get_index(stack, name), TARGET_EXISTS, PENDING_CRUD)?;
    decode(refresh, TARGET_EXISTS)
}

pub fn update(client: &Client, stack: &str, name: &str, patch: &IndexPatch) -> RefreshResult<Response> {
    let result = client.patch_index(stack, name, patch);
    log_mutation("update", &format!("index {name}"), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

pub fn verify_update(
    client: &Client,
    stack: &str,
    name: &str,
    patch: &IndexPatch,
) -> RefreshResult<Index> {
    let refresh = classify(client.get_index(stack, name), TARGET_EXISTS, PENDING_VERIFY_UPDATED)?;
    let read = decode(refresh, TARGET_EXISTS)?;
    Ok(verified(read, |server| verify_index_update(patch, server)))
}

pub fn delete(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    let result = client.delete_index(stack, name);
    log_mutation("delete", &format!("index {name}"), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

/// Poll for a deleted index to disappear.
pub fn poll_deleted(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    classify(client.get_index(stack, name), TARGET_DELETED_ASYNC, PENDING_VERIFY_DELETED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs::transport::MockTransport;
    use acs::Method;
    use reconcile::{WaitError, status};
    use std::sync::Arc;

    const PATH: &str = "/stk/adminconfig/v2/indexes/main";

    fn client(mock: &MockTransport) -> Client {
        Client::builder(Arc::new(mock.clone())).build()
    }

    #[test]
    fn test_create_conflict_is_unexpected() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/stk/adminconfig/v2/indexes", 409, "exists");
        let body = Index {
            name: "main".to_string(),
            ..Default::default()
        };
        let err = create(&client(&mock), "stk", &body).unwrap_err();
        assert_eq!(err.state(), status::CONFLICT);
    }

    #[test]
    fn test_poll_created_treats_not_found_as_pending() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, PATH, 404, r#"{"code":"404-index-not-found"}"#);
        let refresh = poll_created(&client(&mock), "stk", "main").unwrap();
        assert_eq!(refresh.status, status::NOT_FOUND);
    }

    #[test]
    fn test_read_not_found_is_error() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, PATH, 404, r#"{"code":"404-index-not-found"}"#);
        let err = read(&client(&mock), "stk", "main").unwrap_err();
        assert!(matches!(err, WaitError::UnexpectedState { .. }));
        assert!(err.kind(reconcile::Phase::Read).is_gone());
    }

    #[test]
    fn test_verify_update_pending_until_propagated() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, PATH, 200, r#"{"name":"main","searchableDays":90}"#);
        let patch = IndexPatch {
            searchable_days: Some(180),
            ..Default::default()
        };
        let refresh = verify_update(&client(&mock), "stk", "main", &patch).unwrap();
        assert_eq!(refresh.status, status::OK);
        assert!(refresh.payload.is_none());
    }

    #[test]
    fn test_poll_deleted_accepts_not_found() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, PATH, 404, "");
        let refresh = poll_deleted(&client(&mock), "stk", "main").unwrap();
        assert_eq!(refresh.status, status::NOT_FOUND);
        assert!(refresh.payload.is_some());
    }
}
