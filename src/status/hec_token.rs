//! Refresh functions for HEC tokens (asynchronous discipline).

use super::{decode, log_mutation, verified};
use crate::verify::verify_hec_token_update;
use acs::types::{HecTokenEnvelope, HecTokenPatch, HecTokenSpec};
use acs::{Client, Response};
use reconcile::status::{
    PENDING_CRUD, PENDING_VERIFY_CREATED, PENDING_VERIFY_DELETED, PENDING_VERIFY_UPDATED,
    PENDING_WRITE, TARGET_CHANGE_ASYNC, TARGET_DELETED_ASYNC, TARGET_EXISTS,
};
use reconcile::{RefreshResult, classify};

pub fn create(client: &Client, stack: &str, body: &HecTokenSpec) -> RefreshResult<Response> {
    let result = client.create_hec_token(stack, body);
    log_mutation("create", &format!("HEC token {}", body.name), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

pub fn poll_created(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    classify(client.get_hec_token(stack, name), TARGET_EXISTS, PENDING_VERIFY_CREATED)
}

pub fn read(client: &Client, stack: &str, name: &str) -> RefreshResult<HecTokenEnvelope> {
    let refresh = classify(client.get_hec_token(stack, name), TARGET_EXISTS, PENDING_CRUD)?;
    decode(refresh, TARGET_EXISTS)
}

pub fn update(
    client: &Client,
    stack: &str,
    name: &str,
    patch: &HecTokenPatch,
) -> RefreshResult<Response> {
    let result = client.patch_hec_token(stack, name, patch);
    log_mutation("update", &format!("HEC token {name}"), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

pub fn verify_update(
    client: &Client,
    stack: &str,
    name: &str,
    patch: &HecTokenPatch,
) -> RefreshResult<HecTokenEnvelope> {
    let refresh = classify(
        client.get_hec_token(stack, name),
        TARGET_EXISTS,
        PENDING_VERIFY_UPDATED,
    )?;
    let read = decode(refresh, TARGET_EXISTS)?;
    Ok(verified(read, |server: &HecTokenEnvelope| {
        verify_hec_token_update(patch, &server.http_event_collector.spec)
    }))
}

pub fn delete(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    let result = client.delete_hec_token(stack, name);
    log_mutation("delete", &format!("HEC token {name}"), &result);
    classify(result, TARGET_CHANGE_ASYNC, PENDING_WRITE)
}

pub fn poll_deleted(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    classify(client.get_hec_token(stack, name), TARGET_DELETED_ASYNC, PENDING_VERIFY_DELETED)
}
