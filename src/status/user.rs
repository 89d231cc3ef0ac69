//! Refresh functions for users (synchronous discipline).

use super::{decode, log_mutation, verified};
use crate::verify::verify_user_update;
use acs::types::{NewUser, User, UserPatch};
use acs::{Client, Response};
use reconcile::status::{
    PENDING_CRUD, PENDING_VERIFY_UPDATED, PENDING_WRITE, TARGET_CHANGE_SYNC,
    TARGET_DELETED_SYNC, TARGET_EXISTS,
};
use reconcile::{RefreshResult, classify};

pub fn create(client: &Client, stack: &str, body: &NewUser, ack: Option<&str>) -> RefreshResult<Response> {
    let result = client.create_user(stack, body, ack);
    log_mutation("create", &format!("user {}", body.name), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}

pub fn read(client: &Client, stack: &str, name: &str) -> RefreshResult<User> {
    let refresh = classify(client.get_user(stack, name), TARGET_EXISTS, PENDING_CRUD)?;
    decode(refresh, TARGET_EXISTS)
}

pub fn update(
    client: &Client,
    stack: &str,
    name: &str,
    patch: &UserPatch,
    ack: Option<&str>,
) -> RefreshResult<Response> {
    let result = client.patch_user(stack, name, patch, ack);
    log_mutation("update", &format!("user {name}"), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}

pub fn verify_update(client: &Client, stack: &str, name: &str, patch: &UserPatch) -> RefreshResult<User> {
    let refresh = classify(client.get_user(stack, name), TARGET_EXISTS, PENDING_VERIFY_UPDATED)?;
    let read = decode(refresh, TARGET_EXISTS)?;
    Ok(verified(read, |server| verify_user_update(patch, server)))
}

pub fn delete(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    let result = client.delete_user(stack, name);
    log_mutation("delete", &format!("user {name}"), &result);
    classify(result, TARGET_DELETED_SYNC, PENDING_WRITE)
}
