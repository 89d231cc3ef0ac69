//! Refresh functions for roles (synchronous discipline).

use super::{decode, log_mutation, verified};
use crate::verify::verify_role_update;
use acs::types::{Role, RoleSpec};
use acs::{Client, Response};
use reconcile::status::{
    PENDING_CRUD, PENDING_VERIFY_UPDATED, PENDING_WRITE, TARGET_CHANGE_SYNC,
    TARGET_DELETED_SYNC, TARGET_EXISTS,
};
use reconcile::{RefreshResult, classify};

pub fn create(client: &Client, stack: &str, body: &Role, ack: Option<&str>) -> RefreshResult<Response> {
    let result = client.create_role(stack, body, ack);
    log_mutation("create", &format!("role {}", body.name), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}

pub fn read(client: &Client, stack: &str, name: &str) -> RefreshResult<Role> {
    let refresh = classify(client.get_role(stack, name), TARGET_EXISTS, PENDING_CRUD)?;
    decode(refresh, TARGET_EXISTS)
}

pub fn update(
    client: &Client,
    stack: &str,
    name: &str,
    patch: &RoleSpec,
    ack: Option<&str>,
) -> RefreshResult<Response> {
    let result = client.patch_role(stack, name, patch, ack);
    log_mutation("update", &format!("role {name}"), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}

pub fn verify_update(client: &Client, stack: &str, name: &str, patch: &RoleSpec) -> RefreshResult<Role> {
    let refresh = classify(client.get_role(stack, name), TARGET_EXISTS, PENDING_VERIFY_UPDATED)?;
    let read = decode(refresh, TARGET_EXISTS)?;
    Ok(verified(read, |server: &Role| verify_role_update(patch, &server.spec)))
}

pub fn delete(client: &Client, stack: &str, name: &str) -> RefreshResult<Response> {
    let result = client.delete_role(stack, name);
    log_mutation("delete", &format!("role {name}"), &result);
    classify(result, TARGET_DELETED_SYNC, PENDING_WRITE)
}
