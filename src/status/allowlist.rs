//! Refresh functions for IPv4 and IPv6 allowlists (synchronous discipline).
//!
//! An allowlist is addressed by its feature; the subnets in a request body
//! are added or removed, never replaced wholesale.

use super::{decode, log_mutation, verified};
use crate::verify::verify_allowlist_update;
use acs::types::{IpVersion, Subnets};
use acs::{Client, Response};
use reconcile::status::{
    PENDING_CRUD, PENDING_VERIFY_UPDATED, PENDING_WRITE, TARGET_CHANGE_SYNC, TARGET_EXISTS,
};
use reconcile::{RefreshResult, classify};

pub fn add(
    client: &Client,
    stack: &str,
    version: IpVersion,
    feature: &str,
    subnets: &Subnets,
) -> RefreshResult<Response> {
    let result = client.add_subnets(stack, version, feature, subnets);
    log_mutation("add subnets to", &format!("{version} allowlist {feature}"), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}

pub fn read(
    client: &Client,
    stack: &str,
    version: IpVersion,
    feature: &str,
) -> RefreshResult<Subnets> {
    let result = client.get_allowlist(stack, version, feature);
    let refresh = classify(result, TARGET_EXISTS, PENDING_CRUD)?;
    decode(refresh, TARGET_EXISTS)
}

/// Wait for `added` to be present and `removed` to be gone.
pub fn verify_update(
    client: &Client,
    stack: &str,
    version: IpVersion,
    feature: &str,
    added: &Subnets,
    removed: &Subnets,
) -> RefreshResult<Subnets> {
    let result = client.get_allowlist(stack, version, feature);
    let refresh = classify(result, TARGET_EXISTS, PENDING_VERIFY_UPDATED)?;
    let read = decode(refresh, TARGET_EXISTS)?;
    Ok(verified(read, |server| verify_allowlist_update(added, removed, server)))
}

pub fn remove(
    client: &Client,
    stack: &str,
    version: IpVersion,
    feature: &str,
    subnets: &Subnets,
) -> RefreshResult<Response> {
    let result = client.delete_subnets(stack, version, feature, subnets);
    log_mutation("remove subnets from", &format!("{version} allowlist {feature}"), &result);
    classify(result, TARGET_CHANGE_SYNC, PENDING_WRITE)
}
