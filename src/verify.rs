//! Update verifiers.
//!
//! A verifier decides whether a server representation reflects a patch.
//! Only fields the patch sets are compared; everything else the server
//! returns is ignored. Scalars must be equal, and a scalar the patch sets
//! but the server omits is a mismatch. String sets compare as sets, so
//! order and duplicates do not matter and an omitted set reads as empty.

use acs::types::{HecTokenPatch, HecTokenSpec, Index, IndexPatch, RoleSpec, Subnets, User, UserPatch};
use reconcile::sets::is_set_equal;
use std::collections::BTreeSet;

fn scalar<T: PartialEq>(want: Option<&T>, got: Option<&T>) -> bool {
    want.is_none_or(|w| got == Some(w))
}

fn set(want: Option<&BTreeSet<String>>, got: Option<&BTreeSet<String>>) -> bool {
    want.is_none_or(|w| is_set_equal(Some(w), got))
}

pub fn verify_index_update(patch: &IndexPatch, server: &Index) -> bool {
    scalar(patch.max_data_size_mb.as_ref(), server.max_data_size_mb.as_ref())
        && scalar(patch.searchable_days.as_ref(), server.searchable_days.as_ref())
        && scalar(
            patch.splunk_archival_retention_days.as_ref(),
            server.splunk_archival_retention_days.as_ref(),
        )
        && scalar(
            patch.self_storage_bucket_path.as_ref(),
            server.self_storage_bucket_path.as_ref(),
        )
}

/// `token` is not compared: it is force-new and a read may mask it.
pub fn verify_hec_token_update(patch: &HecTokenPatch, server: &HecTokenSpec) -> bool {
    set(patch.allowed_indexes.as_ref(), server.allowed_indexes.as_ref())
        && scalar(patch.default_host.as_ref(), server.default_host.as_ref())
        && scalar(patch.default_index.as_ref(), server.default_index.as_ref())
        && scalar(patch.default_source.as_ref(), server.default_source.as_ref())
        && scalar(patch.default_sourcetype.as_ref(), server.default_sourcetype.as_ref())
        && scalar(patch.disabled.as_ref(), server.disabled.as_ref())
        && scalar(patch.use_ack.as_ref(), server.use_ack.as_ref())
}

pub fn verify_role_update(patch: &RoleSpec, server: &RoleSpec) -> bool {
    set(patch.capabilities.as_ref(), server.capabilities.as_ref())
        && scalar(
            patch.cumulative_rt_srch_jobs_quota.as_ref(),
            server.cumulative_rt_srch_jobs_quota.as_ref(),
        )
        && scalar(
            patch.cumulative_srch_jobs_quota.as_ref(),
            server.cumulative_srch_jobs_quota.as_ref(),
        )
        && scalar(patch.default_app.as_ref(), server.default_app.as_ref())
        && set(patch.imported_roles.as_ref(), server.imported_roles.as_ref())
        && scalar(patch.rt_srch_jobs_quota.as_ref(), server.rt_srch_jobs_quota.as_ref())
        && scalar(patch.srch_disk_quota.as_ref(), server.srch_disk_quota.as_ref())
        && scalar(patch.srch_filter.as_ref(), server.srch_filter.as_ref())
        && set(patch.srch_indexes_allowed.as_ref(), server.srch_indexes_allowed.as_ref())
        && set(patch.srch_indexes_default.as_ref(), server.srch_indexes_default.as_ref())
        && scalar(patch.srch_jobs_quota.as_ref(), server.srch_jobs_quota.as_ref())
        && scalar(patch.srch_time_earliest.as_ref(), server.srch_time_earliest.as_ref())
        && scalar(patch.srch_time_win.as_ref(), server.srch_time_win.as_ref())
}

/// Passwords and `force_change_pass` are write-only and never compared.
pub fn verify_user_update(patch: &UserPatch, server: &User) -> bool {
    scalar(patch.email.as_ref(), server.email.as_ref())
        && scalar(patch.default_app.as_ref(), server.default_app.as_ref())
        && scalar(patch.real_name.as_ref(), server.real_name.as_ref())
        && set(patch.roles.as_ref(), server.roles.as_ref())
}

/// Every added subnet is listed and no removed subnet is.
pub fn verify_allowlist_update(added: &Subnets, removed: &Subnets, server: &Subnets) -> bool {
    added.subnets.is_subset(&server.subnets) && removed.subnets.is_disjoint(&server.subnets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_role_ignores_fields_outside_patch() {
        let patch = RoleSpec {
            default_app: Some("search".to_string()),
            ..Default::default()
        };
        let server = RoleSpec {
            default_app: Some("search".to_string()),
            srch_jobs_quota: Some(100),
            ..Default::default()
        };
        assert!(verify_role_update(&patch, &server));
    }

    #[test]
    fn test_role_mismatch_on_any_patched_field() {
        let patch = RoleSpec {
            default_app: Some("search".to_string()),
            srch_jobs_quota: Some(10),
            ..Default::default()
        };
        let mut server = patch.clone();
        assert!(verify_role_update(&patch, &server));

        server.srch_jobs_quota = Some(11);
        assert!(!verify_role_update(&patch, &server));

        server.srch_jobs_quota = None;
        assert!(!verify_role_update(&patch, &server));
    }

    #[test]
    fn test_role_sets_ignore_order_and_duplicates() {
        let patch = RoleSpec {
            capabilities: Some(strings(&["search", "edit_user"])),
            ..Default::default()
        };
        let server: RoleSpec =
            serde_json::from_str(r#"{"capabilities":["edit_user","search","search"]}"#).unwrap();
        assert!(verify_role_update(&patch, &server));

        let server = RoleSpec {
            capabilities: Some(strings(&["search"])),
            ..Default::default()
        };
        assert!(!verify_role_update(&patch, &server));
    }

    #[test]
    fn test_empty_set_matches_omitted() {
        let patch = RoleSpec {
            imported_roles: Some(BTreeSet::new()),
            ..Default::default()
        };
        assert!(verify_role_update(&patch, &RoleSpec::default()));
    }

    #[test]
    fn test_index_zero_value_is_compared() {
        let patch = IndexPatch {
            max_data_size_mb: Some(0),
            ..Default::default()
        };
        let server = Index {
            name: "telemetry".to_string(),
            max_data_size_mb: Some(500),
            searchable_days: Some(90),
            ..Default::default()
        };
        assert!(!verify_index_update(&patch, &server));
        let server = Index {
            max_data_size_mb: Some(0),
            ..server
        };
        assert!(verify_index_update(&patch, &server));
    }

    #[test]
    fn test_hec_token_ignores_token() {
        let patch = HecTokenPatch {
            token: Some("new-token".to_string()),
            use_ack: Some(false),
            ..Default::default()
        };
        let server = HecTokenSpec {
            name: "h1".to_string(),
            use_ack: Some(false),
            ..Default::default()
        };
        assert!(verify_hec_token_update(&patch, &server));
    }

    #[test]
    fn test_user_skips_write_only_fields() {
        let patch = UserPatch {
            password: Some("s3cret!".to_string()),
            force_change_pass: Some(true),
            roles: Some(strings(&["user", "power"])),
            ..Default::default()
        };
        let server = User {
            name: "ops".to_string(),
            roles: Some(strings(&["power", "user"])),
            ..Default::default()
        };
        assert!(verify_user_update(&patch, &server));
    }

    #[test]
    fn test_allowlist() {
        let added = Subnets::new(["1.1.1.3/32"]);
        let removed = Subnets::new(["1.1.1.1/32"]);
        let server = Subnets::new(["1.1.1.2/32", "1.1.1.3/32"]);
        assert!(verify_allowlist_update(&added, &removed, &server));

        let stale = Subnets::new(["1.1.1.1/32", "1.1.1.2/32"]);
        assert!(!verify_allowlist_update(&added, &removed, &stale));
    }
}
