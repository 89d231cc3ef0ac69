//! `scp_roles`: search roles and their quotas.

use super::{changed_i64, changed_set, changed_str, mark_gone, wait_failed};
use crate::context::AcsContext;
use crate::status::role as refresh;
use acs::types::{Role, RoleSpec};
use declarative::{AttrType, Attribute, Attributes, Diagnostic, Diagnostics, Resource, ResourceData, Schema};
use reconcile::Phase;
use reconcile::status::{PENDING_VERIFY_UPDATED, TARGET_CHANGE_SYNC, TARGET_DELETED_SYNC, TARGET_UPDATED};

const KIND: &str = "Role";

/// Capability that requires the federated search acknowledgement.
pub const FSH_MANAGE: &str = "fsh_manage";

const ACK: &str = "federated_search_manage_ack";

const INTS: &[&str] = &[
    "cumulative_rt_srch_jobs_quota",
    "cumulative_srch_jobs_quota",
    "rt_srch_jobs_quota",
    "srch_disk_quota",
    "srch_jobs_quota",
    "srch_time_earliest",
    "srch_time_win",
];

const SETS: &[&str] = &["capabilities", "imported_roles", "srch_indexes_allowed", "srch_indexes_default"];

pub struct RoleResource;

impl RoleResource {
    fn body(data: &ResourceData) -> Role {
        let text = |key: &str| data.get_str(key).map(ToString::to_string);
        Role {
            name: text("name").unwrap_or_default(),
            spec: RoleSpec {
                capabilities: data.get_set("capabilities"),
                cumulative_rt_srch_jobs_quota: data.get_i64("cumulative_rt_srch_jobs_quota"),
                cumulative_srch_jobs_quota: data.get_i64("cumulative_srch_jobs_quota"),
                default_app: text("default_app"),
                imported_roles: data.get_set("imported_roles"),
                rt_srch_jobs_quota: data.get_i64("rt_srch_jobs_quota"),
                srch_disk_quota: data.get_i64("srch_disk_quota"),
                srch_filter: text("srch_filter"),
                srch_indexes_allowed: data.get_set("srch_indexes_allowed"),
                srch_indexes_default: data.get_set("srch_indexes_default"),
                srch_jobs_quota: data.get_i64("srch_jobs_quota"),
                srch_time_earliest: data.get_i64("srch_time_earliest"),
                srch_time_win: data.get_i64("srch_time_win"),
            },
        }
    }

    fn patch(data: &ResourceData) -> RoleSpec {
        RoleSpec {
            capabilities: changed_set(data, "capabilities"),
            cumulative_rt_srch_jobs_quota: changed_i64(data, "cumulative_rt_srch_jobs_quota"),
            cumulative_srch_jobs_quota: changed_i64(data, "cumulative_srch_jobs_quota"),
            default_app: changed_str(data, "default_app"),
            imported_roles: changed_set(data, "imported_roles"),
            rt_srch_jobs_quota: changed_i64(data, "rt_srch_jobs_quota"),
            srch_disk_quota: changed_i64(data, "srch_disk_quota"),
            srch_filter: changed_str(data, "srch_filter"),
            srch_indexes_allowed: changed_set(data, "srch_indexes_allowed"),
            srch_indexes_default: changed_set(data, "srch_indexes_default"),
            srch_jobs_quota: changed_i64(data, "srch_jobs_quota"),
            srch_time_earliest: changed_i64(data, "srch_time_earliest"),
            srch_time_win: changed_i64(data, "srch_time_win"),
        }
    }

    fn store(data: &mut ResourceData, role: Role) {
        let spec = role.spec;
        data.set("name", role.name);
        data.set("capabilities", spec.capabilities);
        data.set("cumulative_rt_srch_jobs_quota", spec.cumulative_rt_srch_jobs_quota);
        data.set("cumulative_srch_jobs_quota", spec.cumulative_srch_jobs_quota);
        data.set("default_app", spec.default_app);
        data.set("imported_roles", spec.imported_roles);
        data.set("rt_srch_jobs_quota", spec.rt_srch_jobs_quota);
        data.set("srch_disk_quota", spec.srch_disk_quota);
        data.set("srch_filter", spec.srch_filter);
        data.set("srch_indexes_allowed", spec.srch_indexes_allowed);
        data.set("srch_indexes_default", spec.srch_indexes_default);
        data.set("srch_jobs_quota", spec.srch_jobs_quota);
        data.set("srch_time_earliest", spec.srch_time_earliest);
        data.set("srch_time_win", spec.srch_time_win);
    }
}

/// Check `federated_search_manage_ack`: `"Y"` when set, and present when
/// `fsh_manage` is granted through `keys`.
pub(crate) fn validate_ack(config: &Attributes, keys: &[&str]) -> Diagnostics {
    let ack = config.get(ACK).and_then(|v| v.as_str());
    let grants_fsh = keys.iter().any(|key| {
        config
            .get(*key)
            .and_then(|v| v.as_array())
            .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(FSH_MANAGE)))
    });

    match ack {
        Some("Y") => Diagnostics::new(),
        Some(other) => Diagnostic::error("Invalid acknowledgement")
            .with_detail(format!("{ACK} must be \"Y\", got \"{other}\""))
            .at(ACK)
            .into(),
        None if grants_fsh => Diagnostic::error("Missing acknowledgement")
            .with_detail(format!("granting {FSH_MANAGE} requires {ACK} = \"Y\""))
            .at(ACK)
            .into(),
        None => Diagnostics::new(),
    }
}

impl Resource<AcsContext> for RoleResource {
    fn type_name(&self) -> &'static str {
        "scp_roles"
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new(self.type_name(), "A role granting capabilities and search limits")
            .attribute(Attribute::required("name", AttrType::String).force_new())
            .attribute(Attribute::optional("default_app", AttrType::String).and_computed())
            .attribute(Attribute::optional("srch_filter", AttrType::String).and_computed())
            .attribute(
                Attribute::optional(ACK, AttrType::String)
                    .describe("Set to \"Y\" to acknowledge federated search management"),
            );
        for &name in INTS {
            schema = schema.attribute(Attribute::optional(name, AttrType::Int).and_computed());
        }
        for &name in SETS {
            schema = schema.attribute(Attribute::optional(name, AttrType::StringSet).and_computed());
        }
        schema
    }

    fn validate(&self, config: &Attributes) -> Diagnostics {
        validate_ack(config, &["capabilities", "imported_roles"])
    }

    fn create(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let body = Self::body(data);
        let ack = data.get_str(ACK).map(ToString::to_string);

        let spec = ctx.write_wait(Phase::Create, TARGET_CHANGE_SYNC);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::create(&ctx.client, &ctx.stack, &body, ack.as_deref()))
        {
            return wait_failed(KIND, &body.name, Phase::Create, &err);
        }

        data.set_id(&body.name);
        self.read(ctx, data)
    }

    fn read(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let name = data.id().to_string();
        let result = ctx
            .waiter
            .wait_for(&ctx.read_wait(), || refresh::read(&ctx.client, &ctx.stack, &name));
        match result {
            Ok(role) => {
                Self::store(data, role);
                Diagnostics::new()
            }
            Err(err) if err.kind(Phase::Read).is_gone() => {
                mark_gone(KIND, data, &err);
                Diagnostics::new()
            }
            Err(err) => wait_failed(KIND, &name, Phase::Read, &err),
        }
    }

    fn update(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let name = data.id().to_string();
        let patch = Self::patch(data);
        if patch.is_empty() {
            return self.read(ctx, data);
        }
        let ack = data.get_str(ACK).map(ToString::to_string);

        let spec = ctx.write_wait(Phase::Update, TARGET_CHANGE_SYNC);
        if let Err(err) = ctx.waiter.wait_for(&spec, || {
            refresh::update(&ctx.client, &ctx.stack, &name, &patch, ack.as_deref())
        }) {
            return wait_failed(KIND, &name, Phase::Update, &err);
        }

        let spec = ctx.poll_wait(Phase::Update, PENDING_VERIFY_UPDATED, TARGET_UPDATED);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::verify_update(&ctx.client, &ctx.stack, &name, &patch))
        {
            return wait_failed(KIND, &name, Phase::Update, &err);
        }

        self.read(ctx, data)
    }

    fn delete(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let name = data.id().to_string();
        let spec = ctx.write_wait(Phase::Delete, TARGET_DELETED_SYNC);
        match ctx
            .waiter
            .wait_for(&spec, || refresh::delete(&ctx.client, &ctx.stack, &name))
        {
            Ok(_) => {
                data.set_id("");
                Diagnostics::new()
            }
            Err(err) if err.kind(Phase::Delete).is_gone() => {
                mark_gone(KIND, data, &err);
                Diagnostics::new()
            }
            Err(err) => wait_failed(KIND, &name, Phase::Delete, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{context, path};
    use acs::transport::MockTransport;
    use acs::{FEDERATED_SEARCH_ACK_HEADER, Method};
    use declarative::{Change, Outcome, State};
    use serde_json::{Value, json};

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_partial_patch_verified_on_first_read() {
        let mock = MockTransport::new();
        let item = path("roles/analyst");
        mock.respond(Method::Patch, &item, 200, "");
        mock.respond(
            Method::Get,
            &item,
            200,
            r#"{"name":"analyst","defaultApp":"search","srchJobsQuota":100}"#,
        );
        let (ctx, _) = context(&mock);

        let prior = State {
            id: "analyst".to_string(),
            attributes: attrs(json!({"name": "analyst", "default_app": "launcher", "srch_jobs_quota": 100})),
        };
        let change = Change::update("scp_roles", prior, attrs(json!({"name": "analyst", "default_app": "search"})));
        let result = crate::resource::provider().apply(&ctx, &change);

        assert_eq!(result.outcome, Outcome::Updated, "{:?}", result.diagnostics);
        let patches = mock.calls_to(Method::Patch, &item);
        let body: Value = serde_json::from_str(&patches[0].body_text()).unwrap();
        assert_eq!(body, json!({"defaultApp": "search"}));
        // One verifying read, one final read.
        assert_eq!(mock.calls_to(Method::Get, &item).len(), 2);
        let state = result.state.unwrap();
        assert_eq!(state.attributes["srch_jobs_quota"], 100);
    }

    #[test]
    fn test_create_sends_ack_header() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, &path("roles"), 200, "");
        mock.respond(
            Method::Get,
            &path("roles/fsh_admin"),
            200,
            r#"{"name":"fsh_admin","capabilities":["fsh_manage","search"]}"#,
        );
        let (ctx, _) = context(&mock);

        let config = attrs(json!({
            "name": "fsh_admin",
            "capabilities": ["search", "fsh_manage"],
            "federated_search_manage_ack": "Y"
        }));
        let result = crate::resource::provider().apply(&ctx, &Change::create("scp_roles", config));

        assert_eq!(result.outcome, Outcome::Created, "{:?}", result.diagnostics);
        let posts = mock.calls_to(Method::Post, &path("roles"));
        assert_eq!(posts[0].header(FEDERATED_SEARCH_ACK_HEADER), Some("Y"));
        let state = result.state.unwrap();
        assert_eq!(state.attributes["federated_search_manage_ack"], "Y");
    }

    #[test]
    fn test_ack_validation() {
        let needs_ack = attrs(json!({"name": "r", "imported_roles": ["fsh_manage"]}));
        assert!(RoleResource.validate(&needs_ack).has_error());

        let wrong = attrs(json!({"name": "r", "federated_search_manage_ack": "yes"}));
        assert!(RoleResource.validate(&wrong).has_error());

        let plain = attrs(json!({"name": "r", "capabilities": ["search"]}));
        assert!(RoleResource.validate(&plain).is_empty());
    }

    #[test]
    fn test_delete_missing_role_succeeds() {
        let mock = MockTransport::new();
        mock.respond(Method::Delete, &path("roles/analyst"), 404, r#"{"code":"404-role-not-found"}"#);
        let (ctx, _) = context(&mock);

        let mut data = ResourceData::imported("analyst");
        let diags = RoleResource.delete(&ctx, &mut data);

        assert!(diags.is_empty());
        assert!(data.id().is_empty());
    }
}
