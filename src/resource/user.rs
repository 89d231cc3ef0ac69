//! `scp_users`: stack users.
//!
//! Passwords are write-only: they are sent on create and when changed, but
//! never read back, so state keeps whatever was configured.

use super::role::validate_ack;
use super::{changed_bool, changed_set, changed_str, mark_gone, wait_failed};
use crate::context::AcsContext;
use crate::status::user as refresh;
use acs::types::{NewUser, User, UserPatch};
use declarative::{AttrType, Attribute, Attributes, Diagnostics, Resource, ResourceData, Schema};
use reconcile::Phase;
use reconcile::status::{PENDING_VERIFY_UPDATED, TARGET_CHANGE_SYNC, TARGET_DELETED_SYNC, TARGET_UPDATED};

const KIND: &str = "User";
const ACK: &str = "federated_search_manage_ack";

pub struct UserResource;

impl UserResource {
    fn body(data: &ResourceData) -> NewUser {
        let text = |key: &str| data.get_str(key).map(ToString::to_string);
        NewUser {
            name: text("name").unwrap_or_default(),
            password: text("password"),
            force_change_pass: data.get_bool("force_change_pass"),
            email: text("email"),
            default_app: text("default_app"),
            real_name: text("real_name"),
            roles: data.get_set("roles"),
        }
    }

    fn patch(data: &ResourceData) -> UserPatch {
        let password = changed_str(data, "password");
        // The current password only matters alongside a new one.
        let old_password = password
            .as_ref()
            .and_then(|_| data.get_str("old_password").map(ToString::to_string));
        UserPatch {
            password,
            old_password,
            force_change_pass: changed_bool(data, "force_change_pass"),
            email: changed_str(data, "email"),
            default_app: changed_str(data, "default_app"),
            real_name: changed_str(data, "real_name"),
            roles: changed_set(data, "roles"),
        }
    }

    fn store(data: &mut ResourceData, user: User) {
        data.set("name", user.name);
        data.set("email", user.email);
        data.set("default_app", user.default_app);
        data.set("default_app_source", user.default_app_source);
        data.set("real_name", user.real_name);
        data.set("roles", user.roles);
        data.set("last_successful_login", user.last_successful_login);
        data.set("locked_out", user.locked_out);
    }
}

impl Resource<AcsContext> for UserResource {
    fn type_name(&self) -> &'static str {
        "scp_users"
    }

    fn schema(&self) -> Schema {
        Schema::new(self.type_name(), "A user of the stack")
            .attribute(Attribute::required("name", AttrType::String).force_new())
            .attribute(Attribute::optional("password", AttrType::String).sensitive())
            .attribute(
                Attribute::optional("old_password", AttrType::String)
                    .sensitive()
                    .describe("Current password, required by the server to change it"),
            )
            .attribute(Attribute::optional("force_change_pass", AttrType::Bool))
            .attribute(Attribute::optional("email", AttrType::String).and_computed())
            .attribute(Attribute::optional("default_app", AttrType::String).and_computed())
            .attribute(Attribute::optional("real_name", AttrType::String).and_computed())
            .attribute(Attribute::optional("roles", AttrType::StringSet).and_computed())
            .attribute(Attribute::computed("default_app_source", AttrType::String))
            .attribute(Attribute::computed("last_successful_login", AttrType::Int))
            .attribute(Attribute::computed("locked_out", AttrType::Bool))
            .attribute(
                Attribute::optional(ACK, AttrType::String)
                    .describe("Must be \"Y\" when set; only the value is checked, never the roles"),
            )
    }

    fn validate(&self, config: &Attributes) -> Diagnostics {
        validate_ack(config, &[])
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
            Ok(user) => {
                Self::store(data, user);
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
