//! `scp_hec_tokens`: HTTP Event Collector tokens.

use super::{changed_bool, changed_set, changed_str, mark_gone, wait_failed};
use crate::context::AcsContext;
use crate::status::hec_token as refresh;
use acs::types::{HecTokenEnvelope, HecTokenPatch, HecTokenSpec};
use declarative::{AttrType, Attribute, Attributes, Diagnostic, Diagnostics, Resource, ResourceData, Schema};
use reconcile::Phase;
use reconcile::status::{
    PENDING_VERIFY_CREATED, PENDING_VERIFY_DELETED, PENDING_VERIFY_UPDATED, TARGET_CHANGE_ASYNC,
    TARGET_DELETED_ASYNC, TARGET_EXISTS, TARGET_UPDATED,
};

const KIND: &str = "Hec";

pub struct HecTokenResource;

impl HecTokenResource {
    fn body(data: &ResourceData) -> HecTokenSpec {
        let text = |key: &str| data.get_str(key).map(ToString::to_string);
        HecTokenSpec {
            name: text("name").unwrap_or_default(),
            allowed_indexes: data.get_set("allowed_indexes"),
            default_host: text("default_host"),
            default_index: text("default_index"),
            default_source: text("default_source"),
            default_sourcetype: text("default_sourcetype"),
            disabled: data.get_bool("disabled"),
            token: text("token"),
            use_ack: data.get_bool("use_ack"),
        }
    }

    fn patch(data: &ResourceData) -> HecTokenPatch {
        HecTokenPatch {
            allowed_indexes: changed_set(data, "allowed_indexes"),
            default_host: changed_str(data, "default_host"),
            default_index: changed_str(data, "default_index"),
            default_source: changed_str(data, "default_source"),
            default_sourcetype: changed_str(data, "default_sourcetype"),
            disabled: changed_bool(data, "disabled"),
            token: None,
            use_ack: changed_bool(data, "use_ack"),
        }
    }

    fn store(data: &mut ResourceData, envelope: HecTokenEnvelope) {
        let hec = envelope.http_event_collector;
        let spec = hec.spec;
        data.set("name", spec.name);
        data.set("allowed_indexes", spec.allowed_indexes);
        data.set("default_host", spec.default_host);
        data.set("default_index", spec.default_index);
        data.set("default_source", spec.default_source);
        data.set("default_sourcetype", spec.default_sourcetype);
        data.set("disabled", spec.disabled);
        data.set("use_ack", spec.use_ack);
        // Keep the configured token when the server does not echo one.
        if let Some(token) = hec.token.or(spec.token) {
            data.set("token", token);
        }
    }
}

impl Resource<AcsContext> for HecTokenResource {
    fn type_name(&self) -> &'static str {
        "scp_hec_tokens"
    }

    fn schema(&self) -> Schema {
        let text = |name: &'static str| Attribute::optional(name, AttrType::String).and_computed();
        Schema::new(self.type_name(), "An HTTP Event Collector token")
            .attribute(Attribute::required("name", AttrType::String).force_new())
            .attribute(
                Attribute::optional("allowed_indexes", AttrType::StringSet)
                    .and_computed()
                    .describe("Indexes events sent with this token may be written to"),
            )
            .attribute(text("default_host"))
            .attribute(text("default_index").describe("Index used when an event names none"))
            .attribute(text("default_source"))
            .attribute(text("default_sourcetype"))
            .attribute(Attribute::optional("disabled", AttrType::Bool).and_computed())
            .attribute(
                Attribute::optional("token", AttrType::String)
                    .and_computed()
                    .sensitive()
                    .force_new()
                    .describe("Token value; generated by the server when omitted"),
            )
            .attribute(Attribute::optional("use_ack", AttrType::Bool).and_computed())
    }

    fn validate(&self, config: &Attributes) -> Diagnostics {
        match config.get("default_index").and_then(|v| v.as_str()) {
            Some(index) if index.trim().is_empty() => Diagnostic::error("default_index must not be empty")
                .with_detail("omit default_index or set it to one of allowed_indexes")
                .at("allowed_indexes")
                .into(),
            _ => Diagnostics::new(),
        }
    }

    fn create(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let body = Self::body(data);
        let name = body.name.clone();

        let spec = ctx.write_wait(Phase::Create, TARGET_CHANGE_ASYNC);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::create(&ctx.client, &ctx.stack, &body))
        {
            return wait_failed(KIND, &name, Phase::Create, &err);
        }

        let spec = ctx.poll_wait(Phase::Create, PENDING_VERIFY_CREATED, TARGET_EXISTS);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::poll_created(&ctx.client, &ctx.stack, &name))
        {
            return wait_failed(KIND, &name, Phase::Create, &err);
        }

        data.set_id(&name);
        self.read(ctx, data)
    }

    fn read(&self, ctx: &AcsContext, data: &mut ResourceData) -> Diagnostics {
        let name = data.id().to_string();
        let result = ctx
            .waiter
            .wait_for(&ctx.read_wait(), || refresh::read(&ctx.client, &ctx.stack, &name));
        match result {
            Ok(envelope) => {
                Self::store(data, envelope);
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

        let spec = ctx.write_wait(Phase::Update, TARGET_CHANGE_ASYNC);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::update(&ctx.client, &ctx.stack, &name, &patch))
        {
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

        let spec = ctx.write_wait(Phase::Delete, TARGET_CHANGE_ASYNC);
        match ctx
            .waiter
            .wait_for(&spec, || refresh::delete(&ctx.client, &ctx.stack, &name))
        {
            Ok(_) => {}
            Err(err) if err.kind(Phase::Delete).is_gone() => {
                mark_gone(KIND, data, &err);
                return Diagnostics::new();
            }
            Err(err) => return wait_failed(KIND, &name, Phase::Delete, &err),
        }

        let spec = ctx.poll_wait(Phase::Delete, PENDING_VERIFY_DELETED, TARGET_DELETED_ASYNC);
        if let Err(err) = ctx
            .waiter
            .wait_for(&spec, || refresh::poll_deleted(&ctx.client, &ctx.stack, &name))
        {
            return wait_failed(KIND, &name, Phase::Delete, &err);
        }

        data.set_id("");
        Diagnostics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{context, path};
    use acs::Method;
    use acs::transport::MockTransport;
    use declarative::{Change, Outcome, State};
    use serde_json::{Value, json};

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn h1_state() -> State {
        State {
            id: "h1".to_string(),
            attributes: attrs(json!({"name": "h1", "token": "abc", "use_ack": false})),
        }
    }

    #[test]
    fn test_create_conflict_reports_existing() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            &path("inputs/http-event-collectors"),
            409,
            r#"{"code":"Conflict","message":"HEC token h1 exists"}"#,
        );
        let (ctx, _) = context(&mock);

        let mut data = ResourceData::new(attrs(json!({"name": "h1"})));
        let diags = HecTokenResource.create(&ctx, &mut data);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags.first_error().unwrap().summary, "Hec (h1) already exists");
        assert!(data.id().is_empty());
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_delete_retries_rate_limit() {
        let mock = MockTransport::new();
        let item = path("inputs/http-event-collectors/h1");
        mock.respond(Method::Delete, &item, 429, "slow down");
        mock.respond(Method::Delete, &item, 202, "");
        mock.respond(Method::Get, &item, 200, r#"{"http-event-collector":{"spec":{"name":"h1"}}}"#);
        mock.respond(Method::Get, &item, 404, "");
        let (ctx, _) = context(&mock);

        let result = crate::resource::provider().apply(&ctx, &Change::delete("scp_hec_tokens", h1_state()));

        assert_eq!(result.outcome, Outcome::Deleted);
        assert!(result.diagnostics.is_empty());
        assert_eq!(mock.calls_to(Method::Delete, &item).len(), 2);
        assert_eq!(mock.calls_to(Method::Get, &item).len(), 2);
    }

    #[test]
    fn test_read_unwraps_envelope() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            &path("inputs/http-event-collectors/h1"),
            200,
            r#"{"http-event-collector":{"spec":{"name":"h1","allowedIndexes":["main","summary"],"defaultIndex":"main","useAck":true},"token":"abc"}}"#,
        );
        let (ctx, _) = context(&mock);

        let mut data = ResourceData::from_state(h1_state());
        let diags = HecTokenResource.read(&ctx, &mut data);

        assert!(diags.is_empty());
        assert_eq!(data.get_str("default_index"), Some("main"));
        assert_eq!(data.get_bool("use_ack"), Some(true));
        assert_eq!(data.get_str("token"), Some("abc"));
        assert_eq!(data.get_set("allowed_indexes").unwrap().len(), 2);
    }

    #[test]
    fn test_update_sends_only_changes() {
        let mock = MockTransport::new();
        let item = path("inputs/http-event-collectors/h1");
        mock.respond(Method::Patch, &item, 202, "");
        mock.respond(Method::Get, &item, 200, r#"{"http-event-collector":{"spec":{"name":"h1","useAck":true},"token":"abc"}}"#);
        let (ctx, _) = context(&mock);

        let change = Change::update("scp_hec_tokens", h1_state(), attrs(json!({"name": "h1", "use_ack": true})));
        let result = crate::resource::provider().apply(&ctx, &change);

        assert_eq!(result.outcome, Outcome::Updated, "{:?}", result.diagnostics);
        let patches = mock.calls_to(Method::Patch, &item);
        let body: Value = serde_json::from_str(&patches[0].body_text()).unwrap();
        assert_eq!(body, json!({"useAck": true}));
    }

    #[test]
    fn test_blank_default_index_rejected() {
        let diags = HecTokenResource.validate(&attrs(json!({"name": "h1", "default_index": "  "})));
        assert_eq!(diags.first_error().unwrap().attribute.as_deref(), Some("allowed_indexes"));
        assert!(HecTokenResource.validate(&attrs(json!({"name": "h1", "default_index": "main"}))).is_empty());
    }
}
