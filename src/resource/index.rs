//! `scp_indexes`: event and metric indexes.
//!
//! Index mutations are accepted with 202 and completed out of band, so
//! create and delete poll until the index appears or disappears, and update
//! polls until the patched values are readable.

use super::{changed_i64, changed_str, mark_gone, wait_failed};
use crate::context::AcsContext;
use crate::status::index as refresh;
use acs::types::{Index, IndexPatch};
use declarative::{AttrType, Attribute, Attributes, Diagnostic, Diagnostics, Resource, ResourceData, Schema};
use reconcile::Phase;
use reconcile::status::{
    PENDING_VERIFY_CREATED, PENDING_VERIFY_DELETED, PENDING_VERIFY_UPDATED, TARGET_CHANGE_ASYNC,
    TARGET_DELETED_ASYNC, TARGET_EXISTS, TARGET_UPDATED,
};

const KIND: &str = "Index";
const DATATYPES: &[&str] = &["event", "metric"];

pub struct IndexResource;

impl IndexResource {
    fn body(data: &ResourceData) -> Index {
        Index {
            name: data.get_str("name").unwrap_or_default().to_string(),
            datatype: data.get_str("datatype").map(ToString::to_string),
            max_data_size_mb: data.get_i64("max_data_size_mb"),
            searchable_days: data.get_i64("searchable_days"),
            splunk_archival_retention_days: data.get_i64("splunk_archival_retention_days"),
            self_storage_bucket_path: data.get_str("self_storage_bucket_path").map(ToString::to_string),
            ..Index::default()
        }
    }

    fn patch(data: &ResourceData) -> IndexPatch {
        IndexPatch {
            max_data_size_mb: changed_i64(data, "max_data_size_mb"),
            searchable_days: changed_i64(data, "searchable_days"),
            splunk_archival_retention_days: changed_i64(data, "splunk_archival_retention_days"),
            self_storage_bucket_path: changed_str(data, "self_storage_bucket_path"),
        }
    }

    fn store(data: &mut ResourceData, index: Index) {
        data.set("name", index.name);
        data.set("datatype", index.datatype);
        data.set("max_data_size_mb", index.max_data_size_mb);
        data.set("searchable_days", index.searchable_days);
        data.set("splunk_archival_retention_days", index.splunk_archival_retention_days);
        data.set("self_storage_bucket_path", index.self_storage_bucket_path);
    }
}

impl Resource<AcsContext> for IndexResource {
    fn type_name(&self) -> &'static str {
        "scp_indexes"
    }

    fn schema(&self) -> Schema {
        Schema::new(self.type_name(), "An event or metric index on the stack")
            .attribute(
                Attribute::required("name", AttrType::String)
                    .force_new()
                    .describe("Index name, unique on the stack"),
            )
            .attribute(
                Attribute::optional("datatype", AttrType::String)
                    .and_computed()
                    .force_new()
                    .describe("event or metric"),
            )
            .attribute(
                Attribute::optional("max_data_size_mb", AttrType::Int)
                    .and_computed()
                    .describe("Maximum raw size of the index in MB; 0 means unlimited"),
            )
            .attribute(
                Attribute::optional("searchable_days", AttrType::Int)
                    .and_computed()
                    .describe("Days events stay searchable"),
            )
            .attribute(
                Attribute::optional("splunk_archival_retention_days", AttrType::Int)
                    .conflicts_with(&["self_storage_bucket_path"])
                    .describe("Days of Splunk-managed archival after the searchable period"),
            )
            .attribute(
                Attribute::optional("self_storage_bucket_path", AttrType::String)
                    .conflicts_with(&["splunk_archival_retention_days"])
                    .describe("Bucket receiving events after the searchable period"),
            )
    }

    fn validate(&self, config: &Attributes) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(datatype) = config.get("datatype").and_then(|v| v.as_str())
            && !DATATYPES.contains(&datatype)
        {
            diags.push(
                Diagnostic::error("Invalid datatype")
                    .with_detail(format!("expected one of {}, got \"{datatype}\"", DATATYPES.join(", ")))
                    .at("datatype"),
            );
        }
        for key in ["max_data_size_mb", "searchable_days", "splunk_archival_retention_days"] {
            if config.get(key).and_then(|v| v.as_i64()).is_some_and(|n| n < 0) {
                diags.push(Diagnostic::error("Value must not be negative").at(key));
            }
        }
        diags
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
            Ok(index) => {
                Self::store(data, index);
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
    use crate::context::testing::{context, path, with_callback};
    use acs::Method;
    use acs::transport::MockTransport;
    use declarative::{Change, Outcome, State};
    use reconcile::RecordingCallback;
    use reconcile::status::UPDATED;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn telemetry_state(searchable_days: i64) -> State {
        State {
            id: "telemetry".to_string(),
            attributes: attrs(json!({
                "name": "telemetry",
                "datatype": "event",
                "max_data_size_mb": 0,
                "searchable_days": searchable_days
            })),
        }
    }

    #[test]
    fn test_create_waits_out_rate_limit() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, &path("indexes"), 202, "");
        mock.respond(Method::Get, &path("indexes/telemetry"), 429, "slow down");
        mock.respond(
            Method::Get,
            &path("indexes/telemetry"),
            200,
            r#"{"name":"telemetry","datatype":"event","maxDataSizeMB":0,"searchableDays":90}"#,
        );
        let (ctx, _) = context(&mock);

        let config = attrs(json!({"name": "telemetry", "datatype": "event"}));
        let result = crate::resource::provider().apply(&ctx, &Change::create("scp_indexes", config));

        assert_eq!(result.outcome, Outcome::Created, "{:?}", result.diagnostics);
        assert_eq!(result.state, Some(telemetry_state(90)));

        let posts = mock.calls_to(Method::Post, &path("indexes"));
        assert_eq!(posts.len(), 1);
        let body: Value = serde_json::from_str(&posts[0].body_text()).unwrap();
        assert_eq!(body, json!({"name": "telemetry", "datatype": "event"}));
        assert!(mock.calls_to(Method::Get, &path("indexes/telemetry")).len() >= 2);
    }

    #[test]
    fn test_update_waits_for_patch_to_propagate() {
        let mock = MockTransport::new();
        let get = path("indexes/telemetry");
        mock.respond(Method::Patch, &get, 202, "");
        mock.respond(Method::Get, &get, 200, r#"{"name":"telemetry","datatype":"event","maxDataSizeMB":0,"searchableDays":90}"#);
        mock.respond(Method::Get, &get, 200, r#"{"name":"telemetry","datatype":"event","maxDataSizeMB":0,"searchableDays":180}"#);
        let recorder = Arc::new(RecordingCallback::new());
        let (ctx, _) = with_callback(&mock, recorder.clone());

        let change = Change::update(
            "scp_indexes",
            telemetry_state(90),
            attrs(json!({"name": "telemetry", "searchable_days": 180})),
        );
        let result = crate::resource::provider().apply(&ctx, &change);

        assert_eq!(result.outcome, Outcome::Updated, "{:?}", result.diagnostics);
        assert_eq!(result.state, Some(telemetry_state(180)));
        assert_eq!(recorder.count(UPDATED), 1);

        let patches = mock.calls_to(Method::Patch, &get);
        assert_eq!(patches.len(), 1);
        let body: Value = serde_json::from_str(&patches[0].body_text()).unwrap();
        assert_eq!(body, json!({"searchableDays": 180}));
        // Two reads until the patch is visible, one final read.
        assert_eq!(mock.calls_to(Method::Get, &get).len(), 3);
    }

    #[test]
    fn test_create_only_succeeds_once_readable() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, &path("indexes"), 202, "");
        mock.respond(Method::Get, &path("indexes/telemetry"), 404, r#"{"code":"404-index-not-found"}"#);
        mock.respond(Method::Get, &path("indexes/telemetry"), 500, "boom");
        let (ctx, _) = context(&mock);

        let mut data = ResourceData::new(attrs(json!({"name": "telemetry"})));
        let diags = IndexResource.create(&ctx, &mut data);

        assert!(diags.has_error());
        assert!(data.id().is_empty());
    }

    #[test]
    fn test_read_missing_index_is_gone() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, &path("indexes/telemetry"), 404, r#"{"code":"404-index-not-found"}"#);
        let (ctx, _) = context(&mock);

        let result = crate::resource::provider().apply(&ctx, &Change::read("scp_indexes", telemetry_state(90)));
        assert_eq!(result.outcome, Outcome::Gone);
        assert!(result.state.is_none());
    }

    #[test]
    fn test_delete_polls_until_gone() {
        let mock = MockTransport::new();
        let get = path("indexes/telemetry");
        mock.respond(Method::Delete, &get, 202, "");
        mock.respond(Method::Get, &get, 200, r#"{"name":"telemetry"}"#);
        mock.respond(Method::Get, &get, 404, "");
        let (ctx, _) = context(&mock);

        let mut data = ResourceData::from_state(telemetry_state(90));
        let diags = IndexResource.delete(&ctx, &mut data);

        assert!(diags.is_empty(), "{diags:?}");
        assert!(data.id().is_empty());
        assert_eq!(mock.calls_to(Method::Get, &get).len(), 2);
    }

    #[test]
    fn test_validate() {
        let diags = IndexResource.validate(&attrs(json!({"name": "x", "datatype": "logs", "searchable_days": -1})));
        assert_eq!(diags.len(), 2);

        let diags = IndexResource.schema().validate(&attrs(json!({
            "name": "x",
            "splunk_archival_retention_days": 30,
            "self_storage_bucket_path": "s3://bucket"
        })));
        assert!(diags.has_error());
    }
}
