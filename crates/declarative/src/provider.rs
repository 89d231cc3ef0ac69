//! Provider registry and single-change application.

use crate::data::{Attributes, ResourceData, State};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::resource::{BoxedResource, Resource};
use crate::schema::Schema;
use crate::types::{Action, Change, ChangeResult, Outcome};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// A set of resource types sharing provider metadata `M`.
pub struct Provider<M> {
    resources: BTreeMap<&'static str, BoxedResource<M>>,
}

impl<M> Default for Provider<M> {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }
}

impl<M> Provider<M> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, resource: impl Resource<M> + 'static) -> Self {
        self.resources.insert(resource.type_name(), Box::new(resource));
        self
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource<M>> {
        self.resources
            .get(type_name)
            .map(|r| &**r)
            .ok_or_else(|| Error::UnknownResourceType(type_name.to_string()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn schemas(&self) -> Vec<Schema> {
        self.resources.values().map(|r| r.schema()).collect()
    }

    /// Run one change to completion.
    ///
    /// Configuration is validated (schema first, then the resource's own
    /// checks) before any remote call. An update that changes a force-new
    /// attribute is carried out as delete followed by create.
    pub fn apply(&self, meta: &M, change: &Change) -> ChangeResult {
        let label = change.label();
        let resource = match self.resource(&change.resource_type) {
            Ok(resource) => resource,
            Err(e) => return failed(label, Diagnostic::error(e.to_string()).into(), None),
        };

        log::debug!("{} {}", change.action, label);
        match change.action {
            Action::Create => {
                let config = change.config.clone().unwrap_or_default();
                let diags = validate(resource, &config);
                if diags.has_error() {
                    return failed(label, diags, None);
                }
                let mut data = ResourceData::new(config);
                let diags = resource.create(meta, &mut data);
                finish(label, Outcome::Created, data, diags, None)
            }
            Action::Read => {
                let prior = change.prior.clone().unwrap_or_default();
                let mut data = ResourceData::from_state(prior.clone());
                let diags = resource.read(meta, &mut data);
                finish(label, Outcome::Read, data, diags, Some(prior))
            }
            Action::Update => {
                let prior = change.prior.clone().unwrap_or_default();
                let schema = resource.schema();
                let config = change.config.clone().unwrap_or_default();
                let diags = validate(resource, &config);
                if diags.has_error() {
                    return failed(label, diags, Some(prior));
                }
                let planned = merge_computed(&schema, &prior.attributes, config);

                let triggers = schema.replacement_triggers(&prior.attributes, &planned);
                if !triggers.is_empty() {
                    log::info!("{label}: {} forces replacement", triggers.join(", "));
                    return self.replace(meta, resource, label, prior, planned);
                }

                let mut data = ResourceData::for_update(prior.clone(), planned);
                let diags = resource.update(meta, &mut data);
                finish(label, Outcome::Updated, data, diags, Some(prior))
            }
            Action::Delete => {
                let prior = change.prior.clone().unwrap_or_default();
                let mut data = ResourceData::from_state(prior.clone());
                let diags = resource.delete(meta, &mut data);
                if diags.has_error() {
                    return failed(label, diags, Some(prior));
                }
                ChangeResult {
                    label,
                    outcome: Outcome::Deleted,
                    state: None,
                    diagnostics: diags,
                }
            }
            Action::Import => {
                let id = change.import_id.clone().unwrap_or_default();
                let (data, diags) = resource.import(meta, &id);
                if !diags.has_error() && data.id().is_empty() {
                    let diag = Diagnostic::error(format!(
                        "Cannot import non-existent remote object ({id})"
                    ));
                    return failed(label, diag.into(), None);
                }
                finish(label, Outcome::Imported, data, diags, None)
            }
        }
    }

    fn replace(
        &self,
        meta: &M,
        resource: &dyn Resource<M>,
        label: String,
        prior: State,
        planned: Attributes,
    ) -> ChangeResult {
        let mut old = ResourceData::from_state(prior.clone());
        let mut diags = resource.delete(meta, &mut old);
        if diags.has_error() {
            return failed(label, diags, Some(prior));
        }

        let mut data = ResourceData::new(planned);
        diags.extend(resource.create(meta, &mut data));
        finish(label, Outcome::Replaced, data, diags, None)
    }
}

fn validate<M>(resource: &dyn Resource<M>, config: &Attributes) -> Diagnostics {
    let mut diags = resource.schema().validate(config);
    diags.extend(resource.validate(config));
    diags
}

/// Carry computed attributes the configuration leaves unset over from prior
/// state, so they don't read as changes.
fn merge_computed(schema: &Schema, prior: &Attributes, mut planned: Attributes) -> Attributes {
    for attr in schema.attributes.iter().filter(|a| a.computed) {
        let unset = planned.get(attr.name).is_none_or(serde_json::Value::is_null);
        if unset && let Some(value) = prior.get(attr.name) {
            planned.insert(attr.name.to_string(), value.clone());
        }
    }
    planned
}

fn failed(label: String, diagnostics: Diagnostics, prior: Option<State>) -> ChangeResult {
    let error = diagnostics
        .first_error()
        .map_or_else(|| "operation failed".to_string(), ToString::to_string);
    ChangeResult {
        label,
        outcome: Outcome::Failed { error },
        state: prior,
        diagnostics,
    }
}

fn finish(
    label: String,
    success: Outcome,
    data: ResourceData,
    diagnostics: Diagnostics,
    prior: Option<State>,
) -> ChangeResult {
    if diagnostics.has_error() {
        // The host keeps the prior state when an operation fails mid-flight.
        return failed(label, diagnostics, prior);
    }
    match data.into_state() {
        Some(state) => ChangeResult {
            label,
            outcome: success,
            state: Some(state),
            diagnostics,
        },
        None => ChangeResult {
            label,
            outcome: Outcome::Gone,
            state: None,
            diagnostics,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrType, Attribute};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// In-memory resource recording the calls it receives.
    struct Recorder {
        calls: CallLog,
    }

    impl Recorder {
        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Resource<()> for Recorder {
        fn type_name(&self) -> &'static str {
            "scp_things"
        }

        fn schema(&self) -> Schema {
            Schema::new("scp_things", "things")
                .attribute(Attribute::required("name", AttrType::String).force_new())
                .attribute(Attribute::optional("size", AttrType::Int).and_computed())
        }

        fn validate(&self, config: &Attributes) -> Diagnostics {
            if config.get("size").and_then(serde_json::Value::as_i64) == Some(-1) {
                return Diagnostic::error("size must not be negative").at("size").into();
            }
            Diagnostics::new()
        }

        fn create(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
            let name = data.get_str("name").unwrap_or_default().to_string();
            self.log(format!("create {name}"));
            if name == "taken" {
                return Diagnostic::error("Thing (taken) already exists").into();
            }
            let size = data.get_i64("size").unwrap_or(10);
            data.set_id(name);
            data.set("size", size);
            Diagnostics::new()
        }

        fn read(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
            self.log(format!("read {}", data.id()));
            if data.id() == "missing" {
                data.set_id("");
            } else {
                let id = data.id().to_string();
                data.set("name", id);
            }
            Diagnostics::new()
        }

        fn update(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
            self.log(format!("update {} size={}", data.id(), data.has_change("size")));
            Diagnostics::new()
        }

        fn delete(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
            self.log(format!("delete {}", data.id()));
            data.set_id("");
            Diagnostics::new()
        }
    }

    fn provider() -> (Provider<()>, CallLog) {
        let calls = CallLog::default();
        let provider = Provider::new().register(Recorder {
            calls: calls.clone(),
        });
        (provider, calls)
    }

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn state(id: &str, value: serde_json::Value) -> State {
        State {
            id: id.to_string(),
            attributes: attrs(value),
        }
    }

    #[test]
    fn test_create_sets_state() {
        let (provider, calls) = provider();
        let result = provider.apply(&(), &Change::create("scp_things", attrs(json!({"name": "a"}))));

        assert_eq!(result.outcome, Outcome::Created);
        let state = result.state.unwrap();
        assert_eq!(state.id, "a");
        assert_eq!(state.attributes["size"], 10);
        assert_eq!(*calls.lock().unwrap(), vec!["create a"]);
    }

    #[test]
    fn test_validation_blocks_remote_calls() {
        let (provider, calls) = provider();
        let change = Change::create("scp_things", attrs(json!({"name": "a", "size": -1})));
        let result = provider.apply(&(), &change);

        assert!(matches!(result.outcome, Outcome::Failed { .. }));
        let first = result.diagnostics.first_error().unwrap();
        assert_eq!(first.attribute.as_deref(), Some("size"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_create_reports_first_error() {
        let (provider, _) = provider();
        let result = provider.apply(&(), &Change::create("scp_things", attrs(json!({"name": "taken"}))));
        assert_eq!(
            result.outcome,
            Outcome::Failed {
                error: "Thing (taken) already exists".to_string()
            }
        );
        assert!(result.state.is_none());
    }

    #[test]
    fn test_read_of_missing_object_is_gone() {
        let (provider, _) = provider();
        let result = provider.apply(&(), &Change::read("scp_things", state("missing", json!({}))));
        assert_eq!(result.outcome, Outcome::Gone);
        assert!(result.state.is_none());
    }

    #[test]
    fn test_update_keeps_computed_values() {
        let (provider, calls) = provider();
        let prior = state("a", json!({"name": "a", "size": 10}));
        let result = provider.apply(&(), &Change::update("scp_things", prior, attrs(json!({"name": "a"}))));

        assert_eq!(result.outcome, Outcome::Updated);
        assert_eq!(result.state.unwrap().attributes["size"], 10);
        assert_eq!(*calls.lock().unwrap(), vec!["update a size=false"]);
    }

    #[test]
    fn test_force_new_change_replaces() {
        let (provider, calls) = provider();
        let prior = state("a", json!({"name": "a", "size": 10}));
        let result = provider.apply(&(), &Change::update("scp_things", prior, attrs(json!({"name": "b"}))));

        assert_eq!(result.outcome, Outcome::Replaced);
        assert_eq!(result.state.unwrap().id, "b");
        assert_eq!(*calls.lock().unwrap(), vec!["delete a", "create b"]);
    }

    #[test]
    fn test_delete_and_import() {
        let (provider, _) = provider();
        let deleted = provider.apply(&(), &Change::delete("scp_things", state("a", json!({}))));
        assert_eq!(deleted.outcome, Outcome::Deleted);

        let imported = provider.apply(&(), &Change::import("scp_things", "z"));
        assert_eq!(imported.outcome, Outcome::Imported);
        assert_eq!(imported.state.unwrap().attributes["name"], "z");

        let missing = provider.apply(&(), &Change::import("scp_things", "missing"));
        assert!(matches!(missing.outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn test_unknown_type() {
        let (provider, _) = provider();
        let result = provider.apply(&(), &Change::import("scp_nope", "x"));
        assert!(matches!(result.outcome, Outcome::Failed { ref error } if error.contains("scp_nope")));
        assert_eq!(provider.type_names().collect::<Vec<_>>(), vec!["scp_things"]);
    }
}
