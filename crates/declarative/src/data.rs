//! The resource data bag handed to lifecycle operations.
//!
//! A [`ResourceData`] carries the identity of one managed object, the state
//! the host last recorded for it (`prior`) and the attributes being worked on
//! (`current`). `current` starts as the planned configuration and is
//! overwritten attribute by attribute as the operation reads the remote
//! object back.
//!
//! Attributes are JSON values. An attribute that is absent or `null` is
//! unset; anything else, including `0`, `false` and `""`, is set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Attribute map of one resource.
pub type Attributes = Map<String, Value>;

/// Persisted state of one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Working copy of a resource during one lifecycle operation.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: String,
    prior: Attributes,
    current: Attributes,
}

impl ResourceData {
    /// Data for a create: nothing recorded yet, `config` is the intent.
    pub fn new(config: Attributes) -> Self {
        Self {
            id: String::new(),
            prior: Attributes::new(),
            current: config,
        }
    }

    /// Data for a read or delete of recorded state.
    pub fn from_state(state: State) -> Self {
        Self {
            id: state.id,
            prior: state.attributes.clone(),
            current: state.attributes,
        }
    }

    /// Data for an update from `prior` state to the `planned` attributes.
    pub fn for_update(prior: State, planned: Attributes) -> Self {
        Self {
            id: prior.id,
            prior: prior.attributes,
            current: planned,
        }
    }

    /// Data for importing an object known only by its id.
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the id. An empty id marks the resource as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// The attribute value, if set.
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.current.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_ok(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_ok(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_ok(key).and_then(Value::as_bool)
    }

    /// A string-set attribute. Non-string members are ignored.
    pub fn get_set(&self, key: &str) -> Option<BTreeSet<String>> {
        let items = self.get_ok(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// The attribute as recorded before this operation.
    pub fn get_prior(&self, key: &str) -> Option<&Value> {
        self.prior.get(key).filter(|v| !v.is_null())
    }

    /// Prior and current string sets of an attribute, empty when unset.
    pub fn get_set_change(&self, key: &str) -> (BTreeSet<String>, BTreeSet<String>) {
        let to_set = |value: Option<&Value>| -> BTreeSet<String> {
            value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        (to_set(self.get_prior(key)), to_set(self.get_ok(key)))
    }

    /// Whether the attribute differs between prior state and now.
    pub fn has_change(&self, key: &str) -> bool {
        self.get_prior(key) != self.get_ok(key)
    }

    /// Record an attribute. `None` and other `null` values unset it.
    pub fn set<V: Serialize>(&mut self, key: &str, value: V) {
        match serde_json::to_value(value) {
            Ok(Value::Null) | Err(_) => {
                self.current.remove(key);
            }
            Ok(value) => {
                self.current.insert(key.to_string(), value);
            }
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.current
    }

    /// Final state, or `None` if the resource is gone.
    pub fn into_state(self) -> Option<State> {
        if self.id.is_empty() {
            return None;
        }
        Some(State {
            id: self.id,
            attributes: self.current,
        })
    }
}
