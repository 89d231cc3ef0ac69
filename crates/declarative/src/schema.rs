//! Resource schemas and attribute-level validation.

use crate::data::Attributes;
use crate::diagnostics::{Diagnostic, Diagnostics};
use serde::Serialize;
use serde_json::Value;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    String,
    Int,
    Bool,
    StringSet,
}

impl AttrType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64(),
            Self::Bool => value.is_boolean(),
            Self::StringSet => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

fn no_conflicts(others: &&'static [&'static str]) -> bool {
    others.is_empty()
}

/// Declaration of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttrType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub force_new: bool,
    #[serde(skip_serializing_if = "no_conflicts")]
    pub conflicts_with: &'static [&'static str],
    pub description: &'static str,
}

impl Attribute {
    const fn base(name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            ty,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            conflicts_with: &[],
            description: "",
        }
    }

    pub const fn required(name: &'static str, ty: AttrType) -> Self {
        let mut attr = Self::base(name, ty);
        attr.required = true;
        attr
    }

    pub const fn optional(name: &'static str, ty: AttrType) -> Self {
        let mut attr = Self::base(name, ty);
        attr.optional = true;
        attr
    }

    /// Set only by the server.
    pub const fn computed(name: &'static str, ty: AttrType) -> Self {
        let mut attr = Self::base(name, ty);
        attr.computed = true;
        attr
    }

    /// Optional, filled in by the server when omitted.
    #[must_use]
    pub const fn and_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Changing the attribute requires replacing the resource.
    #[must_use]
    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub const fn conflicts_with(mut self, others: &'static [&'static str]) -> Self {
        self.conflicts_with = others;
        self
    }

    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn is_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Schema of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub type_name: &'static str,
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(type_name: &'static str, description: &'static str) -> Self {
        Self {
            type_name,
            description,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration against the declarations: unknown or computed
    /// attributes, missing required ones, type mismatches and conflicts.
    pub fn validate(&self, config: &Attributes) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let is_set = |name: &str| config.get(name).is_some_and(|v| !v.is_null());

        for (name, value) in config {
            if value.is_null() {
                continue;
            }
            let Some(attr) = self.get(name) else {
                diags.push(Diagnostic::error("Unsupported argument").at(name.as_str()));
                continue;
            };
            if !attr.is_settable() {
                diags.push(
                    Diagnostic::error("Value for unconfigurable attribute")
                        .with_detail("this attribute is computed by the server")
                        .at(name.as_str()),
                );
                continue;
            }
            if !attr.ty.accepts(value) {
                diags.push(
                    Diagnostic::error("Incorrect attribute value type")
                        .with_detail(format!("expected {:?}", attr.ty))
                        .at(name.as_str()),
                );
            }
            for other in attr.conflicts_with {
                if is_set(*other) {
                    diags.push(
                        Diagnostic::error("Conflicting configuration arguments")
                            .with_detail(format!("\"{name}\" cannot be specified when \"{other}\" is specified"))
                            .at(name.as_str()),
                    );
                }
            }
        }

        for attr in self.attributes.iter().filter(|a| a.required) {
            if !is_set(attr.name) {
                diags.push(
                    Diagnostic::error("Missing required argument")
                        .with_detail(format!("the argument \"{}\" is required", attr.name))
                        .at(attr.name),
                );
            }
        }

        diags
    }

    /// Force-new attributes whose value differs between `prior` and `planned`.
    pub fn replacement_triggers(&self, prior: &Attributes, planned: &Attributes) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.force_new)
            .filter(|a| {
                let before = prior.get(a.name).filter(|v| !v.is_null());
                let after = planned.get(a.name).filter(|v| !v.is_null());
                after.is_some() && before != after
            })
            .map(|a| a.name)
            .collect()
    }

    /// Copy of `attributes` with sensitive values masked.
    pub fn redact(&self, attributes: &Attributes) -> Attributes {
        attributes
            .iter()
            .map(|(key, value)| {
                let masked = self.get(key).is_some_and(|a| a.sensitive) && !value.is_null();
                let value = if masked {
                    Value::String("(sensitive)".to_string())
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect()
    }
}
