//! Resource trait implemented by every managed object type.
//!
//! A resource type knows its schema and how to run each lifecycle operation
//! against a remote API, given provider-wide metadata `M` (typically an API
//! client plus settings). Operations never fail with a Rust error; they
//! report problems as [`Diagnostics`] and record the outcome in the
//! [`ResourceData`].

use crate::data::{Attributes, ResourceData};
use crate::diagnostics::Diagnostics;
use crate::schema::Schema;

/// Core trait for managed resource types.
///
/// # Example
///
/// ```
/// use declarative::{
///     AttrType, Attribute, Diagnostics, Resource, ResourceData, Schema,
/// };
///
/// struct Widget;
///
/// impl Resource<()> for Widget {
///     fn type_name(&self) -> &'static str {
///         "widget"
///     }
///
///     fn schema(&self) -> Schema {
///         Schema::new("widget", "A widget")
///             .attribute(Attribute::required("name", AttrType::String).force_new())
///     }
///
///     fn create(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
///         let name = data.get_str("name").unwrap_or_default().to_string();
///         data.set_id(name);
///         Diagnostics::new()
///     }
///
///     fn read(&self, _: &(), _: &mut ResourceData) -> Diagnostics {
///         Diagnostics::new()
///     }
///
///     fn update(&self, _: &(), _: &mut ResourceData) -> Diagnostics {
///         Diagnostics::new()
///     }
///
///     fn delete(&self, _: &(), data: &mut ResourceData) -> Diagnostics {
///         data.set_id("");
///         Diagnostics::new()
///     }
/// }
/// ```
pub trait Resource<M>: Send + Sync {
    /// Type name used in plans and state, e.g. `scp_indexes`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Cross-attribute checks beyond what the schema expresses.
    ///
    /// Runs before any remote call; the default accepts everything.
    fn validate(&self, _config: &Attributes) -> Diagnostics {
        Diagnostics::new()
    }

    /// Create the remote object and set the id.
    fn create(&self, meta: &M, data: &mut ResourceData) -> Diagnostics;

    /// Refresh attributes from the remote object. Clearing the id marks it gone.
    fn read(&self, meta: &M, data: &mut ResourceData) -> Diagnostics;

    /// Apply changed attributes to the remote object.
    fn update(&self, meta: &M, data: &mut ResourceData) -> Diagnostics;

    /// Remove the remote object.
    fn delete(&self, meta: &M, data: &mut ResourceData) -> Diagnostics;

    /// Adopt an existing remote object identified by `id`.
    ///
    /// The default reads the object with only the id set.
    fn import(&self, meta: &M, id: &str) -> (ResourceData, Diagnostics) {
        let mut data = ResourceData::imported(id);
        let diags = self.read(meta, &mut data);
        (data, diags)
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<M> = Box<dyn Resource<M>>;
