use anyhow::Result;

use super::print_json;
use crate::resource;

/// Print every registered schema, or just one type's.
pub fn run(type_name: Option<&str>) -> Result<()> {
    let provider = resource::provider();
    match type_name {
        Some(name) => print_json(&provider.resource(name)?.schema()),
        None => print_json(&provider.schemas()),
    }
}
