//! Typed parameter substitution.

use super::Parameter;
use std::collections::HashMap;

/// Substitutes bound values into a query template.
///
/// Every occurrence of `${name}` is replaced for each bound name. Values
/// for `number` and `boolean` parameters are inserted raw; all other
/// values are wrapped in double quotes. A name with no entry in
/// `parameters` is treated as `string`.
///
/// The bound value's literal form is not checked against the declared
/// type: a numeric-looking value bound to a `string` parameter is still
/// quoted, and a non-numeric value bound to a `number` parameter is
/// inserted raw even though the resulting query will be rejected
/// upstream. Unbound placeholders are left untouched.
pub fn substitute(
    template: &str,
    parameters: &[Parameter],
    bindings: &HashMap<String, String>,
) -> String {
    let mut query = template.to_string();

    for (name, value) in bindings {
        let raw = parameters
            .iter()
            .find(|p| &p.name == name)
            .map(|p| p.param_type.is_raw())
            .unwrap_or(false);

        let replacement = if raw {
            value.clone()
        } else {
            format!("\"{value}\"")
        };

        query = query.replace(&format!("${{{name}}}"), &replacement);
    }

    query
}
