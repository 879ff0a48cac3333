//! Placeholder extraction and type inference.

use super::{ParamType, Parameter};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Matches a `${name}` placeholder; the name is any run of non-`}` characters.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"));

/// Contexts whose trailing text marks the next placeholder as numeric.
///
/// Each pattern is anchored at the end of the text preceding the token.
/// The `block: { number:` form tolerates whitespace around the brace.
static NUMERIC_CONTEXTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"block:\s*\{\s*number:\s*$",
        r"amount_gt:\s*$",
        r"amount_gte:\s*$",
        r"amount_lt:\s*$",
        r"amount_lte:\s*$",
        r"count:\s*$",
        r"limit:\s*$",
        r"offset:\s*$",
        r"first:\s*$",
        r"skip:\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("numeric context regex is valid"))
    .collect()
});

/// Extracts the ordered, de-duplicated parameter list from a query template.
///
/// The first occurrence of a name wins; later occurrences of the same name
/// do not add entries (substitution still replaces every occurrence). Each
/// parameter's type is inferred from the text immediately preceding its
/// first occurrence. Pure function of the input; cheap enough to call on
/// every template edit.
pub fn extract_parameters(template: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut seen = HashSet::new();

    for capture in PLACEHOLDER.captures_iter(template) {
        let whole = capture.get(0).expect("capture group 0 always present");
        let name = &capture[1];

        if !seen.insert(name.to_string()) {
            continue;
        }

        let preceding = &template[..whole.start()];
        let param_type = infer_type(preceding);
        parameters.push(Parameter::new(name, param_type));
    }

    parameters
}

/// Infers a parameter type from the text preceding its placeholder.
///
/// Numeric contexts (pagination fields, numeric comparison suffixes, block
/// number filters) yield `Number`; everything else yields `String`. No
/// context yields `Boolean`.
fn infer_type(preceding: &str) -> ParamType {
    if NUMERIC_CONTEXTS.iter().any(|re| re.is_match(preceding)) {
        ParamType::Number
    } else {
        ParamType::String
    }
}
