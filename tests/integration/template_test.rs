//! Integration tests for template extraction, substitution, and checking.

use pretty_assertions::assert_eq;
use std::collections::HashMap;
use subgraph_probe::template::{
    extract_parameters, substitute, validate_query, ParamType, QuerySyntaxError,
};

fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_extraction_dedupes_across_occurrences() {
    for template in [
        "{ tokens(where: { id: ${x} }) { id } }",
        "{ a(id: ${x}) { id } b(id: ${x}) { id } }",
        "{ a(id: ${x}) { id } b(id: ${x}) { id } c(id: ${x}) { id } }",
    ] {
        let params = extract_parameters(template);
        assert_eq!(params.len(), 1, "template: {template}");
        assert_eq!(params[0].name, "x");
    }
}

#[test]
fn test_numeric_contexts() {
    let numeric = [
        "{ t(first: ${n}) { id } }",
        "{ t(skip: ${n}) { id } }",
        "{ t(limit: ${n}) { id } }",
        "{ t(offset: ${n}) { id } }",
        "{ t(count: ${n}) { id } }",
        "{ s(where: { amount_gt: ${n} }) { id } }",
        "{ s(where: { amount_gte: ${n} }) { id } }",
        "{ s(where: { amount_lt: ${n} }) { id } }",
        "{ s(where: { amount_lte: ${n} }) { id } }",
        "{ t(block: { number: ${n} }) { id } }",
    ];
    for template in numeric {
        let params = extract_parameters(template);
        assert_eq!(
            params[0].param_type,
            ParamType::Number,
            "template: {template}"
        );
    }

    let params = extract_parameters("{ t(where: { id: ${n} }) { id } }");
    assert_eq!(params[0].param_type, ParamType::String);
}

#[test]
fn test_substitution_quoting_by_type() {
    let template = "{ tokens(first: ${limit}, where: { id: ${id} }) { id } }";
    let params = extract_parameters(template);

    let result = substitute(
        template,
        &params,
        &bindings(&[("limit", "42"), ("id", "abc")]),
    );
    assert_eq!(
        result,
        "{ tokens(first: 42, where: { id: \"abc\" }) { id } }"
    );
}

#[test]
fn test_round_trip_extract_then_substitute_fully_resolves() {
    let template = "{ swaps(first: ${n}, where: { amount_gt: ${min}, pair: ${pair} }) { id } }";
    let params = extract_parameters(template);
    let result = substitute(
        template,
        &params,
        &bindings(&[("n", "10"), ("min", "1000"), ("pair", "usdc-eth")]),
    );

    assert!(!result.contains("${"));
    assert_eq!(
        result,
        "{ swaps(first: 10, where: { amount_gt: 1000, pair: \"usdc-eth\" }) { id } }"
    );
}

#[test]
fn test_syntax_check_conditions() {
    assert_eq!(validate_query(""), Err(QuerySyntaxError::EmptyQuery));
    assert_eq!(validate_query("{ foo }"), Ok(()));
    assert_eq!(
        validate_query("foo }"),
        Err(QuerySyntaxError::MissingQueryKeyword)
    );
    assert_eq!(
        validate_query("{ foo"),
        Err(QuerySyntaxError::UnbalancedBraces)
    );
}
