//! Result validation via user-authored snippets.
//!
//! A validation snippet is a small program in an embedded expression
//! language, evaluated against a query's result payload. The snippet sees
//! exactly two ambient names: `data` (the payload) and the `debug(name,
//! value)` statement form, which records values into a diagnostic side
//! channel. Nothing else of the host is reachable; evaluation cannot touch
//! storage, network, or process state.
//!
//! Statements are separated by newlines or `;`:
//!
//! ```text
//! let pools = data.pools
//! debug("count", len(pools))
//! return len(pools) > 0
//! ```
//!
//! The yielded value (explicit `return`, or the last bare expression) is
//! reduced to pass/fail by truthiness: `null`, `false`, `0`, `""`, `[]`
//! and `{}` are falsy, everything else is truthy.

mod eval;
mod lexer;
mod parser;

pub use eval::truthy;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use thiserror::Error;

/// Name attached to the single check entry a snippet run produces.
const CHECK_NAME: &str = "Custom Validation";

/// An error raised while lexing, parsing, or evaluating a snippet.
///
/// Snippet errors never propagate out of [`run_snippet`]; they become a
/// failed outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SnippetError(pub String);

impl SnippetError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// One diagnostic check entry in a validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_variables: Option<Map<String, Value>>,
}

/// The verdict of one validation run. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs a validation snippet against a result payload.
///
/// Any lex, parse, or evaluation error yields `passed = false` with the
/// error's description in both the check message and the outcome's
/// `error` field; errors never escape. Wall-clock duration is measured
/// around the whole evaluation on both paths.
pub fn run_snippet(snippet: &str, data: &Value) -> ValidationOutcome {
    let start = Instant::now();

    match evaluate(snippet, data) {
        Ok((value, debug_vars)) => {
            let passed = truthy(&value);
            let message = if passed {
                "Validation passed"
            } else {
                "Validation failed"
            };
            ValidationOutcome {
                passed,
                checks: vec![ValidationCheck {
                    name: CHECK_NAME.to_string(),
                    passed,
                    message: message.to_string(),
                    debug_variables: if debug_vars.is_empty() {
                        None
                    } else {
                        Some(debug_vars)
                    },
                }],
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => ValidationOutcome {
            passed: false,
            checks: vec![ValidationCheck {
                name: CHECK_NAME.to_string(),
                passed: false,
                message: e.to_string(),
                debug_variables: None,
            }],
            duration_ms: start.elapsed().as_millis() as u64,
            error: Some(e.to_string()),
        },
    }
}

/// Lexes, parses, and evaluates a snippet, returning the yielded value
/// and the captured debug variables.
fn evaluate(snippet: &str, data: &Value) -> Result<(Value, Map<String, Value>), SnippetError> {
    let tokens = lexer::tokenize(snippet)?;
    let program = parser::parse(&tokens)?;
    eval::execute(&program, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passing_snippet() {
        let outcome = run_snippet("return data.count > 0", &json!({"count": 5}));
        assert!(outcome.passed);
        assert_eq!(outcome.checks.len(), 1);
        assert_eq!(outcome.checks[0].name, "Custom Validation");
        assert_eq!(outcome.checks[0].message, "Validation passed");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_failing_snippet() {
        let outcome = run_snippet("return data.count > 0", &json!({"count": 0}));
        assert!(!outcome.passed);
        assert_eq!(outcome.checks.len(), 1);
        assert_eq!(outcome.checks[0].message, "Validation failed");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_erroring_snippet_is_contained() {
        // `data.missing` is null; reading a field of null is an error.
        let outcome = run_snippet("return data.missing.deeper", &json!({"count": 5}));
        assert!(!outcome.passed);
        let error = outcome.error.expect("error field set");
        assert!(!error.is_empty());
        assert_eq!(outcome.checks[0].message, error);
    }

    #[test]
    fn test_debug_variables_attached() {
        let outcome = run_snippet(
            "debug(\"count\", data.count)\nreturn data.count > 0",
            &json!({"count": 3}),
        );
        let vars = outcome.checks[0]
            .debug_variables
            .as_ref()
            .expect("debug variables present");
        assert_eq!(vars.get("count"), Some(&json!(3)));
    }

    #[test]
    fn test_no_debug_variables_when_unused() {
        let outcome = run_snippet("return true", &json!({}));
        assert!(outcome.checks[0].debug_variables.is_none());
    }

    #[test]
    fn test_debug_overwrites_prior_value() {
        let outcome = run_snippet(
            "debug(\"x\", 1)\ndebug(\"x\", 2)\nreturn true",
            &json!({}),
        );
        let vars = outcome.checks[0].debug_variables.as_ref().unwrap();
        assert_eq!(vars.get("x"), Some(&json!(2.0)));
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let outcome = run_snippet("return data.ok", &json!({"ok": true}));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["passed"], json!(true));
        assert!(value["checks"].is_array());
        assert!(value["durationMs"].is_number());
        assert!(value.get("error").is_none());
    }
}
