//! Evaluator for validation snippets.
//!
//! Values are JSON values. The evaluation scope starts with exactly one
//! binding, `data`; `let` statements add to it. There are no other
//! ambient names, so a snippet cannot reach host state.

use super::parser::{BinaryOp, Expr, Stmt, UnaryOp};
use super::SnippetError;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Executes a parsed snippet against a payload.
///
/// Returns the yielded value (explicit `return`, or the last bare
/// expression, or null) together with the captured debug variables.
pub fn execute(
    program: &[Stmt],
    data: &Value,
) -> Result<(Value, Map<String, Value>), SnippetError> {
    let mut scope: HashMap<String, Value> = HashMap::new();
    scope.insert("data".to_string(), data.clone());

    let mut debug_vars = Map::new();
    let mut last = Value::Null;

    for stmt in program {
        match stmt {
            Stmt::Let { name, value } => {
                let value = eval_expr(value, &scope)?;
                scope.insert(name.clone(), value);
            }
            Stmt::Debug { label, value } => {
                let label = eval_expr(label, &scope)?;
                let value = eval_expr(value, &scope)?;
                debug_vars.insert(label_name(&label), value);
            }
            Stmt::Return(expr) => {
                let value = eval_expr(expr, &scope)?;
                return Ok((value, debug_vars));
            }
            Stmt::Expr(expr) => {
                last = eval_expr(expr, &scope)?;
            }
        }
    }

    Ok((last, debug_vars))
}

/// Truthiness of a JSON value: null, false, 0, "", [] and {} are falsy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Debug labels are usually string literals; any other value is recorded
/// under its JSON rendering.
fn label_name(label: &Value) -> String {
    match label {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn eval_expr(expr: &Expr, scope: &HashMap<String, Value>) -> Result<Value, SnippetError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => number_value(*n),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Ident(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| SnippetError::new(format!("unknown identifier `{name}`"))),
        Expr::Member { object, field } => {
            let object = eval_expr(object, scope)?;
            match object {
                Value::Object(map) => Ok(map.get(field).cloned().unwrap_or(Value::Null)),
                Value::Null => Err(SnippetError::new(format!(
                    "cannot read field `{field}` of null"
                ))),
                other => Err(SnippetError::new(format!(
                    "cannot read field `{field}` of {}",
                    type_name(&other)
                ))),
            }
        }
        Expr::Index { object, index } => {
            let object = eval_expr(object, scope)?;
            let index = eval_expr(index, scope)?;
            match (&object, &index) {
                (Value::Array(items), Value::Number(n)) => {
                    let idx = n.as_f64().unwrap_or(-1.0);
                    if idx < 0.0 || idx.fract() != 0.0 {
                        return Ok(Value::Null);
                    }
                    Ok(items.get(idx as usize).cloned().unwrap_or(Value::Null))
                }
                (Value::Object(map), Value::String(key)) => {
                    Ok(map.get(key).cloned().unwrap_or(Value::Null))
                }
                (Value::Null, _) => Err(SnippetError::new("cannot index null")),
                _ => Err(SnippetError::new(format!(
                    "cannot index {} with {}",
                    type_name(&object),
                    type_name(&index)
                ))),
            }
        }
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, scope)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
                UnaryOp::Neg => match value.as_f64() {
                    Some(f) => number_value(-f),
                    None => Err(SnippetError::new(format!(
                        "cannot negate {}",
                        type_name(&value)
                    ))),
                },
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, scope),
        Expr::Call { name, args } => eval_call(name, args, scope),
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    scope: &HashMap<String, Value>,
) -> Result<Value, SnippetError> {
    // Logical operators short-circuit; everything else evaluates both sides.
    match op {
        BinaryOp::And => {
            let lhs = eval_expr(lhs, scope)?;
            if !truthy(&lhs) {
                return Ok(Value::Bool(false));
            }
            let rhs = eval_expr(rhs, scope)?;
            return Ok(Value::Bool(truthy(&rhs)));
        }
        BinaryOp::Or => {
            let lhs = eval_expr(lhs, scope)?;
            if truthy(&lhs) {
                return Ok(Value::Bool(true));
            }
            let rhs = eval_expr(rhs, scope)?;
            return Ok(Value::Bool(truthy(&rhs)));
        }
        _ => {}
    }

    let lhs = eval_expr(lhs, scope)?;
    let rhs = eval_expr(rhs, scope)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(value_eq(&lhs, &rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!value_eq(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, &lhs, &rhs),
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => arithmetic(op, &lhs, &rhs),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => arithmetic(op, &lhs, &rhs),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical ops handled above"),
    }
}

/// Equality with numeric coercion: `5` and `5.0` are equal even though
/// their JSON representations differ.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| value_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|w| value_eq(v, w)).unwrap_or(false))
        }
        _ => a == b,
    }
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, SnippetError> {
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            a.partial_cmp(&b).ok_or_else(|| {
                SnippetError::new("cannot compare non-finite numbers".to_string())
            })?
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => {
            return Err(SnippetError::new(format!(
                "cannot compare {} with {}",
                type_name(lhs),
                type_name(rhs)
            )));
        }
    };

    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!("compare called with non-comparison op"),
    };

    Ok(Value::Bool(result))
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, SnippetError> {
    let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(SnippetError::new(format!(
                "arithmetic requires numbers, got {} and {}",
                type_name(lhs),
                type_name(rhs)
            )));
        }
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => unreachable!("arithmetic called with non-arithmetic op"),
    };

    number_value(result)
}

fn eval_call(
    name: &str,
    args: &[Expr],
    scope: &HashMap<String, Value>,
) -> Result<Value, SnippetError> {
    match name {
        "len" => {
            if args.len() != 1 {
                return Err(SnippetError::new(format!(
                    "len() takes one argument, got {}",
                    args.len()
                )));
            }
            let value = eval_expr(&args[0], scope)?;
            let length = match &value {
                Value::Array(a) => a.len(),
                Value::Object(o) => o.len(),
                Value::String(s) => s.chars().count(),
                other => {
                    return Err(SnippetError::new(format!(
                        "len() requires an array, object, or string, got {}",
                        type_name(other)
                    )));
                }
            };
            Ok(Value::Number(Number::from(length as u64)))
        }
        other => Err(SnippetError::new(format!("unknown function `{other}`"))),
    }
}

/// Wraps an f64 result, rejecting non-finite values that JSON cannot hold.
fn number_value(f: f64) -> Result<Value, SnippetError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| SnippetError::new("arithmetic result is not a finite number"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
