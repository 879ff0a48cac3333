//! Query template handling.
//!
//! A query template is a GraphQL query string containing `${name}`
//! placeholders. This module extracts the placeholders into typed
//! parameters, substitutes bound values back in, and performs a shallow
//! structural sanity check before execution.

mod extract;
mod substitute;
mod validate;

pub use extract::extract_parameters;
pub use substitute::substitute;
pub use validate::{validate_query, QuerySyntaxError};

use serde::{Deserialize, Serialize};

/// Value type inferred for a template parameter.
///
/// `Boolean` is part of the declared model and honored by substitution,
/// but no inference rule currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
}

impl ParamType {
    /// Returns the type as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Returns true if bound values are inserted without quoting.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Number | Self::Boolean)
    }
}

/// A parameter extracted from a query template.
///
/// Derived fresh from the template whenever it changes; persisted only as
/// part of the owning saved query record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
}

impl Parameter {
    /// Creates a parameter with the standard derived description.
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        let name = name.into();
        let description = format!("Parameter: {} ({})", name, param_type.as_str());
        Self {
            name,
            param_type,
            description,
        }
    }
}
