//! Parser for the JavaScript-object-literal micro-language that Next.js
//! asset manifests are written in.
//!
//! Accepts the JSON superset minifiers emit (single quotes, unquoted keys,
//! `undefined`/`void 0`, `!0`/`!1`) plus bare identifiers resolved through a
//! caller-supplied substitution map, and produces [`serde_json::Value`]s.

mod error;
mod parser;

use std::collections::HashMap;

use serde_json::Value;

pub use error::JsLitError;
pub use parser::Parser;

/// Parses one value, ignoring trailing input.
pub fn parse(src: &str) -> Result<Value, JsLitError> {
    Parser::new(src).parse_document(false)
}

/// Parses one value, rejecting trailing non-space input.
pub fn parse_strict(src: &str) -> Result<Value, JsLitError> {
    Parser::new(src).parse_document(true)
}

/// Parses one value with bare identifiers substituted from `vars`.
pub fn parse_with(src: &str, vars: &HashMap<String, Value>) -> Result<Value, JsLitError> {
    Parser::with_vars(src, vars).parse_document(false)
}
