//! The `__NEXT_DATA__` bootstrap script.
//!
//! Pages-router sites ship their props as one JSON script element; when it is
//! present it is the most direct source of the build id.

use serde_json::Value;

use crate::document::Document;
use crate::error::PageError;

pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

pub fn has_next_data(doc: &Document) -> bool {
    doc.scripts_by_id(NEXT_DATA_ID).next().is_some()
}

/// Parses the `__NEXT_DATA__` payload. `Ok(None)` when the page has none;
/// a present-but-unparseable or duplicated script is an error.
pub fn next_data(doc: &Document) -> Result<Option<Value>, PageError> {
    let mut bodies = doc.scripts_by_id(NEXT_DATA_ID);
    let Some(body) = bodies.next() else {
        return Ok(None);
    };
    if bodies.next().is_some() {
        return Err(PageError::DuplicateNextData);
    }
    serde_json::from_str(body.trim())
        .map(Some)
        .map_err(PageError::InvalidNextData)
}
