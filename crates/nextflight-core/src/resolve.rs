//! Classification of raw record values into element variants.
//!
//! Resolution is ordered and first-match-wins: explicit tags beat shape
//! inference, shape inference runs only for untagged values, and whatever
//! matches nothing falls back to [`Unclassified`] with a warning. The one
//! exception is index 0, where an unclassifiable record fails the decode.

use serde_json::Value;

use crate::element::{
    Data, DataContainer, DataParent, Element, ElementKind, EmptyData, ErrorDigest, HintPreload,
    HtmlElement, Module, RscPayload, SpecialData, Text, Unclassified, UrlQuery,
};
use crate::error::{FlightError, Warning};

const TAG_ERROR: &str = "E";
const TAG_HINT_PRELOAD: &str = "HL";
const TAG_MODULE: &str = "I";
const TAG_TEXT: &str = "T";

/// True for a serialized page-tree node: `["$", ref, key|null, content]`.
pub fn is_page_node(value: &Value) -> bool {
    match value.as_array() {
        Some(items) => {
            items.len() == 4
                && items[0].as_str() == Some("$")
                && items[1].is_string()
                && (items[2].is_null() || items[2].is_string())
        }
        None => false,
    }
}

/// Resolves one raw value into an element.
///
/// `value_class` is the record's tag (absent for nested values) and `index`
/// the record's index (absent for nested values). Recoverable classification
/// failures are appended to `warnings`.
pub fn resolve_type(
    value: Value,
    value_class: Option<&str>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    // A {value, value_class, index[, cls]} object is a serialized element;
    // unwrap and resolve its parts instead.
    if let Some(parts) = serialized_parts(&value) {
        let (inner, class, inner_index, cls) = parts;
        return match cls {
            Some(name) => {
                let kind = ElementKind::from_name(&name)?;
                from_kind(kind, inner, class, inner_index, warnings)
            }
            None => resolve_type(inner, class.as_deref(), inner_index, warnings),
        };
    }

    match value_class {
        Some(TAG_ERROR) => {
            return Ok(Element::Error(ErrorDigest {
                value,
                value_class: owned(value_class),
                index,
            }))
        }
        Some(TAG_HINT_PRELOAD) => {
            return Ok(Element::HintPreload(HintPreload {
                value,
                value_class: owned(value_class),
                index,
            }))
        }
        Some(TAG_MODULE) => {
            return Ok(Element::Module(Module {
                value,
                value_class: owned(value_class),
                index,
            }))
        }
        Some(TAG_TEXT) => {
            let Value::String(text) = value else {
                return Err(FlightError::ShapeMismatch(ElementKind::Text));
            };
            return Ok(Element::Text(Text {
                value: text,
                value_class: owned(value_class),
                index,
            }));
        }
        // Undocumented tags get no shape inference; they fall through to the
        // fallback (fatal at the root).
        Some(_) => return fallback(value, value_class, index, warnings),
        None => {}
    }

    match value {
        Value::Array(items) => resolve_list(items, index, warnings),
        Value::Null => Ok(Element::EmptyData(EmptyData {
            value_class: None,
            index,
        })),
        Value::Object(map) if index == Some(0) => Ok(Element::RscPayload(RscPayload {
            value: Value::Object(map),
            value_class: None,
            index,
        })),
        Value::String(text) if text.starts_with('$') => Ok(Element::SpecialData(SpecialData {
            value: text,
            value_class: None,
            index,
        })),
        other => fallback(other, None, index, warnings),
    }
}

/// What the content slot of a page-tree node holds, for dispatch.
enum NodeContent {
    BuildId,
    OnlyChildren,
    Other,
}

fn node_content(content: &Value) -> NodeContent {
    match content.as_object() {
        Some(map) if map.contains_key("buildId") => NodeContent::BuildId,
        Some(map) if map.len() == 1 && map.contains_key("children") => NodeContent::OnlyChildren,
        _ => NodeContent::Other,
    }
}

fn resolve_list(
    items: Vec<Value>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    if is_page_node_items(&items) {
        let dollar_ref = items[1].as_str().is_some_and(|s| s.starts_with('$'));
        if !dollar_ref {
            return Ok(Element::HtmlElement(HtmlElement {
                value: Value::Array(items),
                value_class: None,
                index,
            }));
        }
        return match node_content(&items[3]) {
            NodeContent::BuildId => Ok(Element::RscPayload(RscPayload {
                value: Value::Array(items),
                value_class: None,
                index,
            })),
            NodeContent::OnlyChildren => build_parent(items, None, index, warnings),
            NodeContent::Other => Ok(Element::Data(Data {
                value: Value::Array(items),
                value_class: None,
                index,
            })),
        };
    }

    if items.len() == 3 && items[2].as_str() == Some("d") && items.iter().all(Value::is_string) {
        return Ok(Element::UrlQuery(UrlQuery {
            value: Value::Array(items),
            value_class: None,
            index,
        }));
    }

    if !items.is_empty() && items.iter().all(is_page_node) {
        return build_container(items, None, index, warnings);
    }

    fallback(Value::Array(items), None, index, warnings)
}

/// Constructs a specific kind from raw parts (the `cls` registry route).
/// Only the structure a variant cannot exist without is validated.
fn from_kind(
    kind: ElementKind,
    value: Value,
    value_class: Option<String>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    match kind {
        ElementKind::RscPayload => Ok(Element::RscPayload(RscPayload {
            value,
            value_class,
            index,
        })),
        ElementKind::Error => Ok(Element::Error(ErrorDigest {
            value,
            value_class,
            index,
        })),
        ElementKind::Text => {
            let Value::String(text) = value else {
                return Err(FlightError::ShapeMismatch(ElementKind::Text));
            };
            Ok(Element::Text(Text {
                value: text,
                value_class,
                index,
            }))
        }
        ElementKind::HintPreload => Ok(Element::HintPreload(HintPreload {
            value,
            value_class,
            index,
        })),
        ElementKind::Module => Ok(Element::Module(Module {
            value,
            value_class,
            index,
        })),
        ElementKind::Data => Ok(Element::Data(Data {
            value,
            value_class,
            index,
        })),
        ElementKind::EmptyData => Ok(Element::EmptyData(EmptyData { value_class, index })),
        ElementKind::SpecialData => {
            let Value::String(text) = value else {
                return Err(FlightError::ShapeMismatch(ElementKind::SpecialData));
            };
            Ok(Element::SpecialData(SpecialData {
                value: text,
                value_class,
                index,
            }))
        }
        ElementKind::HtmlElement => Ok(Element::HtmlElement(HtmlElement {
            value,
            value_class,
            index,
        })),
        ElementKind::DataContainer => {
            let Value::Array(items) = value else {
                return Err(FlightError::ShapeMismatch(ElementKind::DataContainer));
            };
            build_container(items, value_class, index, warnings)
        }
        ElementKind::DataParent => {
            let Value::Array(items) = value else {
                return Err(FlightError::ShapeMismatch(ElementKind::DataParent));
            };
            build_parent(items, value_class, index, warnings)
        }
        ElementKind::UrlQuery => Ok(Element::UrlQuery(UrlQuery {
            value,
            value_class,
            index,
        })),
        ElementKind::Unclassified => Ok(Element::Unclassified(Unclassified {
            value,
            value_class,
            index,
        })),
    }
}

fn build_container(
    items: Vec<Value>,
    value_class: Option<String>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    let children = items
        .into_iter()
        .map(|item| resolve_type(item, None, None, warnings))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element::DataContainer(DataContainer {
        children,
        value_class,
        index,
    }))
}

fn build_parent(
    items: Vec<Value>,
    value_class: Option<String>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    let mut items = items;
    if items.len() != 4 {
        return Err(FlightError::ShapeMismatch(ElementKind::DataParent));
    }
    let Some(raw_child) = items[3]
        .as_object_mut()
        .and_then(|content| content.remove("children"))
    else {
        return Err(FlightError::ShapeMismatch(ElementKind::DataParent));
    };
    let reference = match &items[1] {
        Value::String(s) => s.clone(),
        _ => return Err(FlightError::ShapeMismatch(ElementKind::DataParent)),
    };
    let key = items[2].as_str().map(str::to_owned);
    let child = resolve_type(raw_child, None, None, warnings)?;
    Ok(Element::DataParent(DataParent {
        reference,
        key,
        child: Box::new(child),
        value_class,
        index,
    }))
}

fn fallback(
    value: Value,
    value_class: Option<&str>,
    index: Option<u64>,
    warnings: &mut Vec<Warning>,
) -> Result<Element, FlightError> {
    if index == Some(0) {
        return Err(FlightError::UnresolvedRootType);
    }
    warnings.push(Warning::UnresolvedType {
        index,
        value_class: owned(value_class),
    });
    Ok(Element::Unclassified(Unclassified {
        value,
        value_class: owned(value_class),
        index,
    }))
}

/// Splits a serialized `{value, value_class, index[, cls]}` object into its
/// parts. Anything missing one of the three mandatory keys is not a
/// serialized element.
#[allow(clippy::type_complexity)]
fn serialized_parts(
    value: &Value,
) -> Option<(Value, Option<String>, Option<u64>, Option<String>)> {
    let map = value.as_object()?;
    if !(map.contains_key("value") && map.contains_key("value_class") && map.contains_key("index"))
    {
        return None;
    }
    let inner = map.get("value").cloned().unwrap_or(Value::Null);
    let class = map
        .get("value_class")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let index = map.get("index").and_then(Value::as_u64);
    let cls = map.get("cls").and_then(Value::as_str).map(str::to_owned);
    Some((inner, class, index, cls))
}

fn is_page_node_items(items: &[Value]) -> bool {
    items.len() == 4
        && items[0].as_str() == Some("$")
        && items[1].is_string()
        && (items[2].is_null() || items[2].is_string())
}

fn owned(class: Option<&str>) -> Option<String> {
    class.map(str::to_owned)
}
