//! The closed set of decoded flight element variants.
//!
//! Every record (and every nested value reached by recursive resolution)
//! classifies into exactly one of these. Variants carry the raw decoded
//! value plus the originating tag (`value_class`) and the record index when
//! there was one; container and parent variants own their children as
//! already-resolved elements instead of raw values.

use serde_json::{json, Map, Value};

use crate::error::FlightError;

/// Closed registry of element kinds.
///
/// This doubles as the only string-to-kind mapping: [`ElementKind::from_name`]
/// rejects anything outside the enumeration with a typed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    RscPayload,
    Error,
    Text,
    HintPreload,
    Module,
    Data,
    EmptyData,
    SpecialData,
    HtmlElement,
    DataContainer,
    DataParent,
    UrlQuery,
    Unclassified,
}

impl ElementKind {
    pub const ALL: [ElementKind; 13] = [
        ElementKind::RscPayload,
        ElementKind::Error,
        ElementKind::Text,
        ElementKind::HintPreload,
        ElementKind::Module,
        ElementKind::Data,
        ElementKind::EmptyData,
        ElementKind::SpecialData,
        ElementKind::HtmlElement,
        ElementKind::DataContainer,
        ElementKind::DataParent,
        ElementKind::UrlQuery,
        ElementKind::Unclassified,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::RscPayload => "RscPayload",
            ElementKind::Error => "Error",
            ElementKind::Text => "Text",
            ElementKind::HintPreload => "HintPreload",
            ElementKind::Module => "Module",
            ElementKind::Data => "Data",
            ElementKind::EmptyData => "EmptyData",
            ElementKind::SpecialData => "SpecialData",
            ElementKind::HtmlElement => "HtmlElement",
            ElementKind::DataContainer => "DataContainer",
            ElementKind::DataParent => "DataParent",
            ElementKind::UrlQuery => "UrlQuery",
            ElementKind::Unclassified => "Unclassified",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, FlightError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| FlightError::UnknownElementKind(name.to_owned()))
    }
}

/// One classified unit of decoded flight data.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    RscPayload(RscPayload),
    Error(ErrorDigest),
    Text(Text),
    HintPreload(HintPreload),
    Module(Module),
    Data(Data),
    EmptyData(EmptyData),
    SpecialData(SpecialData),
    HtmlElement(HtmlElement),
    DataContainer(DataContainer),
    DataParent(DataParent),
    UrlQuery(UrlQuery),
    Unclassified(Unclassified),
}

/// The root application-state envelope. Two physical shapes exist: the old
/// 4-element page-tree node whose content holds `buildId`, and the new plain
/// object keyed `b`. [`RscPayload::build_id`] normalizes both.
#[derive(Debug, Clone, PartialEq)]
pub struct RscPayload {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RscPayloadVersion {
    Old,
    New,
}

impl RscPayload {
    pub fn version(&self) -> Result<RscPayloadVersion, FlightError> {
        match &self.value {
            Value::Array(items) if items.len() == 4 => Ok(RscPayloadVersion::Old),
            Value::Object(map) if map.contains_key("b") => Ok(RscPayloadVersion::New),
            _ => Err(FlightError::InvalidRscPayload),
        }
    }

    /// The per-deployment build identifier, whichever shape carries it.
    pub fn build_id(&self) -> Result<&str, FlightError> {
        let id = match self.version()? {
            RscPayloadVersion::New => self.value["b"].as_str(),
            RscPayloadVersion::Old => self.value[3]["buildId"].as_str(),
        };
        id.ok_or(FlightError::InvalidRscPayload)
    }
}

/// An `E` record: an error code behind a `digest` key.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDigest {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl ErrorDigest {
    pub fn digest(&self) -> Option<&str> {
        self.value["digest"].as_str()
    }
}

/// A `T` record: literal text, never re-parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl Text {
    pub fn text(&self) -> &str {
        &self.value
    }
}

/// An `HL` record: `[href, typeName, attrs?]`, a preloaded asset hint.
#[derive(Debug, Clone, PartialEq)]
pub struct HintPreload {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl HintPreload {
    pub fn href(&self) -> Option<&str> {
        self.value[0].as_str()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.value[1].as_str()
    }

    pub fn attrs(&self) -> Option<&Map<String, Value>> {
        self.value[2].as_object()
    }
}

/// An `I` record: an import descriptor, either the positional
/// `[id, [chunkId, chunkPath, …], name, async?]` array or the keyed
/// `{id, chunks, name, async}` object.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl Module {
    pub fn module_id(&self) -> Option<i64> {
        match &self.value {
            Value::Array(items) => items.first()?.as_i64(),
            Value::Object(map) => match map.get("id")? {
                Value::String(id) => id.parse().ok(),
                other => other.as_i64(),
            },
            _ => None,
        }
    }

    /// Chunk-id to relative-path pairs, in declaration order.
    ///
    /// The positional shape pairs its chunk list two at a time; an odd
    /// length is malformed input. The keyed shape splits each `id:path`
    /// string on the first colon.
    pub fn chunks(&self) -> Result<Vec<(String, String)>, FlightError> {
        match &self.value {
            Value::Array(items) => {
                let list = items
                    .get(1)
                    .and_then(Value::as_array)
                    .ok_or(FlightError::MalformedModule)?;
                if list.len() % 2 != 0 {
                    return Err(FlightError::MalformedModule);
                }
                let mut out = Vec::with_capacity(list.len() / 2);
                for pair in list.chunks(2) {
                    let id = pair[0].as_str().ok_or(FlightError::MalformedModule)?;
                    let path = pair[1].as_str().ok_or(FlightError::MalformedModule)?;
                    out.push((id.to_owned(), path.to_owned()));
                }
                Ok(out)
            }
            Value::Object(map) => {
                let list = map
                    .get("chunks")
                    .and_then(Value::as_array)
                    .ok_or(FlightError::MalformedModule)?;
                let mut out = Vec::with_capacity(list.len());
                for item in list {
                    let entry = item.as_str().ok_or(FlightError::MalformedModule)?;
                    let (id, path) = entry
                        .split_once(':')
                        .ok_or(FlightError::MalformedModule)?;
                    out.push((id.to_owned(), path.to_owned()));
                }
                Ok(out)
            }
            _ => Err(FlightError::MalformedModule),
        }
    }

    /// Chunk map with each path rooted under `/_next/`.
    pub fn chunks_absolute(&self) -> Result<Vec<(String, String)>, FlightError> {
        Ok(self
            .chunks()?
            .into_iter()
            .map(|(id, path)| {
                let path = format!("/_next/{}", path.trim_matches('/'));
                (id, path)
            })
            .collect())
    }

    pub fn module_name(&self) -> Option<&str> {
        match &self.value {
            Value::Array(items) => items.get(2)?.as_str(),
            Value::Object(map) => map.get("name")?.as_str(),
            _ => None,
        }
    }

    pub fn is_async(&self) -> bool {
        match &self.value {
            Value::Object(map) => map.get("async").and_then(Value::as_bool).unwrap_or(false),
            _ => false,
        }
    }
}

/// A generic page-tree node `["$", ref, key|null, content|null]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl Data {
    pub fn reference(&self) -> Option<&str> {
        self.value[1].as_str()
    }

    pub fn content(&self) -> Option<&Value> {
        match &self.value[3] {
            Value::Null => None,
            other => Some(other),
        }
    }
}

/// The literal absence value.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyData {
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

/// A `$`-prefixed string that is not a page-tree node, e.g. `$Sreact.suspense`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialData {
    pub value: String,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl SpecialData {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// A serialized DOM node `["$", tag, href|null, attrs]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl HtmlElement {
    pub fn tag(&self) -> Option<&str> {
        self.value[1].as_str()
    }

    pub fn href(&self) -> Option<&str> {
        self.value[2].as_str()
    }

    pub fn attrs(&self) -> Option<&Map<String, Value>> {
        self.value[3].as_object()
    }
}

/// A list whose every item is a page-tree node; owns its resolved children.
#[derive(Debug, Clone, PartialEq)]
pub struct DataContainer {
    pub children: Vec<Element>,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl DataContainer {
    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

/// A page-tree node whose content is exactly `{children: …}`; owns the one
/// resolved child.
#[derive(Debug, Clone, PartialEq)]
pub struct DataParent {
    pub reference: String,
    pub key: Option<String>,
    pub child: Box<Element>,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl DataParent {
    pub fn child(&self) -> &Element {
        &self.child
    }
}

/// A `[key, value, "d"]` triple naming a URL query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlQuery {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl UrlQuery {
    pub fn key(&self) -> Option<&str> {
        self.value[0].as_str()
    }

    pub fn val(&self) -> Option<&str> {
        self.value[1].as_str()
    }
}

/// Fallback for records matching no other variant; keeps the value as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Unclassified {
    pub value: Value,
    pub value_class: Option<String>,
    pub index: Option<u64>,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::RscPayload(_) => ElementKind::RscPayload,
            Element::Error(_) => ElementKind::Error,
            Element::Text(_) => ElementKind::Text,
            Element::HintPreload(_) => ElementKind::HintPreload,
            Element::Module(_) => ElementKind::Module,
            Element::Data(_) => ElementKind::Data,
            Element::EmptyData(_) => ElementKind::EmptyData,
            Element::SpecialData(_) => ElementKind::SpecialData,
            Element::HtmlElement(_) => ElementKind::HtmlElement,
            Element::DataContainer(_) => ElementKind::DataContainer,
            Element::DataParent(_) => ElementKind::DataParent,
            Element::UrlQuery(_) => ElementKind::UrlQuery,
            Element::Unclassified(_) => ElementKind::Unclassified,
        }
    }

    pub fn index(&self) -> Option<u64> {
        match self {
            Element::RscPayload(e) => e.index,
            Element::Error(e) => e.index,
            Element::Text(e) => e.index,
            Element::HintPreload(e) => e.index,
            Element::Module(e) => e.index,
            Element::Data(e) => e.index,
            Element::EmptyData(e) => e.index,
            Element::SpecialData(e) => e.index,
            Element::HtmlElement(e) => e.index,
            Element::DataContainer(e) => e.index,
            Element::DataParent(e) => e.index,
            Element::UrlQuery(e) => e.index,
            Element::Unclassified(e) => e.index,
        }
    }

    pub fn value_class(&self) -> Option<&str> {
        match self {
            Element::RscPayload(e) => e.value_class.as_deref(),
            Element::Error(e) => e.value_class.as_deref(),
            Element::Text(e) => e.value_class.as_deref(),
            Element::HintPreload(e) => e.value_class.as_deref(),
            Element::Module(e) => e.value_class.as_deref(),
            Element::Data(e) => e.value_class.as_deref(),
            Element::EmptyData(e) => e.value_class.as_deref(),
            Element::SpecialData(e) => e.value_class.as_deref(),
            Element::HtmlElement(e) => e.value_class.as_deref(),
            Element::DataContainer(e) => e.value_class.as_deref(),
            Element::DataParent(e) => e.value_class.as_deref(),
            Element::UrlQuery(e) => e.value_class.as_deref(),
            Element::Unclassified(e) => e.value_class.as_deref(),
        }
    }

    /// The raw value this element classifies. Container and parent variants
    /// rebuild theirs from their owned children's serialized forms.
    pub fn value(&self) -> Value {
        match self {
            Element::RscPayload(e) => e.value.clone(),
            Element::Error(e) => e.value.clone(),
            Element::Text(e) => Value::String(e.value.clone()),
            Element::HintPreload(e) => e.value.clone(),
            Element::Module(e) => e.value.clone(),
            Element::Data(e) => e.value.clone(),
            Element::EmptyData(_) => Value::Null,
            Element::SpecialData(e) => Value::String(e.value.clone()),
            Element::HtmlElement(e) => e.value.clone(),
            Element::DataContainer(e) => {
                Value::Array(e.children.iter().map(Element::to_parts).collect())
            }
            Element::DataParent(e) => json!([
                "$",
                e.reference,
                e.key,
                { "children": e.child.to_parts() }
            ]),
            Element::UrlQuery(e) => e.value.clone(),
            Element::Unclassified(e) => e.value.clone(),
        }
    }

    /// Serialized `{value, value_class, index, cls}` form. Feeding it back
    /// through the resolver reconstructs an equal element.
    pub fn to_parts(&self) -> Value {
        json!({
            "value": self.value(),
            "value_class": self.value_class(),
            "index": self.index(),
            "cls": self.kind().name(),
        })
    }

    pub fn as_rsc_payload(&self) -> Option<&RscPayload> {
        match self {
            Element::RscPayload(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorDigest> {
        match self {
            Element::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Element::Text(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_hint_preload(&self) -> Option<&HintPreload> {
        match self {
            Element::HintPreload(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Element::Module(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Element::Data(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_special_data(&self) -> Option<&SpecialData> {
        match self {
            Element::SpecialData(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_html_element(&self) -> Option<&HtmlElement> {
        match self {
            Element::HtmlElement(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_data_container(&self) -> Option<&DataContainer> {
        match self {
            Element::DataContainer(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_data_parent(&self) -> Option<&DataParent> {
        match self {
            Element::DataParent(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_url_query(&self) -> Option<&UrlQuery> {
        match self {
            Element::UrlQuery(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsc_payload_build_id_normalizes_both_shapes() {
        let old = RscPayload {
            value: serde_json::json!(["$", "$L1", null, {"buildId": "i am a build id"}]),
            value_class: None,
            index: Some(0),
        };
        assert_eq!(old.version().unwrap(), RscPayloadVersion::Old);
        assert_eq!(old.build_id().unwrap(), "i am a build id");

        let new = RscPayload {
            value: serde_json::json!({"b": "i am a new build id"}),
            value_class: None,
            index: Some(0),
        };
        assert_eq!(new.version().unwrap(), RscPayloadVersion::New);
        assert_eq!(new.build_id().unwrap(), "i am a new build id");

        let bogus = RscPayload {
            value: serde_json::json!({"x": 1}),
            value_class: None,
            index: Some(0),
        };
        assert!(matches!(
            bogus.build_id(),
            Err(FlightError::InvalidRscPayload)
        ));
    }

    #[test]
    fn module_accessors_positional_shape() {
        let module = Module {
            value: serde_json::json!([
                30777,
                [
                    "71523",
                    "static/chunks/25c8a87d-0d1c991f726a4cc1.js",
                    "10411",
                    "static/chunks/app/layout-bd7c1d222b477529.js"
                ],
                "default"
            ]),
            value_class: Some("I".to_owned()),
            index: Some(1),
        };
        assert_eq!(module.module_id(), Some(30777));
        assert_eq!(module.module_name(), Some("default"));
        assert!(!module.is_async());
        assert_eq!(
            module.chunks().unwrap(),
            vec![
                (
                    "71523".to_owned(),
                    "static/chunks/25c8a87d-0d1c991f726a4cc1.js".to_owned()
                ),
                (
                    "10411".to_owned(),
                    "static/chunks/app/layout-bd7c1d222b477529.js".to_owned()
                ),
            ]
        );
        assert_eq!(
            module.chunks_absolute().unwrap()[0].1,
            "/_next/static/chunks/25c8a87d-0d1c991f726a4cc1.js"
        );
    }

    #[test]
    fn module_accessors_keyed_shape() {
        let module = Module {
            value: serde_json::json!({
                "id": "47858",
                "chunks": [
                    "272:static/chunks/webpack-2f0e36f832c3608a.js",
                    "667:static/chunks/2443530c-7d590f93d1ab76bc.js"
                ],
                "name": "",
                "async": false
            }),
            value_class: Some("I".to_owned()),
            index: Some(1),
        };
        assert_eq!(module.module_id(), Some(47858));
        assert_eq!(module.module_name(), Some(""));
        assert!(!module.is_async());
        assert_eq!(
            module.chunks().unwrap(),
            vec![
                (
                    "272".to_owned(),
                    "static/chunks/webpack-2f0e36f832c3608a.js".to_owned()
                ),
                (
                    "667".to_owned(),
                    "static/chunks/2443530c-7d590f93d1ab76bc.js".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn odd_positional_chunk_list_is_malformed() {
        let module = Module {
            value: serde_json::json!([1, ["a", "b", "c"], "default"]),
            value_class: Some("I".to_owned()),
            index: None,
        };
        assert!(matches!(
            module.chunks(),
            Err(FlightError::MalformedModule)
        ));
    }

    #[test]
    fn hint_preload_attrs_are_optional() {
        let with_attrs = HintPreload {
            value: serde_json::json!([
                "/_next/static/media/93f479601ee12b01-s.p.woff2",
                "font",
                {"crossOrigin": "", "type": "font/woff2"}
            ]),
            value_class: Some("HL".to_owned()),
            index: Some(1),
        };
        assert_eq!(
            with_attrs.href(),
            Some("/_next/static/media/93f479601ee12b01-s.p.woff2")
        );
        assert_eq!(with_attrs.type_name(), Some("font"));
        assert_eq!(with_attrs.attrs().unwrap().len(), 2);

        let without = HintPreload {
            value: serde_json::json!(["/a.css", "style"]),
            value_class: Some("HL".to_owned()),
            index: Some(1),
        };
        assert!(without.attrs().is_none());
    }

    #[test]
    fn html_element_accessors() {
        let html = HtmlElement {
            value: serde_json::json!([
                "$",
                "link",
                "https://sentry.io",
                {"rel": "dns-prefetch", "href": "https://sentry.io"}
            ]),
            value_class: None,
            index: None,
        };
        assert_eq!(html.tag(), Some("link"));
        assert_eq!(html.href(), Some("https://sentry.io"));
        assert_eq!(
            html.attrs().unwrap().get("rel"),
            Some(&serde_json::json!("dns-prefetch"))
        );
    }

    #[test]
    fn kind_registry_is_closed() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_name(kind.name()).unwrap(), kind);
        }
        assert!(matches!(
            ElementKind::from_name("WONTEXIST"),
            Err(FlightError::UnknownElementKind(name)) if name == "WONTEXIST"
        ));
    }
}
