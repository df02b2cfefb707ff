//! End-to-end decode pipeline and its result type.

use indexmap::IndexMap;
use serde_json::Value;

use crate::element::{Element, RscPayload};
use crate::error::{FlightError, Warning};
use crate::extract;
use crate::records::{self, RecordPayload};
use crate::resolve;
use crate::segment;

/// Decode knobs.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Bound on the reassembled buffer, applied before tokenization runs.
    /// A guard against pathological pages, not part of the wire format.
    pub max_buffer_bytes: Option<usize>,
}

/// Decoded flight data: the index→element map plus side products.
///
/// The map preserves stream order for display; queries iterate it in
/// ascending index order.
#[derive(Debug, Default)]
pub struct FlightData {
    pub elements: IndexMap<u64, Element>,
    /// Top-level records that carried no explicit index, in stream order.
    pub anonymous: Vec<Element>,
    /// Payload of a form-state segment, when the page pushed one.
    pub form_state: Option<Value>,
    /// Recoverable classification diagnostics.
    pub warnings: Vec<Warning>,
}

impl FlightData {
    pub fn get(&self, index: u64) -> Option<&Element> {
        self.elements.get(&index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The root payload element, when record 0 is present.
    pub fn root(&self) -> Option<&RscPayload> {
        self.get(0).and_then(Element::as_rsc_payload)
    }

    /// The page's build identifier, when the root payload exposes one.
    pub fn build_id(&self) -> Option<&str> {
        self.root().and_then(|payload| payload.build_id().ok())
    }
}

/// Decodes the flight stream carried by the given script bodies.
///
/// `Ok(None)` means no script matched the push patterns: the page carries no
/// flight data, which is a valid absence rather than an error.
pub fn decode_scripts<'a, I>(scripts: I) -> Result<Option<FlightData>, FlightError>
where
    I: IntoIterator<Item = &'a str>,
{
    decode_scripts_with(scripts, &DecodeOptions::default())
}

pub fn decode_scripts_with<'a, I>(
    scripts: I,
    options: &DecodeOptions,
) -> Result<Option<FlightData>, FlightError>
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(tuples) = extract::raw_push_tuples(scripts)? else {
        return Ok(None);
    };
    let buffer = segment::reassemble(&tuples, options.max_buffer_bytes)?;
    let mut data = decode_buffer(&buffer.bytes)?;
    data.form_state = buffer.form_state;
    Ok(Some(data))
}

/// Tokenizes and classifies one reassembled buffer.
pub fn decode_buffer(buffer: &[u8]) -> Result<FlightData, FlightError> {
    let mut data = FlightData::default();
    for record in records::tokenize(buffer)? {
        let value = match record.payload {
            RecordPayload::Text(text) => Value::String(text),
            RecordPayload::Json(value) => value,
        };
        let element =
            resolve::resolve_type(value, record.tag.as_deref(), record.index, &mut data.warnings)?;
        match record.index {
            Some(index) => {
                data.elements.insert(index, element);
            }
            None => data.anonymous.push(element),
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn decode_buffer_maps_records_by_index() {
        let data = decode_buffer(b"0:{\"b\":\"BUILDID\"}\n2:T5,hello").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.build_id(), Some("BUILDID"));
        assert_eq!(data.get(2).unwrap().kind(), ElementKind::Text);
        assert!(data.warnings.is_empty());
    }

    #[test]
    fn anonymous_records_are_kept_aside() {
        let data = decode_buffer(b":null\n1:null\n").unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.anonymous.len(), 1);
        assert_eq!(data.anonymous[0].kind(), ElementKind::EmptyData);
    }

    #[test]
    fn buffer_cap_applies_before_tokenization() {
        let scripts = [
            r#"(self.__next_f = self.__next_f || []).push([0])"#,
            r#"self.__next_f.push([1,"0:{\"b\":\"BUILDID\"}\n"])"#,
        ];
        let options = DecodeOptions {
            max_buffer_bytes: Some(4),
        };
        assert!(matches!(
            decode_scripts_with(scripts, &options),
            Err(FlightError::BufferTooLarge { limit: 4 })
        ));
    }
}
