//! Reassembly of push tuples into one flight byte buffer.
//!
//! Each tuple is `[segmentType, payload?]`. A bootstrap segment opens the
//! buffer, text continuations append their UTF-8 bytes, binary continuations
//! append their base64-decoded bytes, and a form-state segment is captured to
//! the side. Everything downstream operates on the resulting byte sequence.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::error::FlightError;

pub const SEGMENT_BOOTSTRAP: i64 = 0;
pub const SEGMENT_PARTIAL: i64 = 1;
pub const SEGMENT_FORM_STATE: i64 = 2;
pub const SEGMENT_BINARY: i64 = 3;

/// Output of [`reassemble`]: the byte buffer and the optional form state.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    pub bytes: Vec<u8>,
    pub form_state: Option<Value>,
}

/// Replays the ordered push tuples into a single byte buffer.
///
/// A continuation or binary segment arriving before any bootstrap segment is
/// a protocol violation. A later bootstrap segment discards whatever was
/// buffered before it. `max_bytes`, when set, bounds the reassembled buffer.
pub fn reassemble(
    tuples: &[Value],
    max_bytes: Option<usize>,
) -> Result<SegmentBuffer, FlightError> {
    let mut buffer: Option<Vec<u8>> = None;
    let mut form_state: Option<Value> = None;

    for tuple in tuples {
        let items = tuple.as_array().ok_or(FlightError::MalformedSegment)?;
        let kind = items
            .first()
            .and_then(Value::as_i64)
            .ok_or(FlightError::MalformedSegment)?;
        match kind {
            SEGMENT_BOOTSTRAP => buffer = Some(Vec::new()),
            SEGMENT_PARTIAL => {
                let buf = buffer.as_mut().ok_or(FlightError::ProtocolViolation)?;
                let chunk = items
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or(FlightError::MalformedSegment)?;
                buf.extend_from_slice(chunk.as_bytes());
            }
            SEGMENT_FORM_STATE => form_state = items.get(1).cloned(),
            SEGMENT_BINARY => {
                let buf = buffer.as_mut().ok_or(FlightError::ProtocolViolation)?;
                let chunk = items
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or(FlightError::MalformedSegment)?;
                buf.extend_from_slice(&BASE64.decode(chunk)?);
            }
            other => return Err(FlightError::UnknownSegmentType(other)),
        }
        if let (Some(limit), Some(buf)) = (max_bytes, buffer.as_ref()) {
            if buf.len() > limit {
                return Err(FlightError::BufferTooLarge { limit });
            }
        }
    }

    Ok(SegmentBuffer {
        bytes: buffer.unwrap_or_default(),
        form_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_segments_concatenate_in_order() {
        let tuples = [json!([0]), json!([1, "abc"]), json!([1, "def"])];
        let out = reassemble(&tuples, None).unwrap();
        assert_eq!(out.bytes, b"abcdef");
        assert!(out.form_state.is_none());
    }

    #[test]
    fn continuation_before_bootstrap_is_a_protocol_violation() {
        let tuples = [json!([1, "chunk"])];
        assert!(matches!(
            reassemble(&tuples, None),
            Err(FlightError::ProtocolViolation)
        ));
        let tuples = [json!([3, "aGk="])];
        assert!(matches!(
            reassemble(&tuples, None),
            Err(FlightError::ProtocolViolation)
        ));
    }

    #[test]
    fn later_bootstrap_discards_the_buffer() {
        let tuples = [json!([0]), json!([1, "old"]), json!([0]), json!([1, "new"])];
        let out = reassemble(&tuples, None).unwrap();
        assert_eq!(out.bytes, b"new");
    }

    #[test]
    fn binary_segments_append_decoded_bytes() {
        let tuples = [json!([0]), json!([1, "a:"]), json!([3, "aGVsbG8="])];
        let out = reassemble(&tuples, None).unwrap();
        assert_eq!(out.bytes, b"a:hello");
    }

    #[test]
    fn form_state_is_captured_not_buffered() {
        let tuples = [json!([0]), json!([2, {"k": 1}]), json!([1, "x"])];
        let out = reassemble(&tuples, None).unwrap();
        assert_eq!(out.bytes, b"x");
        assert_eq!(out.form_state, Some(json!({"k": 1})));
    }

    #[test]
    fn unknown_segment_type_is_fatal() {
        let tuples = [json!([0]), json!([7, "x"])];
        assert!(matches!(
            reassemble(&tuples, None),
            Err(FlightError::UnknownSegmentType(7))
        ));
    }

    #[test]
    fn form_state_only_stream_yields_an_empty_buffer() {
        let tuples = [json!([2, "state"])];
        let out = reassemble(&tuples, None).unwrap();
        assert!(out.bytes.is_empty());
        assert_eq!(out.form_state, Some(json!("state")));
    }

    #[test]
    fn buffer_cap_is_enforced() {
        let tuples = [json!([0]), json!([1, "0123456789"])];
        assert!(matches!(
            reassemble(&tuples, Some(4)),
            Err(FlightError::BufferTooLarge { limit: 4 })
        ));
        assert!(reassemble(&tuples, Some(10)).is_ok());
    }

    #[test]
    fn invalid_base64_is_fatal() {
        let tuples = [json!([0]), json!([3, "!!not base64!!"])];
        assert!(matches!(
            reassemble(&tuples, None),
            Err(FlightError::InvalidBase64(_))
        ));
    }

    #[test]
    fn malformed_tuple_is_fatal() {
        for bad in [json!("nope"), json!([]), json!(["1", "x"])] {
            assert!(matches!(
                reassemble(std::slice::from_ref(&bad), None),
                Err(FlightError::MalformedSegment)
            ));
        }
    }
}
