//! Tokenization of the reassembled buffer into indexed records.
//!
//! The stream is a sequence of `index:tag?payload` units. The index is hex
//! and may be empty (a nameless fragment). A `T` tag announces a
//! length-prefixed text payload; every other payload runs to the next split
//! point (an unescaped newline followed by hex digits and a colon) and is
//! parsed as JSON.
//!
//! All cursor arithmetic here is in bytes. The `T` length prefix counts
//! encoded bytes, so a multi-byte character anywhere earlier in the stream
//! must not shift the measured span.

use std::sync::LazyLock;

use serde_json::Value;

use crate::error::FlightError;

/// One `index:tag?payload` unit of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: Option<u64>,
    pub tag: Option<String>,
    pub payload: RecordPayload,
}

/// Record payload: verbatim text for `T` records, parsed JSON otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Text(String),
    Json(Value),
}

static SPLIT_POINT: LazyLock<regex::bytes::Regex> =
    LazyLock::new(|| regex::bytes::Regex::new(r"\n[a-f0-9]*:").unwrap());

/// Scans the whole buffer into records.
pub fn tokenize(buffer: &[u8]) -> Result<Vec<Record>, FlightError> {
    let mut records = Vec::new();
    let mut pos = 0usize;

    while pos < buffer.len() {
        let Some(colon) = find_byte(buffer, pos, b':') else {
            break; // clean end of stream
        };
        let index = if colon == pos {
            None
        } else {
            Some(parse_hex(buffer, pos, colon)? as u64)
        };
        pos = colon + 1;

        let tag_start = pos;
        while pos < buffer.len() && buffer[pos].is_ascii_uppercase() {
            pos += 1;
        }
        let tag = (pos > tag_start)
            .then(|| String::from_utf8_lossy(&buffer[tag_start..pos]).into_owned());

        let payload = if tag.as_deref() == Some("T") {
            let comma = find_byte(buffer, pos, b',').ok_or(FlightError::MalformedFraming(pos))?;
            let length = parse_hex(buffer, pos, comma)?;
            let start = comma + 1;
            let end = start
                .checked_add(length)
                .filter(|&end| end <= buffer.len())
                .ok_or(FlightError::MalformedFraming(start))?;
            let text = std::str::from_utf8(&buffer[start..end])
                .map_err(|_| FlightError::MalformedFraming(start))?;
            pos = end;
            RecordPayload::Text(text.to_owned())
        } else {
            let (raw, next) = match split_point(buffer, pos) {
                Some(split) => (&buffer[pos..split], split + 1),
                None => (&buffer[pos..], buffer.len()),
            };
            pos = next;
            RecordPayload::Json(serde_json::from_slice(raw)?)
        };

        records.push(Record { index, tag, payload });
    }

    Ok(records)
}

fn find_byte(buffer: &[u8], from: usize, needle: u8) -> Option<usize> {
    buffer[from..].iter().position(|&b| b == needle).map(|i| from + i)
}

fn parse_hex(buffer: &[u8], from: usize, to: usize) -> Result<usize, FlightError> {
    std::str::from_utf8(&buffer[from..to])
        .ok()
        .and_then(|text| usize::from_str_radix(text, 16).ok())
        .ok_or(FlightError::MalformedFraming(from))
}

/// Position of the next record boundary at or after `from`: a newline not
/// preceded by a backslash, followed by hex digits and a colon.
fn split_point(buffer: &[u8], from: usize) -> Option<usize> {
    for found in SPLIT_POINT.find_iter(&buffer[from..]) {
        let at = from + found.start();
        if at == 0 || buffer[at - 1] != b'\\' {
            return Some(at);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one(buffer: &[u8]) -> Record {
        let records = tokenize(buffer).unwrap();
        assert_eq!(records.len(), 1, "expected one record in {buffer:?}");
        records.into_iter().next().unwrap()
    }

    #[test]
    fn untagged_record_parses_as_json() {
        let record = one(b"0:{\"b\":\"BUILDID\"}");
        assert_eq!(record.index, Some(0));
        assert_eq!(record.tag, None);
        assert_eq!(record.payload, RecordPayload::Json(json!({"b": "BUILDID"})));
    }

    #[test]
    fn tagged_record_keeps_its_tag() {
        let record = one(b"1:HL[\"/a.css\",\"style\"]");
        assert_eq!(record.index, Some(1));
        assert_eq!(record.tag.as_deref(), Some("HL"));
        assert_eq!(record.payload, RecordPayload::Json(json!(["/a.css", "style"])));
    }

    #[test]
    fn index_is_hex() {
        let record = one(b"1f:null\n");
        assert_eq!(record.index, Some(0x1f));
    }

    #[test]
    fn text_record_consumes_exactly_the_declared_bytes() {
        let records = tokenize(b"2:T5,hello3:null\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, RecordPayload::Text("hello".to_owned()));
        assert_eq!(records[1].index, Some(3));
    }

    #[test]
    fn text_length_is_bytes_not_chars() {
        // "héllo" is six bytes: the length prefix must be byte-counted, and a
        // multi-byte char before the T record must not shift the span.
        let buffer = "0:[\"$\",\"Lé\",null,null]\n1:T6,héllo2:T2,ok".as_bytes();
        let records = tokenize(buffer).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].payload, RecordPayload::Text("héllo".to_owned()));
        assert_eq!(records[2].payload, RecordPayload::Text("ok".to_owned()));
    }

    #[test]
    fn records_split_on_unescaped_newlines() {
        let records = tokenize(b"0:null\n1:true\na:\"x\"\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].index, Some(10));
        assert_eq!(records[2].payload, RecordPayload::Json(json!("x")));
    }

    #[test]
    fn escaped_newline_is_not_a_split_point() {
        // The byte pair `\` `\n` does not end a record; the next bare
        // newline-hex-colon sequence does.
        let buffer = b"xx\\\nab:yy\ncd:zz";
        assert_eq!(split_point(buffer, 0), Some(9));
        assert_eq!(split_point(buffer, 10), None);
    }

    #[test]
    fn empty_index_is_a_nameless_record() {
        let records = tokenize(b":null\n1:null\n").unwrap();
        assert_eq!(records[0].index, None);
        assert_eq!(records[1].index, Some(1));
    }

    #[test]
    fn trailing_garbage_without_colon_ends_the_scan() {
        let records = tokenize(b"0:null\n \t").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn bad_hex_index_is_malformed_framing() {
        assert!(matches!(
            tokenize(b"zz:null\n"),
            Err(FlightError::MalformedFraming(0))
        ));
    }

    #[test]
    fn text_length_overrun_is_malformed_framing() {
        assert!(matches!(
            tokenize(b"2:Tff,short"),
            Err(FlightError::MalformedFraming(_))
        ));
    }

    #[test]
    fn text_without_comma_is_malformed_framing() {
        assert!(matches!(
            tokenize(b"2:T5hello"),
            Err(FlightError::MalformedFraming(_))
        ));
    }

    #[test]
    fn invalid_json_payload_is_fatal() {
        assert!(matches!(
            tokenize(b"0:{broken\n"),
            Err(FlightError::InvalidPayload(_))
        ));
    }

    #[test]
    fn empty_buffer_yields_no_records() {
        assert!(tokenize(b"").unwrap().is_empty());
    }
}
