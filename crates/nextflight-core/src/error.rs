//! Flight decode error and warning types.

use thiserror::Error;

use crate::element::ElementKind;

/// Fatal decode failures. Any of these aborts the whole decode.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("continuation segment before any bootstrap segment")]
    ProtocolViolation,
    #[error("unknown segment type {0}")]
    UnknownSegmentType(i64),
    #[error("segment tuple is not a [type, payload] array")]
    MalformedSegment,
    #[error("malformed record framing at byte {0}")]
    MalformedFraming(usize),
    #[error("invalid JSON in record payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("invalid base64 in binary segment: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("reassembled buffer exceeds the {limit}-byte cap")]
    BufferTooLarge { limit: usize },
    #[error("record at index 0 matches no known element shape")]
    UnresolvedRootType,
    #[error("unknown element kind `{0}`")]
    UnknownElementKind(String),
    #[error("value shape does not fit element kind {0:?}")]
    ShapeMismatch(ElementKind),
    #[error("payload carries its build id in no recognized shape")]
    InvalidRscPayload,
    #[error("module chunk list is malformed")]
    MalformedModule,
}

/// Recoverable diagnostics, accumulated alongside the decode result.
///
/// Nothing is dropped silently: every record that falls back to the
/// unclassified element leaves one of these behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A non-root record matched no variant and became an unclassified element.
    UnresolvedType {
        index: Option<u64>,
        value_class: Option<String>,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnresolvedType { index, value_class } => write!(
                f,
                "no element shape for record (index {:?}, class {:?})",
                index, value_class
            ),
        }
    }
}
