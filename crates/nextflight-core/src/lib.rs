//! Decoder for the flight-record stream that server-rendered Next.js pages
//! embed in their HTML.
//!
//! The pipeline reassembles the segmented `self.__next_f` push stream,
//! tokenizes it into index-addressed records under the hex-index /
//! length-prefixed framing rules, and classifies each record into a closed
//! set of typed [`Element`] variants, recursing into nested containers.
//! Everything runs on in-memory buffers, synchronously, without executing
//! any page JavaScript.
//!
//! ```
//! let scripts = [
//!     r#"(self.__next_f = self.__next_f || []).push([0])"#,
//!     r#"self.__next_f.push([1,"0:{\"b\":\"BUILDID\"}\n"])"#,
//! ];
//! let data = nextflight_core::decode_scripts(scripts).unwrap().unwrap();
//! assert_eq!(data.build_id(), Some("BUILDID"));
//! ```

pub mod decode;
pub mod element;
pub mod error;
pub mod extract;
pub mod query;
pub mod records;
pub mod resolve;
pub mod segment;

pub use decode::{decode_buffer, decode_scripts, decode_scripts_with, DecodeOptions, FlightData};
pub use element::{
    Data, DataContainer, DataParent, Element, ElementKind, EmptyData, ErrorDigest, HintPreload,
    HtmlElement, Module, RscPayload, RscPayloadVersion, SpecialData, Text, Unclassified, UrlQuery,
};
pub use error::{FlightError, Warning};
pub use extract::{has_flight_scripts, raw_push_tuples};
pub use query::{FindIter, Predicate};
pub use records::{tokenize, Record, RecordPayload};
pub use resolve::{is_page_node, resolve_type};
pub use segment::{reassemble, SegmentBuffer};
