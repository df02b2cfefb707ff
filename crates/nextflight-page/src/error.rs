//! Page-layer error type.

use nextflight_core::FlightError;
use nextflight_jslit::JsLitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid __NEXT_DATA__ JSON: {0}")]
    InvalidNextData(#[source] serde_json::Error),
    #[error("more than one __NEXT_DATA__ script in the document")]
    DuplicateNextData,
    #[error("invalid build manifest: {0}")]
    InvalidManifest(&'static str),
    #[error("invalid build manifest literal: {0}")]
    ManifestLiteral(#[from] JsLitError),
    #[error("static asset urls disagree on the base path")]
    MixedStaticRoots,
    #[error("url has no /_next/static/ segment: {0}")]
    MissingStaticPrefix(String),
    #[error(transparent)]
    Flight(#[from] FlightError),
}
