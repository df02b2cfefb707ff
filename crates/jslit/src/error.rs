//! Literal-parser error type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsLitError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character `{found}` at byte {at}")]
    UnexpectedChar { found: char, at: usize },
    #[error("expected {what} at byte {at}")]
    Expected { what: &'static str, at: usize },
    #[error("invalid escape sequence at byte {at}")]
    InvalidEscape { at: usize },
    #[error("invalid number at byte {at}")]
    InvalidNumber { at: usize },
    #[error("unknown identifier `{name}` at byte {at}")]
    UnknownIdentifier { name: String, at: usize },
    #[error("excess data after value at byte {at}")]
    TrailingData { at: usize },
}
