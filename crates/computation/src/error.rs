//! Error types for document encoding/decoding, expressions and storage.

use thiserror::Error;

use crate::model::EntityKind;

/// Error during decoding of stored bytes or envelope documents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === Wire format ===
    #[error("invalid magic bytes: expected CDOC or CDOCZ, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported document format version: {version}")]
    UnsupportedFormatVersion { version: u8 },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("invalid value tag: {tag:#04x}")]
    InvalidValueTag { tag: u8 },

    #[error("int32 value {value} out of range")]
    Int32OutOfRange { value: i64 },

    #[error("document nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    #[error("{remaining} trailing bytes after document")]
    TrailingBytes { remaining: usize },

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },

    // === Envelope ===
    #[error("unsupported schema version {version} for {entity}")]
    UnsupportedSchemaVersion { entity: EntityKind, version: i32 },

    #[error("missing field {field}")]
    MissingField { field: &'static str },

    #[error("field {field} has type {found}, expected {expected}")]
    UnexpectedFieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{list} index {index} out of bounds (size: {size})")]
    IndexOutOfBounds {
        list: &'static str,
        index: i64,
        size: usize,
    },

    #[error("invalid decimal in {field}: {value:?}")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("invalid timestamp in {field}: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("invalid computation status: {value:?}")]
    InvalidStatus { value: String },
}

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("document nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    #[error("graph has {len} nodes, more than an int32 index can address")]
    IndexOverflow { len: usize },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}

/// Error while parsing a decimal literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    #[error("empty decimal literal")]
    Empty,

    #[error("invalid character {found:?} at position {position}")]
    InvalidCharacter { position: usize, found: char },

    #[error("decimal literal exceeds supported precision")]
    Overflow,
}

/// Error while parsing or evaluating an expression.
///
/// These never reach callers of [`crate::model::Expression::evaluate`];
/// they collapse to an absent result there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("invalid number {literal:?}: {source}")]
    InvalidNumber {
        literal: String,
        source: DecimalParseError,
    },

    #[error("expected {expected} at position {position}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("expected {expected} at end of expression")]
    UnexpectedEnd { expected: &'static str },

    #[error("unresolved variable {name:?}")]
    UnresolvedVariable { name: String },

    #[error("arithmetic overflow")]
    Overflow,
}

/// Error reported by a storage backend.
///
/// The core passes these through unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("stored document is unreadable: {0}")]
    Decode(#[from] DecodeError),

    #[error("document cannot be stored: {0}")]
    Encode(#[from] EncodeError),
}

/// Error returned by catalog operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
