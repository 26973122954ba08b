//! Binary wire format for documents.
//!
//! ```text
//! uncompressed := "CDOC" version:u8 document
//! compressed   := "CDOCZ" uncompressed_size:varint zstd(uncompressed)
//! document     := field_count:varint (name:string value)*
//! value        := tag:u8 payload
//! ```
//!
//! Integers are zigzag varints and strings are length-prefixed UTF-8 (see
//! [`super::primitives`]). Field order is preserved, so the same document
//! always encodes to the same bytes.

use std::io::Read;

use crate::codec::primitives::{Reader, Writer};
use crate::config::LimitsConfig;
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    FORMAT_VERSION, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED, MAX_ARRAY_LEN, MAX_DEPTH,
    MAX_DOCUMENT_SIZE, MAX_FIELDS, MAX_STRING_LEN, MIN_FORMAT_VERSION,
};
use crate::model::{Bson, Document};

/// Wire tag of a [`Bson`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueTag {
    Null = 0,
    Bool = 1,
    Int32 = 2,
    Int64 = 3,
    String = 4,
    Array = 5,
    Document = 6,
}

impl ValueTag {
    pub fn from_u8(v: u8) -> Option<ValueTag> {
        match v {
            0 => Some(ValueTag::Null),
            1 => Some(ValueTag::Bool),
            2 => Some(ValueTag::Int32),
            3 => Some(ValueTag::Int64),
            4 => Some(ValueTag::String),
            5 => Some(ValueTag::Array),
            6 => Some(ValueTag::Document),
            _ => None,
        }
    }

    fn of(value: &Bson) -> ValueTag {
        match value {
            Bson::Null => ValueTag::Null,
            Bson::Bool(_) => ValueTag::Bool,
            Bson::Int32(_) => ValueTag::Int32,
            Bson::Int64(_) => ValueTag::Int64,
            Bson::String(_) => ValueTag::String,
            Bson::Array(_) => ValueTag::Array,
            Bson::Document(_) => ValueTag::Document,
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a document with the default limits.
///
/// Accepts both compressed (`CDOCZ`) and uncompressed (`CDOC`) input.
pub fn decode_document(input: &[u8]) -> Result<Document, DecodeError> {
    decode_document_with_limits(input, &LimitsConfig::default())
}

/// Decodes a document, rejecting anything larger than `limits` allow.
pub fn decode_document_with_limits(
    input: &[u8],
    limits: &LimitsConfig,
) -> Result<Document, DecodeError> {
    if input.len() < 4 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }

    if input.starts_with(MAGIC_COMPRESSED) {
        let decompressed = decompress_zstd(&input[MAGIC_COMPRESSED.len()..], limits)?;
        decode_uncompressed(&decompressed, limits)
    } else {
        decode_uncompressed(input, limits)
    }
}

/// Strips the compression envelope from `CDOCZ` input, returning `CDOC` bytes.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.len() < MAGIC_COMPRESSED.len() {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }
    if !input.starts_with(MAGIC_COMPRESSED) {
        return Err(invalid_magic(input));
    }
    decompress_zstd(&input[MAGIC_COMPRESSED.len()..], &LimitsConfig::default())
}

/// Returns true if `input` carries the compressed magic.
pub fn is_compressed(input: &[u8]) -> bool {
    input.starts_with(MAGIC_COMPRESSED)
}

fn decode_uncompressed(input: &[u8], limits: &LimitsConfig) -> Result<Document, DecodeError> {
    if !input.starts_with(MAGIC_UNCOMPRESSED) {
        return Err(invalid_magic(input));
    }
    if input.len() > limits.max_document_size {
        return Err(DecodeError::LengthExceedsLimit {
            field: "document",
            len: input.len(),
            max: limits.max_document_size,
        });
    }

    let mut reader = Reader::new(&input[MAGIC_UNCOMPRESSED.len()..]);
    let version = reader.read_byte("version")?;
    if !(MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&version) {
        return Err(DecodeError::UnsupportedFormatVersion { version });
    }

    let document = DocumentReader { reader, limits }.read_root()?;
    Ok(document)
}

struct DocumentReader<'a, 'l> {
    reader: Reader<'a>,
    limits: &'l LimitsConfig,
}

impl DocumentReader<'_, '_> {
    fn read_root(mut self) -> Result<Document, DecodeError> {
        let document = self.read_document(0)?;
        if !self.reader.is_empty() {
            return Err(DecodeError::TrailingBytes {
                remaining: self.reader.remaining_len(),
            });
        }
        Ok(document)
    }

    fn read_document(&mut self, depth: usize) -> Result<Document, DecodeError> {
        let count = self.reader.read_length(MAX_FIELDS, "field_count")?;
        let mut document = Document::new();
        for _ in 0..count {
            let name = self
                .reader
                .read_string(self.limits.max_string_len, "field_name")?;
            let value = self.read_value(depth)?;
            document.insert(name, value);
        }
        Ok(document)
    }

    fn read_value(&mut self, depth: usize) -> Result<Bson, DecodeError> {
        let tag = self.reader.read_byte("value_tag")?;
        let tag = ValueTag::from_u8(tag).ok_or(DecodeError::InvalidValueTag { tag })?;
        let value = match tag {
            ValueTag::Null => Bson::Null,
            ValueTag::Bool => Bson::Bool(self.reader.read_bool("bool")?),
            ValueTag::Int32 => {
                let value = self.reader.read_signed_varint("int32")?;
                Bson::Int32(
                    i32::try_from(value).map_err(|_| DecodeError::Int32OutOfRange { value })?,
                )
            }
            ValueTag::Int64 => Bson::Int64(self.reader.read_signed_varint("int64")?),
            ValueTag::String => {
                Bson::String(self.reader.read_string(self.limits.max_string_len, "string")?)
            }
            ValueTag::Array => {
                let depth = self.descend(depth)?;
                let len = self
                    .reader
                    .read_length(self.limits.max_array_len, "array_len")?;
                // Every item takes at least one byte.
                let mut items = Vec::with_capacity(len.min(self.reader.remaining_len()));
                for _ in 0..len {
                    items.push(self.read_value(depth)?);
                }
                Bson::Array(items)
            }
            ValueTag::Document => {
                let depth = self.descend(depth)?;
                Bson::Document(self.read_document(depth)?)
            }
        };
        Ok(value)
    }

    fn descend(&self, depth: usize) -> Result<usize, DecodeError> {
        if depth >= self.limits.max_depth {
            return Err(DecodeError::NestingTooDeep {
                max: self.limits.max_depth,
            });
        }
        Ok(depth + 1)
    }
}

fn decompress_zstd(compressed: &[u8], limits: &LimitsConfig) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(compressed);
    let declared_size = reader.read_length(limits.max_document_size, "uncompressed_size")?;

    let decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // One byte past the declared size is enough to detect a lying header.
    let mut decompressed = Vec::with_capacity(declared_size);
    decoder
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }
    Ok(decompressed)
}

fn invalid_magic(input: &[u8]) -> DecodeError {
    let mut found = [0u8; 4];
    let n = input.len().min(4);
    found[..n].copy_from_slice(&input[..n]);
    DecodeError::InvalidMagic { found }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a document to uncompressed `CDOC` bytes with the default limits.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, EncodeError> {
    encode_document_with_limits(document, &LimitsConfig::default())
}

/// Encodes a document, rejecting anything [`decode_document_with_limits`]
/// would reject under the same `limits`.
///
/// The hard caps in [`crate::limits`] apply even when `limits` is looser.
pub fn encode_document_with_limits(
    document: &Document,
    limits: &LimitsConfig,
) -> Result<Vec<u8>, EncodeError> {
    let limits = EncodeLimits::new(limits);
    let mut writer = DocumentWriter {
        writer: Writer::with_capacity(256),
        limits: &limits,
    };
    writer.writer.write_bytes(MAGIC_UNCOMPRESSED);
    writer.writer.write_byte(FORMAT_VERSION);
    writer.write_document(document, 0)?;

    let bytes = writer.writer.into_bytes();
    check_len("document", bytes.len(), limits.max_document_size)?;
    Ok(bytes)
}

/// Encodes a document and compresses it with zstd at `level`.
pub fn encode_document_compressed(document: &Document, level: i32) -> Result<Vec<u8>, EncodeError> {
    encode_document_compressed_with_limits(document, level, &LimitsConfig::default())
}

/// Compressed variant of [`encode_document_with_limits`].
pub fn encode_document_compressed_with_limits(
    document: &Document,
    level: i32,
    limits: &LimitsConfig,
) -> Result<Vec<u8>, EncodeError> {
    let uncompressed = encode_document_with_limits(document, limits)?;

    let compressed = zstd::encode_all(uncompressed.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;

    let mut writer = Writer::with_capacity(MAGIC_COMPRESSED.len() + 10 + compressed.len());
    writer.write_bytes(MAGIC_COMPRESSED);
    writer.write_varint(uncompressed.len() as u64);
    writer.write_bytes(&compressed);
    Ok(writer.into_bytes())
}

/// Configured limits clamped to the hard caps.
struct EncodeLimits {
    max_document_size: usize,
    max_string_len: usize,
    max_array_len: usize,
    max_depth: usize,
}

impl EncodeLimits {
    fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_document_size: limits.max_document_size.min(MAX_DOCUMENT_SIZE),
            max_string_len: limits.max_string_len.min(MAX_STRING_LEN),
            max_array_len: limits.max_array_len.min(MAX_ARRAY_LEN),
            max_depth: limits.max_depth.min(MAX_DEPTH),
        }
    }
}

struct DocumentWriter<'l> {
    writer: Writer,
    limits: &'l EncodeLimits,
}

impl DocumentWriter<'_> {
    fn write_document(&mut self, document: &Document, depth: usize) -> Result<(), EncodeError> {
        check_len("field_count", document.len(), MAX_FIELDS)?;
        self.writer.write_varint(document.len() as u64);
        for (name, value) in document.iter() {
            check_len("field_name", name.len(), self.limits.max_string_len)?;
            self.writer.write_string(name);
            self.write_value(value, depth)?;
        }
        Ok(())
    }

    fn write_value(&mut self, value: &Bson, depth: usize) -> Result<(), EncodeError> {
        self.writer.write_byte(ValueTag::of(value) as u8);
        match value {
            Bson::Null => {}
            Bson::Bool(b) => self.writer.write_bool(*b),
            Bson::Int32(v) => self.writer.write_signed_varint(*v as i64),
            Bson::Int64(v) => self.writer.write_signed_varint(*v),
            Bson::String(s) => {
                check_len("string", s.len(), self.limits.max_string_len)?;
                self.writer.write_string(s);
            }
            Bson::Array(items) => {
                let depth = self.descend(depth)?;
                check_len("array_len", items.len(), self.limits.max_array_len)?;
                self.writer.write_varint(items.len() as u64);
                for item in items {
                    self.write_value(item, depth)?;
                }
            }
            Bson::Document(doc) => {
                let depth = self.descend(depth)?;
                self.write_document(doc, depth)?;
            }
        }
        Ok(())
    }

    fn descend(&self, depth: usize) -> Result<usize, EncodeError> {
        if depth >= self.limits.max_depth {
            return Err(EncodeError::NestingTooDeep {
                max: self.limits.max_depth,
            });
        }
        Ok(depth + 1)
    }
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::LengthExceedsLimit { field, len, max });
    }
    Ok(())
}
