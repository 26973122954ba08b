//! Security limits and wire constants for document decoding.
//!
//! The decoder treats stored bytes as untrusted: every length read from the
//! wire is checked against one of these caps before anything is allocated.

/// Magic bytes for an uncompressed document.
pub const MAGIC_UNCOMPRESSED: &[u8; 4] = b"CDOC";

/// Magic bytes for a zstd-compressed document.
pub const MAGIC_COMPRESSED: &[u8; 5] = b"CDOCZ";

/// Current document wire format version.
pub const FORMAT_VERSION: u8 = 1;

/// Oldest document wire format version this crate still reads.
pub const MIN_FORMAT_VERSION: u8 = 1;

/// Maximum bytes in a varint (enough for a u64).
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum size of a single (uncompressed) document.
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum length of any string value or field name.
pub const MAX_STRING_LEN: usize = 1024 * 1024;

/// Maximum number of fields in one document.
pub const MAX_FIELDS: usize = 4096;

/// Maximum number of items in one array.
pub const MAX_ARRAY_LEN: usize = 1_000_000;

/// Maximum nesting depth of documents and arrays.
pub const MAX_DEPTH: usize = 64;
