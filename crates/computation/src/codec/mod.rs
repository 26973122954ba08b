//! Encoding and decoding.
//!
//! Entities become [`Document`](crate::model::Document)s through versioned
//! envelope codecs; documents become bytes through the binary document
//! format in [`document`].

pub mod document;
pub mod entities;
pub mod envelope;
pub mod graph;
pub mod primitives;
pub mod registry;
pub mod value;

pub use document::{
    decode_document, decode_document_with_limits, decompress, encode_document,
    encode_document_compressed, encode_document_compressed_with_limits,
    encode_document_with_limits, is_compressed,
};
pub use envelope::{EnvelopeCodec, EnvelopeHeader, IdentifiedEnvelopeCodec};
pub use graph::GraphCodec;
pub use primitives::{zigzag_decode, zigzag_encode, Reader, Writer};
pub use registry::{registry, CodecRegistry};
pub use value::{Codec, DecimalCodec, StringCodec};
