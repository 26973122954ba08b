//! Versioned entity envelopes.
//!
//! Every stored entity is a document tagged with the schema version it was
//! written with:
//!
//! ```text
//! identity-less:   { _version: int32, ...fields }
//! identity-bearing: { _id: <id>, _version: int32, _date: rfc3339, ...fields }
//! ```
//!
//! A codec writes with exactly one encoder (the current version) and reads
//! with a table of per-version decoders. A document whose version has no
//! decoder is rejected; there is no fallback to a neighbouring version.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::codec::{Codec, CodecRegistry};
use crate::error::{DecodeError, EncodeError};
use crate::model::document::mistyped;
use crate::model::{Bson, Document, EntityKind};
use crate::util::{format_datetime_rfc3339, now_epoch_micros, parse_datetime_rfc3339};

pub const ID_FIELD: &str = "_id";
pub const VERSION_FIELD: &str = "_version";
pub const DATE_FIELD: &str = "_date";

/// Writes the fields of the current schema version.
pub type FieldEncoder<T> = fn(&T, &mut Document, &CodecRegistry) -> Result<(), EncodeError>;

/// Reads the fields of one schema version.
pub type FieldDecoder<T> = fn(&Document, &CodecRegistry) -> Result<T, DecodeError>;

/// Reads the fields of one schema version, given the already decoded id.
pub type IdentifiedFieldDecoder<T, I> = fn(I, &Document, &CodecRegistry) -> Result<T, DecodeError>;

fn read_version(document: &Document) -> Result<i32, DecodeError> {
    document.get_i32(VERSION_FIELD)
}

fn unsupported(entity: EntityKind, version: i32) -> DecodeError {
    warn!(%entity, version, "no decoder registered for schema version");
    DecodeError::UnsupportedSchemaVersion { entity, version }
}

// =============================================================================
// Identity-less
// =============================================================================

/// Envelope codec for values without an identity of their own.
pub struct EnvelopeCodec<T> {
    entity: EntityKind,
    version: i32,
    encoder: FieldEncoder<T>,
    decoders: FxHashMap<i32, FieldDecoder<T>>,
}

impl<T> EnvelopeCodec<T> {
    /// Creates a codec writing `version` with `encoder`. The encoder's own
    /// version still needs a decoder registered through [`Self::decoder`].
    pub fn new(entity: EntityKind, version: i32, encoder: FieldEncoder<T>) -> Self {
        Self {
            entity,
            version,
            encoder,
            decoders: FxHashMap::default(),
        }
    }

    /// Registers the decoder for `version`.
    pub fn decoder(mut self, version: i32, decoder: FieldDecoder<T>) -> Self {
        self.decoders.insert(version, decoder);
        self
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// The version written by [`Self::encode_document`].
    pub fn version(&self) -> i32 {
        self.version
    }

    /// All versions this codec can read, ascending.
    pub fn supported_versions(&self) -> Vec<i32> {
        let mut versions: Vec<i32> = self.decoders.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    pub fn encode_document(&self, value: &T, registry: &CodecRegistry) -> Result<Document, EncodeError> {
        let mut document = Document::new();
        document.insert(VERSION_FIELD, self.version);
        (self.encoder)(value, &mut document, registry)?;
        Ok(document)
    }

    pub fn decode_document(&self, document: &Document, registry: &CodecRegistry) -> Result<T, DecodeError> {
        let version = read_version(document)?;
        let decoder = self
            .decoders
            .get(&version)
            .ok_or_else(|| unsupported(self.entity, version))?;
        decoder(document, registry)
    }
}

impl<T> Codec<T> for EnvelopeCodec<T> {
    fn encode(&self, value: &T, registry: &CodecRegistry) -> Result<Bson, EncodeError> {
        self.encode_document(value, registry).map(Bson::Document)
    }

    fn decode(&self, value: &Bson, registry: &CodecRegistry) -> Result<T, DecodeError> {
        let document = value
            .as_document()
            .ok_or_else(|| mistyped("envelope", "document", value))?;
        self.decode_document(document, registry)
    }
}

// =============================================================================
// Identity-bearing
// =============================================================================

/// The envelope fields of an identity-bearing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader<I> {
    pub id: I,
    pub version: i32,
    /// When the document was last encoded, in microseconds since the epoch.
    pub written_at: i64,
}

/// Envelope codec for entities that carry their own id.
///
/// `_date` records when the document was encoded, not when the entity was
/// created: every save refreshes it.
pub struct IdentifiedEnvelopeCodec<T, I> {
    entity: EntityKind,
    version: i32,
    id_of: fn(&T) -> &I,
    id_codec: Box<dyn Codec<I>>,
    encoder: FieldEncoder<T>,
    decoders: FxHashMap<i32, IdentifiedFieldDecoder<T, I>>,
}

impl<T, I> IdentifiedEnvelopeCodec<T, I> {
    pub fn new(
        entity: EntityKind,
        version: i32,
        id_of: fn(&T) -> &I,
        id_codec: Box<dyn Codec<I>>,
        encoder: FieldEncoder<T>,
    ) -> Self {
        Self {
            entity,
            version,
            id_of,
            id_codec,
            encoder,
            decoders: FxHashMap::default(),
        }
    }

    /// Registers the decoder for `version`.
    pub fn decoder(mut self, version: i32, decoder: IdentifiedFieldDecoder<T, I>) -> Self {
        self.decoders.insert(version, decoder);
        self
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn supported_versions(&self) -> Vec<i32> {
        let mut versions: Vec<i32> = self.decoders.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    /// Encodes `value`, stamping `_date` with the current time.
    pub fn encode_document(&self, value: &T, registry: &CodecRegistry) -> Result<Document, EncodeError> {
        self.encode_document_at(value, registry, now_epoch_micros())
    }

    /// Encodes `value`, stamping `_date` with `written_at` (epoch micros).
    pub fn encode_document_at(
        &self,
        value: &T,
        registry: &CodecRegistry,
        written_at: i64,
    ) -> Result<Document, EncodeError> {
        let mut document = Document::new();
        document.insert(ID_FIELD, self.id_codec.encode((self.id_of)(value), registry)?);
        document.insert(VERSION_FIELD, self.version);
        document.insert(DATE_FIELD, format_datetime_rfc3339(written_at, 0));
        (self.encoder)(value, &mut document, registry)?;
        Ok(document)
    }

    /// Reads `_id`, `_version` and `_date` without decoding the body.
    pub fn read_header(&self, document: &Document, registry: &CodecRegistry) -> Result<EnvelopeHeader<I>, DecodeError> {
        let id = self.id_codec.decode(document.get_required(ID_FIELD)?, registry)?;
        let version = read_version(document)?;
        let date = document.get_str(DATE_FIELD)?;
        let (written_at, _) =
            parse_datetime_rfc3339(date).map_err(|_| DecodeError::InvalidTimestamp {
                field: DATE_FIELD,
                value: date.to_string(),
            })?;
        Ok(EnvelopeHeader {
            id,
            version,
            written_at,
        })
    }

    pub fn decode_document(&self, document: &Document, registry: &CodecRegistry) -> Result<T, DecodeError> {
        let header = self.read_header(document, registry)?;
        let decoder = self
            .decoders
            .get(&header.version)
            .ok_or_else(|| unsupported(self.entity, header.version))?;
        decoder(header.id, document, registry)
    }
}

impl<T, I> Codec<T> for IdentifiedEnvelopeCodec<T, I> {
    fn encode(&self, value: &T, registry: &CodecRegistry) -> Result<Bson, EncodeError> {
        self.encode_document(value, registry).map(Bson::Document)
    }

    fn decode(&self, value: &Bson, registry: &CodecRegistry) -> Result<T, DecodeError> {
        let document = value
            .as_document()
            .ok_or_else(|| mistyped("envelope", "document", value))?;
        self.decode_document(document, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{registry, StringCodec};
    use crate::model::StructureId;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: StructureId,
        text: String,
    }

    fn note_id(note: &Note) -> &StructureId {
        &note.id
    }

    fn encode_v2(note: &Note, doc: &mut Document, _: &CodecRegistry) -> Result<(), EncodeError> {
        doc.insert("text", note.text.as_str());
        Ok(())
    }

    fn decode_v1(id: StructureId, doc: &Document, _: &CodecRegistry) -> Result<Note, DecodeError> {
        Ok(Note {
            id,
            text: doc.get_str("body")?.to_string(),
        })
    }

    fn decode_v2(id: StructureId, doc: &Document, _: &CodecRegistry) -> Result<Note, DecodeError> {
        Ok(Note {
            id,
            text: doc.get_str("text")?.to_string(),
        })
    }

    fn codec() -> IdentifiedEnvelopeCodec<Note, StructureId> {
        IdentifiedEnvelopeCodec::new(
            EntityKind::Structure,
            2,
            note_id,
            Box::new(StringCodec::<StructureId>::new(ID_FIELD)),
            encode_v2,
        )
        .decoder(1, decode_v1)
        .decoder(2, decode_v2)
    }

    fn note() -> Note {
        Note {
            id: StructureId::from("n-1"),
            text: "hello".to_string(),
        }
    }

    #[test]
    fn test_header_fields_come_first() {
        let doc = codec().encode_document_at(&note(), registry(), 0).unwrap();
        assert_eq!(
            doc.keys().collect::<Vec<_>>(),
            vec!["_id", "_version", "_date", "text"]
        );
        assert_eq!(doc.get_str("_date"), Ok("1970-01-01T00:00:00Z"));
        assert_eq!(doc.get_i32("_version"), Ok(2));
    }

    #[test]
    fn test_roundtrip_and_header() {
        let codec = codec();
        let doc = codec.encode_document_at(&note(), registry(), 1_000_000).unwrap();
        assert_eq!(codec.decode_document(&doc, registry()).unwrap(), note());

        let header = codec.read_header(&doc, registry()).unwrap();
        assert_eq!(header.id, StructureId::from("n-1"));
        assert_eq!(header.version, 2);
        assert_eq!(header.written_at, 1_000_000);
    }

    #[test]
    fn test_old_version_uses_its_own_decoder() {
        let mut doc = Document::new();
        doc.insert("_id", "n-1");
        doc.insert("_version", 1i32);
        doc.insert("_date", "2020-01-01T00:00:00Z");
        doc.insert("body", "hello");
        assert_eq!(codec().decode_document(&doc, registry()).unwrap(), note());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut doc = codec().encode_document(&note(), registry()).unwrap();
        doc.insert("_version", 3i32);
        assert_eq!(
            codec().decode_document(&doc, registry()),
            Err(DecodeError::UnsupportedSchemaVersion {
                entity: EntityKind::Structure,
                version: 3
            })
        );
    }

    #[test]
    fn test_bad_header_fields() {
        let mut doc = codec().encode_document(&note(), registry()).unwrap();
        doc.insert("_date", "soon");
        assert!(matches!(
            codec().decode_document(&doc, registry()),
            Err(DecodeError::InvalidTimestamp { field: "_date", .. })
        ));

        doc.remove("_version");
        assert_eq!(
            codec().decode_document(&doc, registry()),
            Err(DecodeError::MissingField { field: "_version" })
        );
    }

    #[test]
    fn test_identity_less_envelope() {
        fn encode(value: &i32, doc: &mut Document, _: &CodecRegistry) -> Result<(), EncodeError> {
            doc.insert("value", *value);
            Ok(())
        }
        fn decode(doc: &Document, _: &CodecRegistry) -> Result<i32, DecodeError> {
            doc.get_i32("value")
        }

        let codec = EnvelopeCodec::new(EntityKind::Definition, 1, encode).decoder(1, decode);
        let encoded = codec.encode(&7, registry()).unwrap();
        let doc = encoded.as_document().unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["_version", "value"]);
        assert_eq!(codec.decode(&encoded, registry()), Ok(7));
        assert_eq!(codec.supported_versions(), vec![1]);

        let mut future = doc.clone();
        future.insert("_version", 2i32);
        assert!(matches!(
            codec.decode_document(&future, registry()),
            Err(DecodeError::UnsupportedSchemaVersion { version: 2, .. })
        ));
    }
}
