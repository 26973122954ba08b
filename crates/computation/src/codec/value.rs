//! The value codec seam and the scalar codecs.
//!
//! A [`Codec<T>`] maps one `T` to one [`Bson`] value and back. Graph nodes,
//! ids and nested entities are all encoded through this trait, with the
//! [`CodecRegistry`] passed along so composite codecs can reach the codecs
//! of their parts.

use std::marker::PhantomData;

use crate::codec::CodecRegistry;
use crate::error::{DecodeError, EncodeError};
use crate::model::document::mistyped;
use crate::model::{Bson, Decimal};

/// Conversion between a value and its document representation.
///
/// Implementations used as graph node codecs must be injective over the
/// values of any one graph.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T, registry: &CodecRegistry) -> Result<Bson, EncodeError>;

    fn decode(&self, value: &Bson, registry: &CodecRegistry) -> Result<T, DecodeError>;
}

/// Encodes string newtypes (ids, names, expressions) as plain strings.
pub struct StringCodec<T> {
    field: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StringCodec<T> {
    /// `field` names the value in decode errors.
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }
}

impl<T: AsRef<str> + From<String>> Codec<T> for StringCodec<T> {
    fn encode(&self, value: &T, _: &CodecRegistry) -> Result<Bson, EncodeError> {
        Ok(Bson::String(value.as_ref().to_string()))
    }

    fn decode(&self, value: &Bson, _: &CodecRegistry) -> Result<T, DecodeError> {
        value
            .as_str()
            .map(|s| T::from(s.to_string()))
            .ok_or_else(|| mistyped(self.field, "string", value))
    }
}

/// Encodes decimals as their plain-notation string, which is exact.
pub struct DecimalCodec {
    field: &'static str,
}

impl DecimalCodec {
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl Codec<Decimal> for DecimalCodec {
    fn encode(&self, value: &Decimal, _: &CodecRegistry) -> Result<Bson, EncodeError> {
        Ok(Bson::String(value.to_string()))
    }

    fn decode(&self, value: &Bson, _: &CodecRegistry) -> Result<Decimal, DecodeError> {
        let text = value
            .as_str()
            .ok_or_else(|| mistyped(self.field, "string", value))?;
        text.parse().map_err(|_| DecodeError::InvalidDecimal {
            field: self.field,
            value: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::registry;
    use crate::model::{Name, StructureId};

    #[test]
    fn test_string_codec() {
        let codec = StringCodec::<StructureId>::new("_id");
        let id = StructureId::from("s-1");
        let encoded = codec.encode(&id, registry()).unwrap();
        assert_eq!(encoded, Bson::String("s-1".to_string()));
        assert_eq!(codec.decode(&encoded, registry()).unwrap(), id);
        assert_eq!(
            codec.decode(&Bson::Int32(1), registry()),
            Err(DecodeError::UnexpectedFieldType {
                field: "_id",
                expected: "string",
                found: "int32"
            })
        );
    }

    #[test]
    fn test_empty_string_survives() {
        let codec = StringCodec::<Name>::new("name");
        let encoded = codec.encode(&Name::default(), registry()).unwrap();
        assert_eq!(codec.decode(&encoded, registry()).unwrap(), Name::default());
    }

    #[test]
    fn test_decimal_codec_is_exact() {
        let codec = DecimalCodec::new("value");
        let value: Decimal = "12345678901234567890.123456789".parse().unwrap();
        let encoded = codec.encode(&value, registry()).unwrap();
        assert_eq!(encoded.as_str(), Some("12345678901234567890.123456789"));
        assert_eq!(codec.decode(&encoded, registry()).unwrap(), value);
        assert!(matches!(
            codec.decode(&Bson::from("1.2.3"), registry()),
            Err(DecodeError::InvalidDecimal { field: "value", .. })
        ));
    }

    #[test]
    fn test_decimal_codec_large_exponent() {
        let codec = DecimalCodec::new("value");
        for text in ["1e2000000", "-4.2e-1999999"] {
            let value: Decimal = text.parse().unwrap();
            let encoded = codec.encode(&value, registry()).unwrap();
            assert!(encoded.as_str().unwrap().len() < 32);
            assert_eq!(codec.decode(&encoded, registry()).unwrap(), value);
        }
    }
}
