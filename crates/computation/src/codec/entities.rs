//! Field encoders and decoders of each entity schema version.
//!
//! | Entity      | Writes | Reads | Fields                                              |
//! |-------------|--------|-------|-----------------------------------------------------|
//! | Definition  | 1      | 1     | `name`, `value`                                     |
//! | Element     | 1      | 1     | `name`, `definitions`                               |
//! | Structure   | 1      | 1     | `elements`                                          |
//! | Computation | 2      | 1, 2  | `structureId`, `elementName`, `expression` (v1),    |
//! |             |        |       | plus `status`, `result` (v2)                        |
//!
//! Decimals are stored as strings so no precision is lost.

use std::collections::BTreeSet;

use crate::codec::envelope::{EnvelopeCodec, IdentifiedEnvelopeCodec, ID_FIELD};
use crate::codec::graph::GraphCodec;
use crate::codec::value::{DecimalCodec, StringCodec};
use crate::codec::{Codec, CodecRegistry};
use crate::error::{DecodeError, EncodeError};
use crate::model::{
    Bson, Computation, ComputationId, Definition, Document, Element, EntityKind, Expression, Name,
    Status, Structure, StructureId,
};

/// Storage field names, shared with field projections.
pub mod fields {
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const DEFINITIONS: &str = "definitions";
    pub const ELEMENTS: &str = "elements";
    pub const STRUCTURE_ID: &str = "structureId";
    pub const ELEMENT_NAME: &str = "elementName";
    pub const EXPRESSION: &str = "expression";
    pub const STATUS: &str = "status";
    pub const RESULT: &str = "result";
}

pub const DEFINITION_VERSION: i32 = 1;
pub const ELEMENT_VERSION: i32 = 1;
pub const STRUCTURE_VERSION: i32 = 1;
pub const COMPUTATION_VERSION: i32 = 2;

const NAMES: StringCodec<Name> = StringCodec::new(fields::NAME);
const VALUES: DecimalCodec = DecimalCodec::new(fields::VALUE);
const RESULTS: DecimalCodec = DecimalCodec::new(fields::RESULT);

// =============================================================================
// Definition
// =============================================================================

pub fn definition_codec() -> EnvelopeCodec<Definition> {
    EnvelopeCodec::new(EntityKind::Definition, DEFINITION_VERSION, encode_definition)
        .decoder(1, decode_definition_v1)
}

fn encode_definition(
    definition: &Definition,
    doc: &mut Document,
    registry: &CodecRegistry,
) -> Result<(), EncodeError> {
    doc.insert(fields::NAME, NAMES.encode(&definition.name, registry)?);
    doc.insert(fields::VALUE, VALUES.encode(&definition.value, registry)?);
    Ok(())
}

fn decode_definition_v1(doc: &Document, registry: &CodecRegistry) -> Result<Definition, DecodeError> {
    Ok(Definition {
        name: NAMES.decode(doc.get_required(fields::NAME)?, registry)?,
        value: VALUES.decode(doc.get_required(fields::VALUE)?, registry)?,
    })
}

// =============================================================================
// Element
// =============================================================================

pub fn element_codec() -> EnvelopeCodec<Element> {
    EnvelopeCodec::new(EntityKind::Element, ELEMENT_VERSION, encode_element)
        .decoder(1, decode_element_v1)
}

fn encode_element(element: &Element, doc: &mut Document, registry: &CodecRegistry) -> Result<(), EncodeError> {
    let definitions = element
        .definitions
        .iter()
        .map(|d| registry.definition.encode(d, registry))
        .collect::<Result<Vec<_>, _>>()?;
    doc.insert(fields::NAME, NAMES.encode(&element.name, registry)?);
    doc.insert(fields::DEFINITIONS, definitions);
    Ok(())
}

fn decode_element_v1(doc: &Document, registry: &CodecRegistry) -> Result<Element, DecodeError> {
    let definitions: BTreeSet<Definition> = doc
        .get_array(fields::DEFINITIONS)?
        .iter()
        .map(|d| registry.definition.decode(d, registry))
        .collect::<Result<_, _>>()?;
    Ok(Element {
        name: NAMES.decode(doc.get_required(fields::NAME)?, registry)?,
        definitions,
    })
}

// =============================================================================
// Structure
// =============================================================================

pub fn structure_codec() -> IdentifiedEnvelopeCodec<Structure, StructureId> {
    IdentifiedEnvelopeCodec::new(
        EntityKind::Structure,
        STRUCTURE_VERSION,
        structure_id,
        Box::new(StringCodec::<StructureId>::new(ID_FIELD)),
        encode_structure,
    )
    .decoder(1, decode_structure_v1)
}

fn structure_id(structure: &Structure) -> &StructureId {
    &structure.id
}

fn encode_structure(
    structure: &Structure,
    doc: &mut Document,
    registry: &CodecRegistry,
) -> Result<(), EncodeError> {
    let graph = GraphCodec::new(&registry.element);
    doc.insert(fields::ELEMENTS, graph.encode(&structure.elements, registry)?);
    Ok(())
}

fn decode_structure_v1(
    id: StructureId,
    doc: &Document,
    registry: &CodecRegistry,
) -> Result<Structure, DecodeError> {
    let graph = GraphCodec::new(&registry.element);
    let elements = graph.decode(doc.get_required(fields::ELEMENTS)?, registry)?;
    Ok(Structure { id, elements })
}

// =============================================================================
// Computation
// =============================================================================

pub fn computation_codec() -> IdentifiedEnvelopeCodec<Computation, ComputationId> {
    IdentifiedEnvelopeCodec::new(
        EntityKind::Computation,
        COMPUTATION_VERSION,
        computation_id,
        Box::new(StringCodec::<ComputationId>::new(ID_FIELD)),
        encode_computation,
    )
    .decoder(1, decode_computation_v1)
    .decoder(2, decode_computation_v2)
}

fn computation_id(computation: &Computation) -> &ComputationId {
    &computation.id
}

fn encode_computation(
    computation: &Computation,
    doc: &mut Document,
    registry: &CodecRegistry,
) -> Result<(), EncodeError> {
    let result = match &computation.result {
        Some(value) => RESULTS.encode(value, registry)?,
        None => Bson::Null,
    };
    doc.insert(
        fields::STRUCTURE_ID,
        StringCodec::<StructureId>::new(fields::STRUCTURE_ID).encode(&computation.structure_id, registry)?,
    );
    doc.insert(
        fields::ELEMENT_NAME,
        NAMES.encode(&computation.element_name, registry)?,
    );
    doc.insert(
        fields::EXPRESSION,
        StringCodec::<Expression>::new(fields::EXPRESSION).encode(&computation.expression, registry)?,
    );
    doc.insert(fields::STATUS, computation.status.as_str());
    doc.insert(fields::RESULT, result);
    Ok(())
}

/// Version 1 stored no status or result.
fn decode_computation_v1(
    id: ComputationId,
    doc: &Document,
    registry: &CodecRegistry,
) -> Result<Computation, DecodeError> {
    Ok(Computation {
        id,
        structure_id: StringCodec::<StructureId>::new(fields::STRUCTURE_ID)
            .decode(doc.get_required(fields::STRUCTURE_ID)?, registry)?,
        element_name: StringCodec::<Name>::new(fields::ELEMENT_NAME)
            .decode(doc.get_required(fields::ELEMENT_NAME)?, registry)?,
        expression: StringCodec::<Expression>::new(fields::EXPRESSION)
            .decode(doc.get_required(fields::EXPRESSION)?, registry)?,
        status: Status::New,
        result: None,
    })
}

fn decode_computation_v2(
    id: ComputationId,
    doc: &Document,
    registry: &CodecRegistry,
) -> Result<Computation, DecodeError> {
    let status = doc.get_str(fields::STATUS)?;
    let status = status.parse().map_err(|_| DecodeError::InvalidStatus {
        value: status.to_string(),
    })?;
    let result = match doc.get_optional(fields::RESULT) {
        Some(value) => Some(RESULTS.decode(value, registry)?),
        None => None,
    };
    Ok(Computation {
        status,
        result,
        ..decode_computation_v1(id, doc, registry)?
    })
}
