//! The process-wide codec table.
//!
//! Built once on first use and read-only afterwards, so it can be shared
//! across threads without locking.

use lazy_static::lazy_static;
use tracing::trace;

use crate::codec::entities::{computation_codec, definition_codec, element_codec, structure_codec};
use crate::codec::envelope::{EnvelopeCodec, IdentifiedEnvelopeCodec};
use crate::model::{
    Computation, ComputationId, Definition, Element, EntityKind, Structure, StructureId,
};

/// Envelope codecs of every entity kind.
pub struct CodecRegistry {
    pub definition: EnvelopeCodec<Definition>,
    pub element: EnvelopeCodec<Element>,
    pub structure: IdentifiedEnvelopeCodec<Structure, StructureId>,
    pub computation: IdentifiedEnvelopeCodec<Computation, ComputationId>,
}

impl CodecRegistry {
    /// Builds the table with every known schema version registered.
    pub fn new() -> Self {
        let registry = Self {
            definition: definition_codec(),
            element: element_codec(),
            structure: structure_codec(),
            computation: computation_codec(),
        };
        for kind in [
            EntityKind::Definition,
            EntityKind::Element,
            EntityKind::Structure,
            EntityKind::Computation,
        ] {
            trace!(
                entity = %kind,
                writes = registry.current_version(kind),
                reads = ?registry.supported_versions(kind),
                "registered envelope codec"
            );
        }
        registry
    }

    /// The schema version written for `kind`.
    pub fn current_version(&self, kind: EntityKind) -> i32 {
        match kind {
            EntityKind::Definition => self.definition.version(),
            EntityKind::Element => self.element.version(),
            EntityKind::Structure => self.structure.version(),
            EntityKind::Computation => self.computation.version(),
        }
    }

    /// The schema versions readable for `kind`, ascending.
    pub fn supported_versions(&self, kind: EntityKind) -> Vec<i32> {
        match kind {
            EntityKind::Definition => self.definition.supported_versions(),
            EntityKind::Element => self.element.supported_versions(),
            EntityKind::Structure => self.structure.supported_versions(),
            EntityKind::Computation => self.computation.supported_versions(),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref REGISTRY: CodecRegistry = CodecRegistry::new();
}

/// The shared registry.
pub fn registry() -> &'static CodecRegistry {
    &REGISTRY
}
