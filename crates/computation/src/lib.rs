//! Versioned persistence and expression evaluation for hierarchical
//! structure models.
//!
//! A [`Structure`] is a directed graph of named [`Element`]s, each carrying
//! numeric [`Definition`]s. A [`Computation`] asks for an additive
//! [`Expression`] to be evaluated against one element of a structure.
//!
//! # Quick Start
//!
//! ```rust
//! use computation::{Catalog, Database, Definition, Element, StoreConfig, Structure, StructureId};
//! use computation::model::{leaf, node, GraphBuilder};
//!
//! let db = Database::in_memory(StoreConfig::default());
//! let catalog = Catalog::new(&db);
//!
//! let root = Element::new("plant", [Definition::new("capacity", "12.5".parse().unwrap())]);
//! let elements = GraphBuilder::new()
//!     .tree(node(root, [leaf(Element::named("line-1")), leaf(Element::named("line-2"))]))
//!     .build();
//!
//! let created = catalog
//!     .create_structure(&Structure::new(StructureId::new(), elements))
//!     .unwrap();
//! let loaded = catalog.get_structure(&created.id).unwrap().unwrap();
//! assert_eq!(loaded, created);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Entities, the directed graph, decimals and expressions
//! - [`codec`]: Versioned envelope codecs and the binary document format
//! - [`storage`]: The storage gateway seam and the in-memory backend
//! - [`service`]: Create/get/update/delete/list over a [`Database`]
//! - [`query`]: Field projections and list parameters
//! - [`config`]: Store configuration
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Schema Evolution
//!
//! Every stored entity carries `_version`. Writers always emit the current
//! version; readers dispatch on the stored one and reject versions they do
//! not know with [`DecodeError::UnsupportedSchemaVersion`].

pub mod codec;
pub mod config;
pub mod error;
pub mod limits;
pub mod model;
pub mod query;
pub mod service;
pub mod storage;
pub mod util;

pub use codec::{decode_document, encode_document, encode_document_compressed, registry, CodecRegistry};
pub use config::{CompressionConfig, LimitsConfig, StoreConfig};
pub use error::{
    DecimalParseError, DecodeError, EncodeError, ExpressionError, ServiceError, StorageError,
};
pub use model::{
    Bson, Computation, ComputationId, Decimal, Definition, DirectedGraph, Document, Element,
    EntityKind, Expression, Name, Status, Structure, StructureId,
};
pub use query::ListQuery;
pub use service::Catalog;
pub use storage::{Database, MemoryStore, StorageGateway};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
