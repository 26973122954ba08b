//! Data model types.
//!
//! This module contains the domain types of the computation service:
//! - Identifiers and names
//! - Decimals and arithmetic expressions
//! - Elements, structures and computations
//! - The directed graph backing a structure, and its builder
//! - Field documents, the stored representation of every entity

pub mod builder;
pub mod computation;
pub mod decimal;
pub mod document;
pub mod element;
pub mod expression;
pub mod graph;
pub mod id;
pub mod structure;

use std::fmt;

pub use builder::{leaf, node, GraphBuilder, TreeNode};
pub use computation::{Computation, Status};
pub use decimal::Decimal;
pub use document::{Bson, Document};
pub use element::{Definition, Element};
pub use expression::{Expression, Operator, ParsedExpression, Term};
pub use graph::DirectedGraph;
pub use id::{ComputationId, Name, StructureId};
pub use structure::Structure;

/// The kinds of entity with a registered envelope codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Definition,
    Element,
    Structure,
    Computation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Definition => "definition",
            EntityKind::Element => "element",
            EntityKind::Structure => "structure",
            EntityKind::Computation => "computation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
