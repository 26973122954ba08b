//! Structures: stored hierarchies of elements.

use crate::model::{DirectedGraph, Element, StructureId};

/// A stored directed graph of elements.
///
/// The graph may contain isolated elements as well as multi-level
/// hierarchies. A structure owns its graph, so values produced by
/// [`Structure::with_id`] share no mutable state with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub id: StructureId,
    pub elements: DirectedGraph<Element>,
}

impl Structure {
    /// Creates a structure.
    pub fn new(id: StructureId, elements: DirectedGraph<Element>) -> Self {
        Self { id, elements }
    }

    /// Creates a structure with a fresh id and no elements.
    pub fn empty() -> Self {
        Self::new(StructureId::new(), DirectedGraph::new())
    }

    /// Returns a copy of this structure carrying `id`.
    pub fn with_id(&self, id: StructureId) -> Self {
        Self {
            id,
            elements: self.elements.clone(),
        }
    }

    /// Finds an element by name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.nodes().find(|e| e.name.as_str() == name)
    }

    /// Elements without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .nodes()
            .filter(|e| self.elements.in_degree(e) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_id_copies_graph() {
        let mut elements = DirectedGraph::new();
        elements.put_edge(Element::named("root"), Element::named("child"));
        let original = Structure::new(StructureId::from("a"), elements);

        let mut copy = original.with_id(StructureId::from("b"));
        copy.elements.add_node(Element::named("extra"));

        assert_eq!(original.elements.node_count(), 2);
        assert_eq!(copy.elements.node_count(), 3);
        assert_eq!(copy.id.as_str(), "b");
    }

    #[test]
    fn test_lookup_and_roots() {
        let mut elements = DirectedGraph::new();
        elements.put_edge(Element::named("root"), Element::named("child"));
        elements.add_node(Element::named("alone"));
        let structure = Structure::new(StructureId::new(), elements);

        assert!(structure.element("child").is_some());
        assert!(structure.element("missing").is_none());
        let mut roots: Vec<_> = structure.roots().map(|e| e.name.as_str()).collect();
        roots.sort();
        assert_eq!(roots, vec!["alone", "root"]);
    }
}
