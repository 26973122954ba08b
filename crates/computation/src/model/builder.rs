//! Builder API for tree-shaped element graphs.
//!
//! # Example
//!
//! ```rust
//! use computation::model::builder::{node, GraphBuilder};
//! use computation::model::{Definition, Element};
//!
//! let graph = GraphBuilder::new()
//!     .tree(node(
//!         Element::named("company"),
//!         [
//!             node(Element::new("sales", [Definition::new("revenue", 10.into())]), []),
//!             node(Element::new("support", [Definition::new("revenue", 2.into())]), []),
//!         ],
//!     ))
//!     .node(Element::named("archive"))
//!     .build();
//!
//! assert_eq!(graph.node_count(), 4);
//! assert_eq!(graph.edge_count(), 2);
//! ```

use std::hash::Hash;

use crate::model::DirectedGraph;

/// A value together with its child subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<N> {
    pub value: N,
    pub children: Vec<TreeNode<N>>,
}

/// Creates a tree node.
pub fn node<N>(value: N, children: impl IntoIterator<Item = TreeNode<N>>) -> TreeNode<N> {
    TreeNode {
        value,
        children: children.into_iter().collect(),
    }
}

/// Creates a tree node without children.
pub fn leaf<N>(value: N) -> TreeNode<N> {
    node(value, std::iter::empty())
}

/// Builder for a [`DirectedGraph`].
#[derive(Debug, Clone)]
pub struct GraphBuilder<N> {
    graph: DirectedGraph<N>,
}

impl<N: Clone + Eq + Hash> GraphBuilder<N> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            graph: DirectedGraph::new(),
        }
    }

    /// Adds a tree: every parent gets an edge to each of its children.
    ///
    /// A root without children becomes an isolated node. A child equal to
    /// its parent adds no edge, so the result never has self-loops.
    pub fn tree(mut self, root: TreeNode<N>) -> Self {
        self.graph.add_node(root.value.clone());
        let mut stack = vec![root];
        while let Some(TreeNode { value, children }) = stack.pop() {
            for child in children {
                if child.value != value {
                    self.graph.put_edge(value.clone(), child.value.clone());
                }
                stack.push(child);
            }
        }
        self
    }

    /// Adds a node without edges.
    pub fn node(mut self, value: N) -> Self {
        self.graph.add_node(value);
        self
    }

    /// Adds an edge, adding missing nodes.
    ///
    /// An edge from a node to itself only adds the node.
    pub fn edge(mut self, source: N, target: N) -> Self {
        if source == target {
            self.graph.add_node(source);
        } else {
            self.graph.put_edge(source, target);
        }
        self
    }

    /// Finishes the graph.
    pub fn build(self) -> DirectedGraph<N> {
        self.graph
    }
}

impl<N: Clone + Eq + Hash> Default for GraphBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
