//! Graph codec: a directed graph as a node list plus edge index pairs.
//!
//! ```text
//! { nodes: [<node>, ...], edges: [{ source: int32, target: int32 }, ...] }
//! ```
//!
//! `source` and `target` are positions in `nodes`. Node values go through
//! the node codec the graph codec was built with. Round trips preserve the
//! node set and the edge relation as long as that codec is injective over
//! the graph's nodes; a non-injective codec collapses nodes on decode and
//! is not detected.

use std::hash::Hash;

use crate::codec::{Codec, CodecRegistry};
use crate::error::{DecodeError, EncodeError};
use crate::model::document::mistyped;
use crate::model::{Bson, DirectedGraph, Document};

pub const NODES_FIELD: &str = "nodes";
pub const EDGES_FIELD: &str = "edges";
pub const SOURCE_FIELD: &str = "source";
pub const TARGET_FIELD: &str = "target";

/// Codec for [`DirectedGraph<N>`] built on a node codec.
pub struct GraphCodec<'a, N> {
    node_codec: &'a dyn Codec<N>,
}

impl<'a, N> GraphCodec<'a, N> {
    pub fn new(node_codec: &'a dyn Codec<N>) -> Self {
        Self { node_codec }
    }
}

impl<N: Clone + Eq + Hash> Codec<DirectedGraph<N>> for GraphCodec<'_, N> {
    fn encode(&self, graph: &DirectedGraph<N>, registry: &CodecRegistry) -> Result<Bson, EncodeError> {
        if graph.node_count() > i32::MAX as usize {
            return Err(EncodeError::IndexOverflow {
                len: graph.node_count(),
            });
        }

        let nodes = graph
            .nodes()
            .map(|node| self.node_codec.encode(node, registry))
            .collect::<Result<Vec<_>, _>>()?;

        // Positions fit in i32, checked above.
        let edges = graph
            .edge_indices()
            .into_iter()
            .map(|(source, target)| {
                let mut edge = Document::new();
                edge.insert(SOURCE_FIELD, source as i32);
                edge.insert(TARGET_FIELD, target as i32);
                Bson::Document(edge)
            })
            .collect::<Vec<_>>();

        let mut document = Document::new();
        document.insert(NODES_FIELD, nodes);
        document.insert(EDGES_FIELD, edges);
        Ok(Bson::Document(document))
    }

    fn decode(&self, value: &Bson, registry: &CodecRegistry) -> Result<DirectedGraph<N>, DecodeError> {
        let document = value
            .as_document()
            .ok_or_else(|| mistyped("graph", "document", value))?;

        let nodes = document
            .get_array(NODES_FIELD)?
            .iter()
            .map(|node| self.node_codec.decode(node, registry))
            .collect::<Result<Vec<N>, _>>()?;

        let mut graph = DirectedGraph::new();
        for node in &nodes {
            graph.add_node(node.clone());
        }

        for edge in document.get_array(EDGES_FIELD)? {
            let edge = edge
                .as_document()
                .ok_or_else(|| mistyped(EDGES_FIELD, "document", edge))?;
            let source = node_at(&nodes, edge.get_i32(SOURCE_FIELD)?)?;
            let target = node_at(&nodes, edge.get_i32(TARGET_FIELD)?)?;
            graph.put_edge(source.clone(), target.clone());
        }

        Ok(graph)
    }
}

fn node_at<N>(nodes: &[N], index: i32) -> Result<&N, DecodeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| nodes.get(i))
        .ok_or(DecodeError::IndexOutOfBounds {
            list: NODES_FIELD,
            index: index as i64,
            size: nodes.len(),
        })
}
