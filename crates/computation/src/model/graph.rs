//! Directed graph of node values.
//!
//! An owned adjacency structure: nodes are stored once, in insertion order,
//! and edges are kept as successor/predecessor index sets. There are no edge
//! labels and at most one edge per ordered node pair. Equality is structural
//! (same node set, same edge relation) and ignores insertion order.

use std::collections::BTreeSet;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A directed graph without edge labels.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N> {
    nodes: Vec<N>,
    index: FxHashMap<N, usize>,
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
    edge_count: usize,
}

impl<N: Clone + Eq + Hash> DirectedGraph<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            edge_count: 0,
        }
    }

    /// Adds a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        self.insert(node);
        true
    }

    /// Adds the edge `source -> target`, adding either node if missing.
    ///
    /// Returns false if the edge was already present.
    pub fn put_edge(&mut self, source: N, target: N) -> bool {
        let s = self.index_or_insert(source);
        let t = self.index_or_insert(target);
        if !self.successors[s].insert(t) {
            return false;
        }
        self.predecessors[t].insert(s);
        self.edge_count += 1;
        true
    }

    /// Returns true if the node is in the graph.
    pub fn contains_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Returns true if the edge `source -> target` is in the graph.
    pub fn has_edge(&self, source: &N, target: &N) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => self.successors[s].contains(&t),
            _ => false,
        }
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &N> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the direct successors of `node` (empty if absent).
    pub fn successors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + use<'a, N> {
        self.adjacent(node, &self.successors)
    }

    /// Iterates over the direct predecessors of `node` (empty if absent).
    pub fn predecessors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + use<'a, N> {
        self.adjacent(node, &self.predecessors)
    }

    /// Number of edges ending at `node`.
    pub fn in_degree(&self, node: &N) -> usize {
        self.index
            .get(node)
            .map_or(0, |&i| self.predecessors[i].len())
    }

    /// Number of edges starting at `node`.
    pub fn out_degree(&self, node: &N) -> usize {
        self.index.get(node).map_or(0, |&i| self.successors[i].len())
    }

    /// Returns every edge exactly once.
    ///
    /// See [`DirectedGraph::edge_indices`] for the enumeration order.
    pub fn edges(&self) -> Vec<(&N, &N)> {
        self.edge_indices()
            .into_iter()
            .map(|(s, t)| (&self.nodes[s], &self.nodes[t]))
            .collect()
    }

    /// Returns every edge exactly once, as positions in [`DirectedGraph::nodes`] order.
    ///
    /// Edges are discovered by walking successors from every root (node
    /// with in-degree 0), then from any node not reached that way, which
    /// only happens for nodes on or behind a cycle. Each node is expanded
    /// once, so reconverging paths do not repeat edges.
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        let mut expanded = vec![false; self.nodes.len()];

        let roots = (0..self.nodes.len()).filter(|&i| self.predecessors[i].is_empty());
        for start in roots.chain(0..self.nodes.len()) {
            if expanded[start] {
                continue;
            }
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                if expanded[current] {
                    continue;
                }
                expanded[current] = true;
                for &next in &self.successors[current] {
                    edges.push((current, next));
                    if !expanded[next] {
                        stack.push(next);
                    }
                }
            }
        }
        edges
    }

    fn adjacent<'a>(
        &'a self,
        node: &N,
        sets: &'a [BTreeSet<usize>],
    ) -> impl Iterator<Item = &'a N> + use<'a, N> {
        self.index
            .get(node)
            .into_iter()
            .flat_map(move |&i| sets[i].iter().map(move |&j| &self.nodes[j]))
    }

    fn index_or_insert(&mut self, node: N) -> usize {
        match self.index.get(&node) {
            Some(&i) => i,
            None => self.insert(node),
        }
    }

    fn insert(&mut self, node: N) -> usize {
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        self.successors.push(BTreeSet::new());
        self.predecessors.push(BTreeSet::new());
        i
    }
}

impl<N: Clone + Eq + Hash> Default for DirectedGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash> PartialEq for DirectedGraph<N> {
    fn eq(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count != other.edge_count {
            return false;
        }
        if !self.nodes.iter().all(|n| other.contains_node(n)) {
            return false;
        }
        self.successors.iter().enumerate().all(|(s, targets)| {
            targets
                .iter()
                .all(|&t| other.has_edge(&self.nodes[s], &self.nodes[t]))
        })
    }
}

impl<N: Clone + Eq + Hash> Eq for DirectedGraph<N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_edge_adds_nodes_once() {
        let mut g = DirectedGraph::new();
        assert!(g.put_edge("a", "b"));
        assert!(!g.put_edge("a", "b"));
        assert!(!g.add_node("a"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge(&"a", &"b"));
        assert!(!g.has_edge(&"b", &"a"));
    }

    #[test]
    fn test_degrees_and_neighbours() {
        let mut g = DirectedGraph::new();
        g.put_edge(1, 2);
        g.put_edge(1, 3);
        g.put_edge(3, 2);
        assert_eq!(g.in_degree(&2), 2);
        assert_eq!(g.out_degree(&1), 2);
        assert_eq!(g.in_degree(&1), 0);
        assert_eq!(g.successors(&1).copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(g.predecessors(&2).copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(g.successors(&99).count(), 0);
    }

    #[test]
    fn test_isolated_nodes() {
        let mut g = DirectedGraph::new();
        g.add_node("lonely");
        g.put_edge("a", "b");
        assert!(g.contains_node(&"lonely"));
        assert_eq!(g.in_degree(&"lonely"), 0);
        assert_eq!(g.out_degree(&"lonely"), 0);
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = DirectedGraph::new();
        a.put_edge("x", "y");
        a.put_edge("y", "z");
        a.add_node("w");

        let mut b = DirectedGraph::new();
        b.add_node("w");
        b.add_node("z");
        b.put_edge("y", "z");
        b.put_edge("x", "y");
        assert_eq!(a, b);

        b.put_edge("z", "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_edges_in_diamond_listed_once() {
        let mut g = DirectedGraph::new();
        g.put_edge("top", "left");
        g.put_edge("top", "right");
        g.put_edge("left", "bottom");
        g.put_edge("right", "bottom");
        g.put_edge("bottom", "leaf");

        let edges = g.edges();
        assert_eq!(edges.len(), 5);
        let unique: std::collections::HashSet<_> = edges.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_edges_of_pure_cycle() {
        let mut g = DirectedGraph::new();
        g.put_edge(1, 2);
        g.put_edge(2, 3);
        g.put_edge(3, 1);
        assert_eq!(g.edges().len(), 3);
    }

    #[test]
    fn test_self_loop_is_allowed() {
        let mut g = DirectedGraph::new();
        assert!(g.put_edge(7, 7));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edges(), vec![(&7, &7)]);
    }
}
