//! Acyclic graph over change values
//!
//! Each node holds one value; the same value may appear in several nodes,
//! one per point in time it was observed. An edge that would close a cycle
//! gets a fresh node for its target instead, so the graph stays a DAG and
//! traversals always terminate.

use std::collections::BTreeSet;

use crate::error::SyncError;

/// A node of a [`ChangeGraph`]
#[derive(Debug, Clone)]
pub struct Node<T> {
    index: usize,
    value: T,
    successors: BTreeSet<usize>,
    predecessors: BTreeSet<usize>,
}

impl<T> Node<T> {
    /// Position of the node in creation order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Indices of the nodes this node has edges to
    pub fn successors(&self) -> &BTreeSet<usize> {
        &self.successors
    }

    /// Indices of the nodes with edges to this node
    pub fn predecessors(&self) -> &BTreeSet<usize> {
        &self.predecessors
    }
}

/// Directed acyclic graph of values compared with a caller-supplied function
pub struct ChangeGraph<T, F = fn(&T, &T) -> bool> {
    nodes: Vec<Node<T>>,
    comparer: F,
}

impl<T: PartialEq> ChangeGraph<T> {
    /// Graph comparing values with `==`
    pub fn with_default_comparer() -> Self {
        Self::new(|a: &T, b: &T| a == b)
    }
}

impl<T, F> ChangeGraph<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    pub fn new(comparer: F) -> Self {
        Self {
            nodes: Vec::new(),
            comparer,
        }
    }

    /// Nodes in the order they were created
    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Node<T>> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a new node even if an equal value is already present
    pub fn add_node(&mut self, value: T) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            value,
            successors: BTreeSet::new(),
            predecessors: BTreeSet::new(),
        });
        index
    }

    pub fn add_nodes(&mut self, values: impl IntoIterator<Item = T>) {
        for value in values {
            self.add_node(value);
        }
    }

    /// Whether any node holds a value equal to `value`
    pub fn contains(&self, value: &T) -> bool {
        self.latest_index(value).is_some()
    }

    /// Index of the most recently added node holding `value`
    pub fn latest_index(&self, value: &T) -> Option<usize> {
        self.nodes
            .iter()
            .rposition(|node| (self.comparer)(&node.value, value))
    }

    /// Connects the newest node holding `from` to a node holding `to`
    ///
    /// The newest node holding `to` is reused unless the edge would close a
    /// cycle; then a new node is created for `to`.
    ///
    /// # Errors
    /// [`SyncError::Graph`] if no node holds `from`.
    pub fn add_edge(&mut self, from: &T, to: T) -> Result<usize, SyncError> {
        let from_index = self.latest_index(from).ok_or_else(|| {
            SyncError::Graph("edge source is not part of the graph".to_string())
        })?;

        let to_index = match self.latest_index(&to) {
            Some(index) if index != from_index && !self.reaches(index, from_index) => index,
            _ => self.add_node(to),
        };

        self.nodes[from_index].successors.insert(to_index);
        self.nodes[to_index].predecessors.insert(from_index);
        Ok(to_index)
    }

    /// Nodes without predecessors
    pub fn sources(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter().filter(|node| node.predecessors.is_empty())
    }

    /// Nodes without successors
    pub fn sinks(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter().filter(|node| node.successors.is_empty())
    }

    /// Whether `target` is reachable from `start` along edges
    fn reaches(&self, start: usize, target: usize) -> bool {
        let mut stack = vec![start];
        let mut seen = BTreeSet::new();
        while let Some(index) = stack.pop() {
            if index == target {
                return true;
            }
            if seen.insert(index) {
                stack.extend(self.nodes[index].successors.iter().copied());
            }
        }
        false
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for ChangeGraph<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeGraph")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
