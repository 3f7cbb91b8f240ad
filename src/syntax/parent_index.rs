//! Child-to-parent index over a syntax tree

use std::collections::{HashMap, HashSet};

use super::{NodeId, SyntaxTree};

/// Reverse map from every reachable node to its immediate parent.
///
/// Built once per tree in a single traversal. Lookups for nodes the build
/// never reached return `None`, which callers treat as "cannot resolve".
#[derive(Debug, Clone)]
pub struct ParentIndex {
    root: NodeId,
    parents: HashMap<NodeId, NodeId>,
}

impl ParentIndex {
    pub fn build(tree: &SyntaxTree) -> Self {
        let root = tree.root();
        let mut parents = HashMap::with_capacity(tree.len());
        let mut visited = HashSet::with_capacity(tree.len());
        visited.insert(root);

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for child in tree.children(node) {
                // A child slot may repeat a handle; the first parent wins.
                if visited.insert(child) {
                    parents.insert(child, node);
                    stack.push(child);
                }
            }
        }

        Self { root, parents }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Whether the node was reached during the build traversal.
    pub fn contains(&self, node: NodeId) -> bool {
        node == self.root || self.parents.contains_key(&node)
    }

    /// Ancestors of `node`, nearest first, ending at the root.
    pub fn ancestors_of(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            current: Some(node),
        }
    }

    /// Whether `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_self_or_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors_of(node).any(|a| a == ancestor)
    }
}

/// Lazy walk up the parent chain
pub struct Ancestors<'a> {
    index: &'a ParentIndex,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let parent = self.index.parent_of(self.current?);
        self.current = parent;
        parent
    }
}
