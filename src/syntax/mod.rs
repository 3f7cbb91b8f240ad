//! Arena-backed T-SQL fragment tree
//!
//! The tree itself only points downward. Upward navigation goes through
//! [`ParentIndex`], built once per tree.

mod kinds;
mod location;
mod parent_index;

pub use kinds::*;
pub use location::{CodeLocation, CodeRegion};
pub use parent_index::{Ancestors, ParentIndex};

use std::fmt;

/// Stable handle of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fragment: kind tag, source region, and token range
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub region: CodeRegion,
    /// Index of the first token of this fragment in [`SyntaxTree::tokens`]
    pub first_token: usize,
    /// Index of the last token (inclusive)
    pub last_token: usize,
}

/// A token of the script with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptToken {
    pub text: String,
    pub region: CodeRegion,
}

/// Syntax tree for one script
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    tokens: Vec<ScriptToken>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn region(&self, id: NodeId) -> CodeRegion {
        self.nodes[id.index()].region
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tokens(&self) -> &[ScriptToken] {
        &self.tokens
    }

    /// Immediate children in child-slot order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// All descendants of `id` in pre-order, excluding `id` itself.
    ///
    /// When `prune` returns true for a node, that node is yielded but its
    /// subtree is not entered.
    pub fn descendants<F>(&self, id: NodeId, prune: F) -> Vec<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if prune(self.kind(current)) {
                continue;
            }
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    /// Every node reachable from the root in pre-order, root included.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = vec![self.root];
        out.extend(self.descendants(self.root, |_| false));
        out
    }

    /// Source text of a fragment, rebuilt from its tokens.
    pub fn text_of(&self, id: NodeId) -> String {
        let node = self.node(id);
        if self.tokens.is_empty() || node.first_token > node.last_token {
            return String::new();
        }
        let last = node.last_token.min(self.tokens.len() - 1);
        self.tokens[node.first_token..=last]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Deepest reachable fragment whose region contains `location`.
    pub fn innermost_node_at(&self, location: CodeLocation) -> Option<NodeId> {
        let mut current = self.root;
        if !self.region(current).is_around(location) {
            return None;
        }
        'descend: loop {
            for child in self.children(current) {
                if self.region(child).is_around(location) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

/// Incremental arena builder used by the fragment parser
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: NodeKind,
        region: CodeRegion,
        first_token: usize,
        last_token: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            region,
            first_token,
            last_token,
        });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn region(&self, id: NodeId) -> CodeRegion {
        self.nodes[id.index()].region
    }

    pub fn finish(self, root: NodeId, tokens: Vec<ScriptToken>) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
            tokens,
        }
    }
}
