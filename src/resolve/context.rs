//! Per-tree analysis state: parent index, active database, owning object

use std::path::Path;

use crate::parser::Script;
use crate::report::{Diagnostic, Reporter, RuleDefinition};
use crate::syntax::{CodeLocation, NodeId, NodeKind, ParentIndex, SyntaxTree};

/// Replays `USE` statements in source order.
///
/// Batch separators do not reset the active database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseContext {
    /// (start of the USE statement, database), sorted by location
    uses: Vec<(CodeLocation, String)>,
}

impl DatabaseContext {
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut uses: Vec<(CodeLocation, String)> = tree
            .walk()
            .into_iter()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::UseStatement { database } => {
                    Some((tree.region(id).begin, database.value.clone()))
                }
                _ => None,
            })
            .collect();
        uses.sort_by_key(|(location, _)| *location);
        Self { uses }
    }

    /// Database named by the last `USE` that starts before `location`.
    pub fn database_at(&self, location: CodeLocation) -> Option<&str> {
        let preceding = self.uses.partition_point(|(start, _)| *start < location);
        preceding
            .checked_sub(1)
            .map(|i| self.uses[i].1.as_str())
    }

    /// Database active where `node` starts.
    pub fn database_of(&self, tree: &SyntaxTree, node: NodeId) -> Option<&str> {
        self.database_at(tree.region(node).begin)
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty()
    }
}

/// Everything the resolvers need about one tree.
///
/// Built once per script and shared by every resolution in it.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    pub path: &'a Path,
    pub tree: &'a SyntaxTree,
    pub parents: ParentIndex,
    pub databases: DatabaseContext,
    pub default_schema: String,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(script: &'a Script, default_schema: &str) -> Self {
        Self::for_tree(&script.path, &script.tree, default_schema)
    }

    pub fn for_tree(path: &'a Path, tree: &'a SyntaxTree, default_schema: &str) -> Self {
        Self {
            path,
            tree,
            parents: ParentIndex::build(tree),
            databases: DatabaseContext::build(tree),
            default_schema: default_schema.to_string(),
        }
    }

    pub fn kind(&self, node: NodeId) -> &'a NodeKind {
        self.tree.kind(node)
    }

    pub fn database_of(&self, node: NodeId) -> Option<String> {
        self.databases
            .database_of(self.tree, node)
            .map(str::to_string)
    }

    /// `schema.name` of the procedure, function, view or trigger around `node`.
    pub fn owning_object(&self, node: NodeId) -> Option<String> {
        self.parents.ancestors_of(node).find_map(|ancestor| {
            let name = match self.kind(ancestor) {
                NodeKind::CreateProcedureStatement { name, .. }
                | NodeKind::CreateFunctionStatement { name, .. }
                | NodeKind::CreateViewStatement { name, .. }
                | NodeKind::CreateTriggerStatement { name, .. } => name,
                _ => return None,
            };
            Some(format!(
                "{}.{}",
                name.schema_or(&self.default_schema),
                name.base_name()
            ))
        })
    }

    /// Report `rule` at `node`.
    pub fn report(
        &self,
        reporter: &mut dyn Reporter,
        rule: &'static RuleDefinition,
        node: NodeId,
        args: Vec<String>,
    ) {
        reporter.report(Diagnostic {
            rule,
            database: self.database_of(node),
            path: self.path.to_path_buf(),
            owning_object: self.owning_object(node),
            region: self.tree.region(node),
            args,
        });
    }
}
