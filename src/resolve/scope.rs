//! Lexical scopes: the table sources and CTE names visible at a node
//!
//! A scope is introduced by a join, a FROM clause, an UPDATE/DELETE
//! specification or a MERGE specification. Resolvers walk outward from a
//! reference and consult each enclosing scope, innermost first.

use std::collections::HashSet;

use super::context::AnalysisContext;
use super::references::{SourceKind, TableOrViewReference};
use crate::syntax::{Identifier, NodeId, NodeKind, SchemaObjectName};
use crate::util::{ci_key, eq_ci_if_present};

/// One table source bound in a scope
#[derive(Debug, Clone, Copy)]
pub struct ScopeEntry<'t> {
    pub node: NodeId,
    /// Object name for named table references; `None` for derived tables,
    /// table variables and table-valued functions
    pub name: Option<&'t SchemaObjectName>,
    /// Effective alias, see [`effective_alias`]
    pub alias: Option<&'t Identifier>,
    /// Whether the source is a member of a join
    pub in_join: bool,
}

impl<'t> ScopeEntry<'t> {
    fn of(ctx: &AnalysisContext<'t>, node: NodeId, in_join: bool) -> Option<Self> {
        let name = match ctx.kind(node) {
            NodeKind::NamedTableReference { name, .. } => Some(name),
            NodeKind::VariableTableReference { .. }
            | NodeKind::FunctionTableReference { .. }
            | NodeKind::QueryDerivedTable { .. } => None,
            _ => return None,
        };
        Some(Self {
            node,
            name,
            alias: effective_alias(ctx, node),
            in_join,
        })
    }

    /// Identity of a named source; `None` for other sources.
    pub fn identity(&self, ctx: &AnalysisContext<'t>) -> Option<TableOrViewReference> {
        let name = self.name?;
        let kind = classify(ctx, self.node, name);
        Some(TableOrViewReference {
            database: name
                .database_name()
                .map(str::to_string)
                .or_else(|| ctx.database_of(self.node)),
            schema: name.schema_or(&ctx.default_schema).to_string(),
            name: name.base_name().to_string(),
            kind,
            node: self.node,
            owning_object: ctx.owning_object(self.node),
        })
    }
}

/// Table sources of one scope, in source order
#[derive(Debug, Clone, Default)]
pub struct Scope<'t> {
    pub entries: Vec<ScopeEntry<'t>>,
    /// UPDATE/DELETE target, consulted only after the FROM entries
    pub fallback: Option<ScopeEntry<'t>>,
}

impl<'t> Scope<'t> {
    /// Sources of a join tree, left to right.
    pub fn for_join(ctx: &AnalysisContext<'t>, join: NodeId) -> Self {
        let mut scope = Self::default();
        scope.push_source(ctx, join, false);
        scope
    }

    pub fn for_from(ctx: &AnalysisContext<'t>, from: NodeId) -> Self {
        let mut scope = Self::default();
        if let NodeKind::FromClause { table_sources } = ctx.kind(from) {
            for source in table_sources {
                scope.push_source(ctx, *source, false);
            }
        }
        scope
    }

    /// FROM sources of an UPDATE or DELETE, with the target as fallback.
    pub fn for_dml(ctx: &AnalysisContext<'t>, specification: NodeId) -> Self {
        let (target, from) = match ctx.kind(specification) {
            NodeKind::UpdateSpecification { target, from, .. }
            | NodeKind::DeleteSpecification { target, from, .. } => (*target, *from),
            _ => return Self::default(),
        };
        let mut scope = from.map(|f| Self::for_from(ctx, f)).unwrap_or_default();
        scope.fallback = ScopeEntry::of(ctx, target, false);
        scope
    }

    /// MERGE source first, then the target.
    pub fn for_merge(ctx: &AnalysisContext<'t>, specification: NodeId) -> Self {
        let mut scope = Self::default();
        if let NodeKind::MergeSpecification { target, source, .. } = ctx.kind(specification) {
            scope.push_source(ctx, *source, false);
            scope.push_source(ctx, *target, false);
        }
        scope
    }

    fn push_source(&mut self, ctx: &AnalysisContext<'t>, node: NodeId, in_join: bool) {
        match ctx.kind(node) {
            NodeKind::QualifiedJoin { first, second, .. }
            | NodeKind::UnqualifiedJoin { first, second, .. } => {
                self.push_source(ctx, *first, true);
                self.push_source(ctx, *second, true);
            }
            _ => {
                if let Some(entry) = ScopeEntry::of(ctx, node, in_join) {
                    self.entries.push(entry);
                }
            }
        }
    }

    /// Entries an unqualified column could belong to: the FROM sources, or
    /// the fallback target when there is no FROM.
    pub fn candidates(&self) -> Vec<ScopeEntry<'t>> {
        if self.entries.is_empty() {
            self.fallback.into_iter().collect()
        } else {
            self.entries.clone()
        }
    }

    /// First named join member written without an alias.
    pub fn unaliased_join_member(&self) -> Option<(&ScopeEntry<'t>, &'t SchemaObjectName)> {
        self.entries.iter().find_map(|entry| match entry.name {
            Some(name) if entry.in_join && entry.alias.is_none() => Some((entry, name)),
            _ => None,
        })
    }

    /// Entries followed by the fallback.
    pub fn all_entries(&self) -> impl Iterator<Item = &ScopeEntry<'t>> {
        self.entries.iter().chain(self.fallback.as_ref())
    }
}

/// Alias of a table reference. A MERGE target without its own alias takes
/// the statement-level alias of its merge specification.
pub fn effective_alias<'t>(ctx: &AnalysisContext<'t>, node: NodeId) -> Option<&'t Identifier> {
    let own = match ctx.kind(node) {
        NodeKind::NamedTableReference { alias, .. }
        | NodeKind::VariableTableReference { alias, .. }
        | NodeKind::FunctionTableReference { alias, .. }
        | NodeKind::QueryDerivedTable { alias, .. } => alias.as_ref(),
        _ => None,
    };
    own.or_else(|| {
        let parent = ctx.parents.parent_of(node)?;
        match ctx.kind(parent) {
            NodeKind::MergeSpecification {
                target,
                table_alias,
                ..
            } if *target == node => table_alias.as_ref(),
            _ => None,
        }
    })
}

/// CTE names visible at a node
#[derive(Debug, Clone, Default)]
pub struct CteScope {
    names: HashSet<String>,
}

impl CteScope {
    /// CTEs of every enclosing statement. Inside a CTE body only that CTE
    /// and the ones declared before it are visible.
    pub fn visible_at(ctx: &AnalysisContext<'_>, node: NodeId) -> Self {
        let mut names = HashSet::new();
        let mut child = node;
        for ancestor in ctx.parents.ancestors_of(node) {
            if let Some(ctes) = ctx.kind(ancestor).ctes() {
                let visible = match ctes.iter().position(|cte| *cte == child) {
                    Some(i) => &ctes[..=i],
                    None => ctes,
                };
                for cte in visible {
                    if let NodeKind::CommonTableExpression { name, .. } = ctx.kind(*cte) {
                        names.insert(ci_key(&name.value));
                    }
                }
            }
            child = ancestor;
        }
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&ci_key(name))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Source kind of a named reference at `node`.
pub fn classify(ctx: &AnalysisContext<'_>, node: NodeId, name: &SchemaObjectName) -> SourceKind {
    if name.schema.is_none()
        && name.database.is_none()
        && CteScope::visible_at(ctx, node).contains(name.base_name())
    {
        SourceKind::Cte
    } else if name.is_temp_table() {
        SourceKind::TempTable
    } else {
        SourceKind::TableOrView
    }
}

/// Three-part name equality with the default schema filled in. The
/// database part is compared only when both names carry one.
pub fn names_match(left: &SchemaObjectName, right: &SchemaObjectName, default_schema: &str) -> bool {
    left.base.matches(right.base_name())
        && left
            .schema_or(default_schema)
            .eq_ignore_ascii_case(right.schema_or(default_schema))
        && eq_ci_if_present(left.database_name(), right.database_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sql;

    fn find(ctx: &AnalysisContext<'_>, kind: &str) -> Vec<NodeId> {
        ctx.tree
            .walk()
            .into_iter()
            .filter(|id| ctx.kind(*id).name() == kind)
            .collect()
    }

    #[test]
    fn test_join_scope_flattens_left_to_right() {
        let script = parse_sql(
            "s.sql",
            "SELECT 1 FROM A a JOIN B b ON a.x = b.x CROSS JOIN (SELECT 1 AS y) d",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let from = find(&ctx, "FromClause")[0];
        let scope = Scope::for_from(&ctx, from);
        let aliases: Vec<_> = scope
            .entries
            .iter()
            .map(|e| e.alias.map(|a| a.value.as_str()))
            .collect();
        assert_eq!(aliases, vec![Some("a"), Some("b"), Some("d")]);
        assert!(scope.entries.iter().all(|e| e.in_join));
        assert!(scope.entries[2].name.is_none());
    }

    #[test]
    fn test_merge_target_takes_statement_alias() {
        let script = parse_sql(
            "m.sql",
            "MERGE dbo.Target AS t USING dbo.Source AS s ON t.Id = s.Id \
             WHEN MATCHED THEN DELETE;",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let merge = find(&ctx, "MergeSpecification")[0];
        let scope = Scope::for_merge(&ctx, merge);
        assert_eq!(scope.entries.len(), 2);
        assert_eq!(scope.entries[1].alias.map(|a| a.value.as_str()), Some("t"));
        assert_eq!(
            scope.entries[1].name.map(|n| n.base_name()),
            Some("Target")
        );
    }

    #[test]
    fn test_cte_visibility_is_up_and_to_the_left() {
        let script = parse_sql(
            "c.sql",
            "WITH A AS (SELECT 1 AS x FROM T), B AS (SELECT x FROM A) SELECT * FROM B",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let tables = find(&ctx, "NamedTableReference");
        let in_first = CteScope::visible_at(&ctx, tables[0]);
        assert!(in_first.contains("a"));
        assert!(!in_first.contains("B"));
        let outer = CteScope::visible_at(&ctx, tables[2]);
        assert!(outer.contains("A") && outer.contains("b"));
    }

    #[test]
    fn test_names_match_defaults_schema() {
        let short = SchemaObjectName::new(Identifier::new("Orders"));
        let full = SchemaObjectName::from_parts(vec![
            Some(Identifier::new("Sales")),
            Some(Identifier::new("DBO")),
            Some(Identifier::new("orders")),
        ])
        .unwrap();
        assert!(names_match(&short, &full, "dbo"));
        assert!(!names_match(&short, &full, "hr"));
    }
}
