//! Resolves a named table reference to the object it denotes

use tracing::debug;

use super::context::AnalysisContext;
use super::references::{SourceKind, TableOrViewReference};
use super::scope::{classify, effective_alias, names_match, Scope, ScopeEntry};
use crate::report::{Reporter, MISSING_ALIAS};
use crate::syntax::{Identifier, NodeId, NodeKind, SchemaObjectName};

/// Result of searching one scope
enum Search<'t> {
    Found(ScopeEntry<'t>),
    NotFound,
    /// An unaliased join member was reported; stop resolving
    Abort,
}

/// The reference being resolved
struct Target<'t> {
    node: NodeId,
    name: &'t SchemaObjectName,
    alias: Option<&'t Identifier>,
}

/// Walks outward from a `NamedTableReference` through the enclosing scopes.
///
/// Holds no per-call state, so one resolver can serve every reference of
/// its tree.
pub struct TableReferenceResolver<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
}

impl<'c, 'a> TableReferenceResolver<'c, 'a> {
    pub fn new(ctx: &'c AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(
        &self,
        node: NodeId,
        reporter: &mut dyn Reporter,
    ) -> Option<TableOrViewReference> {
        let NodeKind::NamedTableReference { name, .. } = self.ctx.kind(node) else {
            return None;
        };
        if !self.ctx.parents.contains(node) {
            return None;
        }
        let target = Target {
            node,
            name,
            alias: effective_alias(self.ctx, node),
        };

        for ancestor in self.ctx.parents.ancestors_of(node) {
            let search = match self.ctx.kind(ancestor) {
                NodeKind::QualifiedJoin { .. } | NodeKind::UnqualifiedJoin { .. } => {
                    self.search(&target, &Scope::for_join(self.ctx, ancestor), reporter)
                }
                NodeKind::UpdateSpecification { .. } | NodeKind::DeleteSpecification { .. } => {
                    self.search(&target, &Scope::for_dml(self.ctx, ancestor), reporter)
                }
                NodeKind::FromClause { .. } => {
                    self.search(&target, &Scope::for_from(self.ctx, ancestor), reporter)
                }
                NodeKind::QuerySpecification { from, .. } => match from {
                    Some(from) => {
                        self.search(&target, &Scope::for_from(self.ctx, *from), reporter)
                    }
                    None => return None,
                },
                NodeKind::MergeSpecification { .. } => {
                    self.search(&target, &Scope::for_merge(self.ctx, ancestor), reporter)
                }
                NodeKind::InsertSpecification { target: insert_target, .. }
                    if *insert_target == node =>
                {
                    return self.identity_of(node);
                }
                kind if kind.is_topmost_statement() => {
                    return self.cte_identity(&target);
                }
                _ => continue,
            };
            match search {
                Search::Found(entry) => return entry.identity(self.ctx),
                Search::Abort => return None,
                Search::NotFound => {}
            }
        }
        None
    }

    /// An unaliased join member makes the whole scope ambiguous, whichever
    /// member is being resolved. Otherwise entries in order, then the
    /// fallback target.
    fn search<'t>(
        &self,
        target: &Target<'_>,
        scope: &Scope<'t>,
        reporter: &mut dyn Reporter,
    ) -> Search<'t> {
        if let Some((entry, name)) = scope.unaliased_join_member() {
            debug!(
                table = %name,
                "unaliased join member, table reference left unresolved"
            );
            self.ctx
                .report(reporter, &MISSING_ALIAS, entry.node, vec![name.to_string()]);
            return Search::Abort;
        }
        for entry in scope.all_entries() {
            let Some(name) = entry.name else {
                continue;
            };
            if self.is_searched_table(target, entry, name) {
                return Search::Found(*entry);
            }
        }
        Search::NotFound
    }

    /// Identical node, equal aliases, equal names, or one side's alias equal
    /// to the other side's object name.
    fn is_searched_table(
        &self,
        target: &Target<'_>,
        entry: &ScopeEntry<'_>,
        name: &SchemaObjectName,
    ) -> bool {
        if entry.node == target.node {
            return true;
        }
        match (target.alias, entry.alias) {
            (Some(a), Some(b)) => a.matches(&b.value),
            (None, None) => names_match(target.name, name, &self.ctx.default_schema),
            (Some(a), None) => a.matches(name.base_name()),
            (None, Some(b)) => b.matches(target.name.base_name()),
        }
    }

    /// Identity of the reference itself, for INSERT targets.
    fn identity_of(&self, node: NodeId) -> Option<TableOrViewReference> {
        ScopeEntry {
            node,
            name: match self.ctx.kind(node) {
                NodeKind::NamedTableReference { name, .. } => Some(name),
                _ => None,
            },
            alias: None,
            in_join: false,
        }
        .identity(self.ctx)
    }

    /// At the outermost statement only a CTE name can still match.
    fn cte_identity(&self, target: &Target<'_>) -> Option<TableOrViewReference> {
        if classify(self.ctx, target.node, target.name) != SourceKind::Cte {
            return None;
        }
        Some(TableOrViewReference {
            database: self.ctx.database_of(target.node),
            schema: self.ctx.default_schema.clone(),
            name: target.name.base_name().to_string(),
            kind: SourceKind::Cte,
            node: target.node,
            owning_object: self.ctx.owning_object(target.node),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sql;
    use crate::report::CollectingReporter;

    fn tables(ctx: &AnalysisContext<'_>) -> Vec<NodeId> {
        ctx.tree
            .walk()
            .into_iter()
            .filter(|id| matches!(ctx.kind(*id), NodeKind::NamedTableReference { .. }))
            .collect()
    }

    #[test]
    fn test_resolves_with_use_database() {
        let script = parse_sql("t.sql", "USE Sales\nGO\nSELECT o.Id FROM Orders o").unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let mut reporter = CollectingReporter::new();
        let resolved = TableReferenceResolver::new(&ctx)
            .resolve(tables(&ctx)[0], &mut reporter)
            .unwrap();
        assert_eq!(resolved.full_name(), "Sales.dbo.Orders");
        assert_eq!(resolved.kind, SourceKind::TableOrView);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_update_target_alias_maps_to_from_table() {
        let script = parse_sql(
            "t.sql",
            "UPDATE o SET o.Total = 0 FROM Sales.dbo.Orders o JOIN dbo.Lines l ON l.OrderId = o.Id",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let mut reporter = CollectingReporter::new();
        let target = tables(&ctx)[0];
        let resolved = TableReferenceResolver::new(&ctx)
            .resolve(target, &mut reporter)
            .unwrap();
        assert_eq!(resolved.name, "Orders");
        assert_eq!(resolved.database.as_deref(), Some("Sales"));
    }

    #[test]
    fn test_unaliased_join_member_aborts() {
        let script = parse_sql("t.sql", "SELECT 1 FROM dbo.A JOIN dbo.B b ON b.Id = 1").unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let mut reporter = CollectingReporter::new();
        let b = tables(&ctx)[1];
        assert!(TableReferenceResolver::new(&ctx).resolve(b, &mut reporter).is_none());
        assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1);
        assert_eq!(reporter.diagnostics[0].args, vec!["dbo.A"]);
    }

    #[test]
    fn test_unaliased_join_member_on_the_right_aborts_every_member() {
        let script = parse_sql("t.sql", "SELECT 1 FROM dbo.B b JOIN dbo.A ON b.Id = 1").unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let resolver = TableReferenceResolver::new(&ctx);
        for node in tables(&ctx) {
            let mut reporter = CollectingReporter::new();
            assert!(resolver.resolve(node, &mut reporter).is_none());
            assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1);
            assert_eq!(reporter.diagnostics[0].args, vec!["dbo.A"]);
        }
    }

    #[test]
    fn test_cte_reference() {
        let script = parse_sql(
            "t.sql",
            "USE Hr\nGO\nWITH Recent AS (SELECT Id FROM dbo.Orders) SELECT r.Id FROM Recent r",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let mut reporter = CollectingReporter::new();
        let recent = tables(&ctx)[1];
        let resolved = TableReferenceResolver::new(&ctx)
            .resolve(recent, &mut reporter)
            .unwrap();
        assert_eq!(resolved.kind, SourceKind::Cte);
        assert_eq!(resolved.name, "Recent");
        assert_eq!(resolved.schema, "dbo");
        assert_eq!(resolved.database.as_deref(), Some("Hr"));
    }

    #[test]
    fn test_temp_table_and_insert_target() {
        let script = parse_sql("t.sql", "INSERT INTO #Work (Id) SELECT Id FROM dbo.Orders").unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let mut reporter = CollectingReporter::new();
        let resolved = TableReferenceResolver::new(&ctx)
            .resolve(tables(&ctx)[0], &mut reporter)
            .unwrap();
        assert_eq!(resolved.kind, SourceKind::TempTable);
        assert_eq!(resolved.name, "#Work");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let script = parse_sql(
            "t.sql",
            "MERGE dbo.Target AS t USING dbo.Source AS s ON t.Id = s.Id WHEN MATCHED THEN DELETE;",
        )
        .unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        let resolver = TableReferenceResolver::new(&ctx);
        let mut reporter = CollectingReporter::new();
        let target = tables(&ctx)[0];
        let first = resolver.resolve(target, &mut reporter).unwrap();
        let second = resolver.resolve(target, &mut reporter).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "Target");
    }
}
