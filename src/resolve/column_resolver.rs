//! Resolves a column reference to the table that owns it

use tracing::debug;

use super::context::AnalysisContext;
use super::enum_params::is_enum_parameter;
use super::references::{ColumnReference, SourceKind};
use super::scope::{names_match, Scope, ScopeEntry};
use crate::report::{Reporter, MISSING_ALIAS};
use crate::syntax::{ColumnType, Identifier, NodeId, NodeKind, SchemaObjectName};

/// Result of searching one scope
enum Search<'t> {
    Found(ScopeEntry<'t>),
    NotFound,
    /// Bound to something that is not a named table, or reported
    Stop,
}

/// Walks outward from a `ColumnReference` through the enclosing scopes.
pub struct ColumnReferenceResolver<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
}

impl<'c, 'a> ColumnReferenceResolver<'c, 'a> {
    pub fn new(ctx: &'c AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(&self, node: NodeId, reporter: &mut dyn Reporter) -> Option<ColumnReference> {
        let NodeKind::ColumnReference { parts, column_type } = self.ctx.kind(node) else {
            return None;
        };
        let (qualifier, column) = match column_type {
            ColumnType::Regular => {
                let (column, qualifier) = parts.split_last()?;
                (qualifier, column.value.clone())
            }
            // `t.*`; a bare `*` as in COUNT(*) has no parts
            ColumnType::Wildcard if !parts.is_empty() => (parts.as_slice(), "*".to_string()),
            _ => return None,
        };
        if !self.ctx.parents.contains(node)
            || self.is_assignment_target(node)
            || self.is_enum_argument(node)
        {
            return None;
        }

        for ancestor in self.ctx.parents.ancestors_of(node) {
            let search = match self.ctx.kind(ancestor) {
                NodeKind::QualifiedJoin { .. } | NodeKind::UnqualifiedJoin { .. } => {
                    if qualifier.is_empty() {
                        self.report_missing_alias(node, &column, reporter);
                        return None;
                    }
                    self.search(qualifier, &Scope::for_join(self.ctx, ancestor))
                }
                NodeKind::UpdateSpecification { .. } | NodeKind::DeleteSpecification { .. } => {
                    let scope = Scope::for_dml(self.ctx, ancestor);
                    if qualifier.is_empty() {
                        self.search_unqualified(node, &column, &scope, reporter)
                    } else {
                        self.search(qualifier, &scope)
                    }
                }
                NodeKind::FromClause { .. } => {
                    let scope = Scope::for_from(self.ctx, ancestor);
                    if qualifier.is_empty() {
                        self.search_unqualified(node, &column, &scope, reporter)
                    } else {
                        self.search(qualifier, &scope)
                    }
                }
                NodeKind::QuerySpecification { from, .. } => {
                    let Some(from) = from else {
                        return None;
                    };
                    let scope = Scope::for_from(self.ctx, *from);
                    if qualifier.is_empty() {
                        self.search_unqualified(node, &column, &scope, reporter)
                    } else {
                        self.search(qualifier, &scope)
                    }
                }
                NodeKind::MergeSpecification { .. } => {
                    // Unqualified MERGE columns belong to either side
                    if qualifier.is_empty() {
                        return None;
                    }
                    self.search(qualifier, &Scope::for_merge(self.ctx, ancestor))
                }
                kind if kind.is_topmost_statement() => return None,
                _ => continue,
            };
            match search {
                Search::Found(entry) => {
                    let mut table = entry.identity(self.ctx)?;
                    if qualifier.is_empty() {
                        table.kind = SourceKind::NotDetermined;
                    }
                    let alias = entry.alias.map(|a| a.value.clone());
                    return Some(ColumnReference::from_table(table, column, node, alias));
                }
                Search::Stop => return None,
                Search::NotFound => {}
            }
        }
        None
    }

    /// Qualified lookup: the qualifier names an alias, a bare table name or
    /// a multi-part table name.
    fn search<'t>(&self, qualifier: &[Identifier], scope: &Scope<'t>) -> Search<'t> {
        for entry in scope.all_entries() {
            match entry.name {
                Some(name) if self.qualifier_matches(qualifier, entry, name) => {
                    return Search::Found(*entry);
                }
                // Bound to a derived table, table variable or function
                None if qualifier.len() == 1
                    && entry.alias.is_some_and(|a| a.matches(&qualifier[0].value)) =>
                {
                    return Search::Stop;
                }
                _ => {}
            }
        }
        Search::NotFound
    }

    fn qualifier_matches(
        &self,
        qualifier: &[Identifier],
        entry: &ScopeEntry<'_>,
        name: &SchemaObjectName,
    ) -> bool {
        if let [single] = qualifier {
            return match entry.alias {
                Some(alias) => alias.matches(&single.value),
                None => single.matches(name.base_name()),
            };
        }
        if entry.alias.is_some() {
            return false;
        }
        SchemaObjectName::from_parts(qualifier.iter().cloned().map(Some).collect())
            .is_some_and(|q| names_match(&q, name, &self.ctx.default_schema))
    }

    /// A lone candidate owns an unqualified column; several candidates need
    /// an alias.
    fn search_unqualified<'t>(
        &self,
        node: NodeId,
        column: &str,
        scope: &Scope<'t>,
        reporter: &mut dyn Reporter,
    ) -> Search<'t> {
        let candidates = scope.candidates();
        match candidates.as_slice() {
            [] => Search::NotFound,
            [single] if single.name.is_some() => Search::Found(*single),
            [_] => Search::Stop,
            _ => {
                self.report_missing_alias(node, column, reporter);
                Search::Stop
            }
        }
    }

    fn report_missing_alias(&self, node: NodeId, column: &str, reporter: &mut dyn Reporter) {
        debug!(column, "unqualified column among several tables");
        self.ctx
            .report(reporter, &MISSING_ALIAS, node, vec![column.to_string()]);
    }

    /// Left-hand side of `SET col = ...`
    fn is_assignment_target(&self, node: NodeId) -> bool {
        self.ctx.parents.parent_of(node).is_some_and(|parent| {
            matches!(
                self.ctx.kind(parent),
                NodeKind::AssignmentSetClause { column: Some(c), .. } if *c == node
            )
        })
    }

    fn is_enum_argument(&self, node: NodeId) -> bool {
        let Some(parent) = self.ctx.parents.parent_of(node) else {
            return false;
        };
        match self.ctx.kind(parent) {
            NodeKind::FunctionCall {
                call_target,
                name,
                arguments,
                ..
            } if call_target.is_empty() => arguments
                .iter()
                .position(|a| *a == node)
                .is_some_and(|i| is_enum_parameter(&name.value, i)),
            _ => false,
        }
    }
}
