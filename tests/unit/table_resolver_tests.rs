//! Table reference resolution tests

use pretty_assertions::assert_eq;
use rust_tsql_resolver::parser::parse_sql;
use rust_tsql_resolver::report::{CollectingReporter, MISSING_ALIAS};
use rust_tsql_resolver::resolve::{
    AnalysisContext, SourceKind, TableOrViewReference, TableReferenceResolver,
};
use rust_tsql_resolver::syntax::{NodeId, NodeKind};

/// Named table references with the given base name, in source order.
fn tables_named(ctx: &AnalysisContext<'_>, name: &str) -> Vec<NodeId> {
    ctx.tree
        .walk()
        .into_iter()
        .filter(|id| {
            matches!(ctx.kind(*id), NodeKind::NamedTableReference { name: n, .. } if n.base.matches(name))
        })
        .collect()
}

fn resolve(
    ctx: &AnalysisContext<'_>,
    node: NodeId,
    reporter: &mut CollectingReporter,
) -> Option<TableOrViewReference> {
    TableReferenceResolver::new(ctx).resolve(node, reporter)
}

#[test]
fn test_three_part_name_overrides_use() {
    let script = parse_sql(
        "t.sql",
        "USE Sales\nGO\nSELECT x.Id FROM Archive.hist.Orders x",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let resolved = resolve(&ctx, tables_named(&ctx, "Orders")[0], &mut reporter).unwrap();
    assert_eq!(resolved.full_name(), "Archive.hist.Orders");
}

#[test]
fn test_unknown_database_leaves_part_empty() {
    let script = parse_sql("t.sql", "SELECT Id FROM Orders").unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let resolved = resolve(&ctx, tables_named(&ctx, "Orders")[0], &mut reporter).unwrap();
    assert_eq!(resolved.database, None);
    assert_eq!(resolved.full_name(), ".dbo.Orders");
}

#[test]
fn test_delete_target_alias_found_in_from() {
    let script = parse_sql(
        "t.sql",
        "USE Sales\nDELETE o FROM dbo.Orders AS o JOIN dbo.Customers AS c ON c.Id = o.CustomerId WHERE c.Closed = 1",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    // The DELETE target is written as the bare alias `o`
    let target = tables_named(&ctx, "o")[0];
    let resolved = resolve(&ctx, target, &mut reporter).unwrap();
    assert_eq!(resolved.full_name(), "Sales.dbo.Orders");
    assert!(reporter.is_empty());
}

#[test]
fn test_update_without_from_uses_target() {
    let script = parse_sql("t.sql", "USE Sales\nUPDATE dbo.Orders SET Total = 0").unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let resolved = resolve(&ctx, tables_named(&ctx, "Orders")[0], &mut reporter).unwrap();
    assert_eq!(resolved.name, "Orders");
    assert_eq!(resolved.kind, SourceKind::TableOrView);
}

#[test]
fn test_nested_join_members_resolve() {
    let script = parse_sql(
        "t.sql",
        "SELECT 1 FROM dbo.T1 t1 JOIN dbo.T2 t2 ON t2.Id = t1.Id JOIN dbo.T3 t3 ON t3.Id = t2.Id",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    for name in ["T1", "T2", "T3"] {
        let resolved = resolve(&ctx, tables_named(&ctx, name)[0], &mut reporter).unwrap();
        assert_eq!(resolved.name, name);
    }
    assert!(reporter.is_empty());
}

#[test]
fn test_unaliased_join_member_reports_and_aborts() {
    let script = parse_sql(
        "t.sql",
        "SELECT 1 FROM dbo.T1 t1 JOIN dbo.T2 ON dbo.T2.Id = t1.Id JOIN dbo.T3 t3 ON t3.Id = t1.Id",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let t3 = tables_named(&ctx, "T3")[0];
    assert!(resolve(&ctx, t3, &mut reporter).is_none());
    assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1);
    assert_eq!(reporter.diagnostics[0].args, vec!["dbo.T2".to_string()]);
}

#[test]
fn test_unaliased_join_member_is_reported_in_either_position() {
    for sql in [
        "SELECT 1 FROM dbo.A JOIN dbo.B b ON b.Id = 1",
        "SELECT 1 FROM dbo.B b JOIN dbo.A ON b.Id = 1",
    ] {
        let script = parse_sql("t.sql", sql).unwrap();
        let ctx = AnalysisContext::new(&script, "dbo");
        // Both the aliased member and the unaliased one itself
        for name in ["A", "B"] {
            let mut reporter = CollectingReporter::new();
            let node = tables_named(&ctx, name)[0];
            assert!(resolve(&ctx, node, &mut reporter).is_none(), "{name} in {sql}");
            assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1, "{name} in {sql}");
            assert_eq!(reporter.diagnostics[0].args, vec!["dbo.A".to_string()]);
        }
    }
}

#[test]
fn test_cte_is_only_visible_to_later_ctes_and_body() {
    let script = parse_sql(
        "t.sql",
        "WITH Early AS (SELECT Id FROM Later), Later AS (SELECT Id FROM dbo.Orders)
         SELECT e.Id FROM Early e",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();

    let early = tables_named(&ctx, "Early")[0];
    assert_eq!(resolve(&ctx, early, &mut reporter).unwrap().kind, SourceKind::Cte);

    // `Later` is defined after `Early`, so inside Early it is a plain table
    let later = tables_named(&ctx, "Later")[0];
    assert_eq!(
        resolve(&ctx, later, &mut reporter).unwrap().kind,
        SourceKind::TableOrView
    );
}

#[test]
fn test_reference_inside_procedure_has_owning_object() {
    let script = parse_sql(
        "p.sql",
        "USE Sales\nGO\nCREATE PROCEDURE Reports.Monthly AS\nSELECT o.Id FROM dbo.Orders o",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let resolved = resolve(&ctx, tables_named(&ctx, "Orders")[0], &mut reporter).unwrap();
    assert_eq!(resolved.owning_object.as_deref(), Some("Reports.Monthly"));
}

#[test]
fn test_global_temp_table() {
    let script = parse_sql("t.sql", "SELECT g.Id FROM ##Shared g").unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let resolved = resolve(&ctx, tables_named(&ctx, "##Shared")[0], &mut reporter).unwrap();
    assert_eq!(resolved.kind, SourceKind::TempTable);
}
