//! Column reference resolution tests

use pretty_assertions::assert_eq;
use rust_tsql_resolver::parser::parse_sql;
use rust_tsql_resolver::report::{CollectingReporter, MISSING_ALIAS};
use rust_tsql_resolver::resolve::{
    AnalysisContext, ColumnReference, ColumnReferenceResolver, SourceKind,
};
use rust_tsql_resolver::syntax::{NodeId, NodeKind};

/// Column references whose token text is `text`, in source order.
fn columns(ctx: &AnalysisContext<'_>, text: &str) -> Vec<NodeId> {
    ctx.tree
        .walk()
        .into_iter()
        .filter(|id| matches!(ctx.kind(*id), NodeKind::ColumnReference { .. }))
        .filter(|id| ctx.tree.text_of(*id) == text)
        .collect()
}

fn resolve_first(sql: &str, text: &str) -> (Option<ColumnReference>, CollectingReporter) {
    let script = parse_sql("c.sql", sql).unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let mut reporter = CollectingReporter::new();
    let node = *columns(&ctx, text)
        .first()
        .unwrap_or_else(|| panic!("no column {text}"));
    let resolved = ColumnReferenceResolver::new(&ctx).resolve(node, &mut reporter);
    (resolved, reporter)
}

// ============================================================================
// Single Table Tests
// ============================================================================

#[test]
fn test_unaliased_single_table_is_not_determined() {
    for sql in [
        "SELECT Id FROM T WHERE Col = 1",
        "SELECT * FROM dbo.T WHERE Col = 'x'",
        "DELETE FROM T WHERE Col IS NULL",
    ] {
        let (resolved, reporter) = resolve_first(sql, "Col");
        let resolved = resolved.unwrap_or_else(|| panic!("unresolved in {sql}"));
        assert_eq!(resolved.kind, SourceKind::NotDetermined, "{sql}");
        assert_eq!(resolved.table, "T", "{sql}");
        assert!(reporter.is_empty());
    }
}

#[test]
fn test_qualified_wildcard_resolves_to_table() {
    let (resolved, _) = resolve_first("SELECT CHECKSUM(o.*) FROM dbo.Orders o", "o . *");
    let resolved = resolved.unwrap();
    assert_eq!(resolved.column, "*");
    assert_eq!(resolved.table, "Orders");
}

// ============================================================================
// Join Tests
// ============================================================================

#[test]
fn test_unqualified_column_in_join_reports_exactly_once() {
    for sql in [
        "SELECT a.Id FROM dbo.A a JOIN dbo.B b ON a.Id = b.Id WHERE Flag = 1",
        "SELECT a.Id FROM dbo.A a JOIN dbo.B b ON a.Id = b.Id AND Flag = 1",
    ] {
        let (resolved, reporter) = resolve_first(sql, "Flag");
        assert!(resolved.is_none(), "{sql}");
        assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1, "{sql}");
        assert_eq!(reporter.diagnostics[0].args, vec!["Flag".to_string()]);
    }
}

#[test]
fn test_three_level_join_in_where_and_on() {
    let join = "FROM dbo.T1 t1 JOIN dbo.T2 t2 ON t2.Id = t1.Id JOIN dbo.T3 t3 ON t3.Id = t2.Id";
    let in_where = format!("SELECT t1.Id {join} WHERE t3.X = 1");
    let in_on = "SELECT t1.Id FROM dbo.T1 t1 \
                 JOIN dbo.T2 t2 ON t2.Id = t1.Id AND t3.X = 1 \
                 JOIN dbo.T3 t3 ON t3.Id = t2.Id";
    for sql in [in_where.as_str(), in_on] {
        let (resolved, reporter) = resolve_first(sql, "t3 . X");
        let resolved = resolved.unwrap_or_else(|| panic!("unresolved in {sql}"));
        assert_eq!(resolved.table, "T3", "{sql}");
        assert_eq!(resolved.kind, SourceKind::TableOrView);
        assert_eq!(resolved.alias.as_deref(), Some("t3"));
        assert!(reporter.is_empty());
    }
}

// ============================================================================
// CTE and MERGE Tests
// ============================================================================

#[test]
fn test_cte_qualified_column() {
    let (resolved, _) = resolve_first(
        "USE Sales\nGO\nWITH CTE AS (SELECT Id, Col FROM dbo.T) SELECT c.Id FROM CTE c WHERE c.Col = 1",
        "c . Col",
    );
    let resolved = resolved.unwrap();
    assert_eq!(resolved.kind, SourceKind::Cte);
    assert_eq!(resolved.table, "CTE");
    assert_eq!(resolved.database.as_deref(), Some("Sales"));
}

#[test]
fn test_merge_target_alias_from_statement_slot() {
    let sql = "MERGE dbo.Target AS t USING dbo.Source AS s ON t.Id = s.Id \
               WHEN MATCHED THEN UPDATE SET t.Value = s.Value;";
    let (target, _) = resolve_first(sql, "t . Id");
    assert_eq!(target.unwrap().table, "Target");

    let (source, _) = resolve_first(sql, "s . Value");
    let source = source.unwrap();
    assert_eq!(source.table, "Source");
    assert_eq!(source.kind, SourceKind::TableOrView);
}

#[test]
fn test_merge_source_temp_table() {
    let sql = "MERGE dbo.Target AS t USING #Staged AS s ON t.Id = s.Id WHEN MATCHED THEN DELETE;";
    let (source, _) = resolve_first(sql, "s . Id");
    assert_eq!(source.unwrap().kind, SourceKind::TempTable);
}

// ============================================================================
// Skipped References
// ============================================================================

#[test]
fn test_update_set_target_is_never_resolved() {
    let (resolved, reporter) = resolve_first(
        "UPDATE o SET o.Total = 0 FROM dbo.Orders o JOIN dbo.Lines l ON l.OrderId = o.Id",
        "o . Total",
    );
    assert!(resolved.is_none());
    assert!(reporter.is_empty());
}

#[test]
fn test_date_part_arguments_are_skipped() {
    for (sql, text) in [
        ("SELECT DATEDIFF(day, a.Created, a.Closed) FROM dbo.A a", "day"),
        ("SELECT DATEPART(week, Created) FROM dbo.A", "week"),
        ("SELECT DATE_BUCKET(month, 1, Created) FROM dbo.A", "month"),
    ] {
        let (resolved, reporter) = resolve_first(sql, text);
        assert!(resolved.is_none(), "{sql}");
        assert!(reporter.is_empty(), "{sql}");
    }
}

#[test]
fn test_resolution_is_idempotent() {
    let script = parse_sql(
        "c.sql",
        "SELECT o.Id FROM dbo.Orders o JOIN dbo.Lines l ON l.OrderId = o.Id WHERE l.Qty > 1",
    )
    .unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let resolver = ColumnReferenceResolver::new(&ctx);
    let mut reporter = CollectingReporter::new();
    let qty = columns(&ctx, "l . Qty")[0];
    let first = resolver.resolve(qty, &mut reporter);
    let second = resolver.resolve(qty, &mut reporter);
    assert_eq!(first, second);
    assert_eq!(first.unwrap().full_name(), ".dbo.Lines.Qty");
}
