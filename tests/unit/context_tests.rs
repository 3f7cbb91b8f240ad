//! Database context tracking tests

use pretty_assertions::assert_eq;
use rust_tsql_resolver::parser::parse_sql;
use rust_tsql_resolver::resolve::{AnalysisContext, DatabaseContext};
use rust_tsql_resolver::syntax::CodeLocation;

#[test]
fn test_single_use_covers_everything_after_it() {
    let sql = "SELECT 1\nUSE Sales\nSELECT 2\nGO\nSELECT 3\nGO\nSELECT 4";
    let script = parse_sql("ctx.sql", sql).unwrap();
    let databases = DatabaseContext::build(&script.tree);

    assert_eq!(databases.database_at(CodeLocation::new(1, 1)), None);
    assert_eq!(databases.database_at(CodeLocation::new(2, 1)), None);
    for line in 3..=7 {
        assert_eq!(
            databases.database_at(CodeLocation::new(line, 1)),
            Some("Sales"),
            "line {line}"
        );
    }
}

#[test]
fn test_later_use_wins_across_batches() {
    let sql = "USE Sales\nGO\nSELECT 1\nGO\nUSE [Hr]\nGO\nSELECT 2";
    let script = parse_sql("ctx.sql", sql).unwrap();
    let databases = DatabaseContext::build(&script.tree);

    assert_eq!(databases.database_at(CodeLocation::new(3, 1)), Some("Sales"));
    assert_eq!(databases.database_at(CodeLocation::new(7, 1)), Some("Hr"));
}

#[test]
fn test_database_of_node_uses_its_start() {
    let sql = "USE Sales\nSELECT o.Id FROM dbo.Orders o";
    let script = parse_sql("ctx.sql", sql).unwrap();
    let ctx = AnalysisContext::new(&script, "dbo");
    let table = ctx
        .tree
        .walk()
        .into_iter()
        .find(|id| ctx.kind(*id).name() == "NamedTableReference")
        .unwrap();
    assert_eq!(ctx.database_of(table).as_deref(), Some("Sales"));
}

#[test]
fn test_script_without_use() {
    let script = parse_sql("ctx.sql", "SELECT 1").unwrap();
    let databases = DatabaseContext::build(&script.tree);
    assert!(databases.is_empty());
    assert_eq!(databases.database_at(CodeLocation::new(1, 5)), None);
}
