//! Unit tests for the T-SQL fragment parser

use std::io::Write;

use pretty_assertions::assert_eq;
use rust_tsql_resolver::parser::{parse_sql, parse_sql_file, Script};
use rust_tsql_resolver::syntax::{NodeKind, ParentIndex};
use tempfile::NamedTempFile;

/// Helper to create a temp SQL file with content
fn create_sql_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".sql").unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn kind_names(script: &Script) -> Vec<&'static str> {
    script
        .tree
        .walk()
        .into_iter()
        .map(|id| script.tree.kind(id).name())
        .collect()
}

fn count(script: &Script, kind: &str) -> usize {
    kind_names(script).into_iter().filter(|k| *k == kind).count()
}

fn batch_count(script: &Script) -> usize {
    match script.tree.kind(script.tree.root()) {
        NodeKind::Script { batches } => batches.len(),
        other => panic!("root is {}", other.name()),
    }
}

// ============================================================================
// Batch Separator Tests
// ============================================================================

#[test]
fn test_split_batches_basic() {
    let file = create_sql_file(b"USE Sales\nGO\nSELECT 1\nGO\nSELECT 2");
    let script = parse_sql_file(file.path()).unwrap();
    assert_eq!(batch_count(&script), 3);
}

#[test]
fn test_split_batches_case_insensitive_go_with_count() {
    let script = parse_sql("b.sql", "SELECT 1\ngo\nSELECT 2\nGo 5\nSELECT 3").unwrap();
    assert_eq!(batch_count(&script), 3);
}

#[test]
fn test_go_inside_string_is_not_a_separator() {
    let script = parse_sql("b.sql", "SELECT 'GO' AS Word\nGO").unwrap();
    assert_eq!(batch_count(&script), 1);
    assert_eq!(count(&script, "Literal"), 1);
}

// ============================================================================
// Encoding Tests
// ============================================================================

#[test]
fn test_utf8_bom_is_stripped() {
    let file = create_sql_file(b"\xEF\xBB\xBFSELECT Id FROM dbo.Orders");
    let script = parse_sql_file(file.path()).unwrap();
    assert_eq!(count(&script, "NamedTableReference"), 1);
    assert_eq!(script.tree.region(script.tree.root()).begin.line, 1);
}

#[test]
fn test_windows_1252_fallback() {
    // 0xE9 is "é" in Windows-1252 and invalid as a lone UTF-8 byte
    let file = create_sql_file(b"SELECT 'caf\xE9' AS Name FROM dbo.Menu");
    let script = parse_sql_file(file.path()).unwrap();
    assert_eq!(count(&script, "NamedTableReference"), 1);
}

#[test]
fn test_missing_file_is_a_read_error() {
    let err = parse_sql_file(std::path::Path::new("/nonexistent/dir/none.sql")).unwrap_err();
    assert!(err.to_string().contains("Failed to read SQL file"));
}

#[test]
fn test_unterminated_string_is_a_parse_error() {
    let err = parse_sql("bad.sql", "SELECT 'open").unwrap_err();
    assert!(err.to_string().contains("bad.sql"), "{err}");
}

// ============================================================================
// Statement Coverage Tests
// ============================================================================

#[test]
fn test_select_with_joins_and_subqueries() {
    let script = parse_sql(
        "q.sql",
        "SELECT TOP (10) o.Id, c.Name, (SELECT COUNT(*) FROM dbo.Lines l WHERE l.OrderId = o.Id) AS Lines
         FROM dbo.Orders o WITH (NOLOCK)
         INNER JOIN dbo.Customers c ON c.Id = o.CustomerId
         LEFT JOIN (SELECT Id FROM dbo.Flags) f ON f.Id = o.Id
         CROSS APPLY dbo.Split(o.Tags, ',') s
         WHERE o.Total BETWEEN 1 AND 100 AND c.Name LIKE 'A%'
         ORDER BY o.Id DESC",
    )
    .unwrap();
    assert_eq!(count(&script, "QualifiedJoin"), 2);
    assert_eq!(count(&script, "UnqualifiedJoin"), 1);
    assert_eq!(count(&script, "QueryDerivedTable"), 1);
    assert_eq!(count(&script, "FunctionTableReference"), 1);
    assert_eq!(count(&script, "ScalarSubquery"), 1);
    assert_eq!(count(&script, "OtherStatement"), 0);
}

#[test]
fn test_dml_statements() {
    let script = parse_sql(
        "dml.sql",
        "INSERT INTO dbo.Orders (Id, Total) VALUES (1, 2.5), (2, DEFAULT);
         UPDATE o SET o.Total = 0 FROM dbo.Orders o WHERE o.Id = 1;
         DELETE FROM dbo.Orders WHERE Id = 2;
         MERGE dbo.Orders AS t USING dbo.Staging AS s ON t.Id = s.Id
           WHEN MATCHED AND s.Total > 0 THEN UPDATE SET Total = s.Total
           WHEN NOT MATCHED BY TARGET THEN INSERT (Id, Total) VALUES (s.Id, s.Total)
           WHEN NOT MATCHED BY SOURCE THEN DELETE;",
    )
    .unwrap();
    assert_eq!(count(&script, "InsertStatement"), 1);
    assert_eq!(count(&script, "UpdateStatement"), 1);
    assert_eq!(count(&script, "DeleteStatement"), 1);
    assert_eq!(count(&script, "MergeActionClause"), 3);
    assert_eq!(count(&script, "OtherStatement"), 0);
}

#[test]
fn test_control_flow_and_cursor() {
    let script = parse_sql(
        "p.sql",
        "DECLARE @Id INT = 1;
         DECLARE c CURSOR FOR SELECT Id FROM dbo.Orders;
         IF @Id > 0
         BEGIN
             SET @Id = @Id + 1;
         END
         ELSE
             PRINT 'none';
         WHILE @Id < 10 SET @Id = @Id + 1;
         BEGIN TRY
             EXEC dbo.DoWork @Id;
         END TRY
         BEGIN CATCH
             RETURN;
         END CATCH",
    )
    .unwrap();
    assert_eq!(count(&script, "DeclareCursorStatement"), 1);
    assert_eq!(count(&script, "IfStatement"), 1);
    assert_eq!(count(&script, "WhileStatement"), 1);
    assert_eq!(count(&script, "TryCatchStatement"), 1);
    assert_eq!(count(&script, "ExecuteStatement"), 1);
}

#[test]
fn test_unsupported_statement_keeps_the_rest() {
    let script = parse_sql(
        "o.sql",
        "TRUNCATE TABLE dbo.Staging\nSELECT Id FROM dbo.Orders",
    )
    .unwrap();
    assert_eq!(count(&script, "OtherStatement"), 1);
    assert_eq!(count(&script, "SelectStatement"), 1);
}

#[test]
fn test_ctes_attach_to_statement() {
    let script = parse_sql(
        "cte.sql",
        "WITH A AS (SELECT 1 AS X), B AS (SELECT X FROM A) SELECT X FROM B",
    )
    .unwrap();
    let statement = script
        .tree
        .walk()
        .into_iter()
        .find(|id| script.tree.kind(*id).is_topmost_statement())
        .unwrap();
    assert_eq!(script.tree.kind(statement).ctes().map(<[_]>::len), Some(2));
}

// ============================================================================
// Tree Service Tests
// ============================================================================

#[test]
fn test_parent_index_covers_every_reachable_node() {
    let script = parse_sql(
        "t.sql",
        "SELECT a.Id FROM dbo.A a JOIN dbo.B b ON a.Id = b.Id WHERE EXISTS (SELECT 1 FROM dbo.C)",
    )
    .unwrap();
    let parents = ParentIndex::build(&script.tree);
    let nodes = script.tree.walk();
    let root = script.tree.root();
    assert!(parents.parent_of(root).is_none());
    for node in nodes.iter().copied().filter(|n| *n != root) {
        let parent = parents.parent_of(node).unwrap();
        assert!(script.tree.children(parent).contains(&node));
        assert_eq!(parents.ancestors_of(node).last(), Some(root));
    }
}

#[test]
fn test_innermost_node_at_location() {
    let script = parse_sql("t.sql", "SELECT Id\nFROM dbo.Orders").unwrap();
    let node = script
        .tree
        .innermost_node_at(rust_tsql_resolver::syntax::CodeLocation::new(2, 8))
        .unwrap();
    assert_eq!(script.tree.kind(node).name(), "NamedTableReference");
    assert_eq!(script.tree.text_of(node), "dbo . Orders");
}
