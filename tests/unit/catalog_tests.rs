//! Schema catalog tests

use pretty_assertions::assert_eq;
use rust_tsql_resolver::catalog::{build_catalog, Catalog, FunctionReturnInfo};
use rust_tsql_resolver::parser::{parse_sql, Script};
use rust_tsql_resolver::report::{CollectingReporter, DUPLICATE_OBJECT};
use rust_tsql_resolver::AnalysisError;

fn scripts(sources: &[(&str, &str)]) -> Vec<Script> {
    sources
        .iter()
        .map(|(path, sql)| parse_sql(*path, sql).unwrap())
        .collect()
}

fn catalog_of(sources: &[(&str, &str)]) -> (Catalog, CollectingReporter) {
    let mut reporter = CollectingReporter::new();
    let catalog = build_catalog(&scripts(sources), "dbo", &mut reporter).unwrap();
    (catalog, reporter)
}

// ============================================================================
// Duplicate Detection Tests
// ============================================================================

#[test]
fn test_same_table_in_two_scripts() {
    let table = "USE Sales\nGO\nCREATE TABLE dbo.Orders (Id INT NOT NULL PRIMARY KEY)";
    let (catalog, reporter) = catalog_of(&[("first.sql", table), ("second.sql", table)]);

    assert_eq!(catalog.tables().count(), 1);
    assert_eq!(reporter.len(), 1);
    let diagnostic = &reporter.diagnostics[0];
    assert_eq!(diagnostic.rule, &DUPLICATE_OBJECT);
    let message = diagnostic.message();
    assert!(message.contains("first.sql"), "{message}");
    assert!(message.contains("second.sql"), "{message}");
    assert_eq!(
        message,
        "Table 'Sales.dbo.Orders' is defined more than once: first.sql, second.sql"
    );
    // Inline indexes of the discarded duplicate go with it
    let kept = catalog.get_table("Sales", "dbo", "Orders").unwrap();
    assert_eq!(kept.indexes.len(), 1);
}

#[test]
fn test_create_then_alter_is_not_a_duplicate() {
    let (catalog, reporter) = catalog_of(&[
        ("create.sql", "USE Sales\nGO\nCREATE VIEW dbo.OpenOrders AS SELECT 1 AS One"),
        ("alter.sql", "USE Sales\nGO\nALTER VIEW dbo.OpenOrders AS SELECT 2 AS Two"),
    ]);
    assert!(reporter.is_empty());
    let view = catalog.get_view("Sales", "dbo", "OpenOrders").unwrap();
    assert_eq!(view.object.path.to_str(), Some("create.sql"));
}

#[test]
fn test_table_and_view_with_the_same_name() {
    let (catalog, reporter) = catalog_of(&[
        ("orders.sql", "USE Sales\nGO\nCREATE TABLE dbo.Orders (Id INT)"),
        ("orders_view.sql", "USE Sales\nGO\nCREATE VIEW dbo.Orders AS SELECT 1 AS Id"),
    ]);
    assert!(catalog.get_table("Sales", "dbo", "Orders").is_some());
    assert!(catalog.get_view("Sales", "dbo", "Orders").is_none());
    assert_eq!(reporter.of_rule(&DUPLICATE_OBJECT).len(), 1);
    assert_eq!(
        reporter.diagnostics[0].message(),
        "Table 'Sales.dbo.Orders' is defined more than once: orders.sql, orders_view.sql"
    );
}

#[test]
fn test_same_name_in_different_databases_is_not_a_duplicate() {
    let (catalog, reporter) = catalog_of(&[
        ("a.sql", "USE Sales\nGO\nCREATE TABLE dbo.Log (Id INT)"),
        ("b.sql", "USE Hr\nGO\nCREATE TABLE dbo.Log (Id INT)"),
    ]);
    assert!(reporter.is_empty());
    assert_eq!(catalog.databases().count(), 2);
}

#[test]
fn test_duplicate_standalone_index() {
    let (catalog, reporter) = catalog_of(&[
        (
            "a.sql",
            "USE Sales\nGO\nCREATE TABLE dbo.T (A INT)\nGO\nCREATE INDEX IX_T_A ON dbo.T (A)",
        ),
        ("b.sql", "USE Sales\nGO\nCREATE INDEX IX_T_A ON dbo.T (A DESC)"),
    ]);
    assert_eq!(reporter.of_rule(&DUPLICATE_OBJECT).len(), 1);
    assert_eq!(reporter.diagnostics[0].args[0], "Index");
    assert_eq!(catalog.get_table("Sales", "dbo", "T").unwrap().indexes.len(), 1);
}

// ============================================================================
// Content Tests
// ============================================================================

#[test]
fn test_temp_tables_never_reach_the_catalog() {
    let (catalog, reporter) = catalog_of(&[
        ("a.sql", "CREATE TABLE #Work (Id INT)"),
        ("b.sql", "CREATE TABLE #Work (Id INT)"),
    ]);
    assert!(catalog.is_empty());
    assert!(reporter.is_empty());
}

#[test]
fn test_modules_and_synonyms() {
    let (catalog, _) = catalog_of(&[(
        "modules.sql",
        "USE Sales
GO
CREATE PROCEDURE dbo.GetOrders @CustomerId INT, @Count INT OUTPUT AS
BEGIN
    SELECT o.Id FROM dbo.Orders o WHERE o.CustomerId = @CustomerId;
END
GO
CREATE OR ALTER FUNCTION dbo.Recent (@Days INT) RETURNS TABLE AS RETURN (SELECT Id FROM dbo.Orders)
GO
CREATE FUNCTION dbo.Totals () RETURNS @t TABLE (Id INT) AS BEGIN RETURN END
GO
CREATE SYNONYM dbo.Clients FOR Crm.dbo.Customers",
    )]);

    let procedure = catalog.get_procedure("Sales", "dbo", "GetOrders").unwrap();
    assert_eq!(procedure.parameters.len(), 2);
    assert!(procedure.parameters[1].is_output);
    assert_eq!(
        catalog.get_function("Sales", "dbo", "Recent").unwrap().returns,
        FunctionReturnInfo::InlineTable
    );
    assert_eq!(
        catalog.get_function("Sales", "dbo", "Totals").unwrap().returns,
        FunctionReturnInfo::TableVariable
    );
    assert_eq!(
        catalog.get_synonym("Sales", "dbo", "Clients").unwrap().target,
        "Crm.dbo.Customers"
    );
}

#[test]
fn test_alter_table_adds_columns_and_defaults() {
    let (catalog, _) = catalog_of(&[
        ("table.sql", "USE Sales\nGO\nCREATE TABLE dbo.Orders (Id INT NOT NULL)"),
        (
            "changes.sql",
            "USE Sales\nGO\nALTER TABLE dbo.Orders ADD Notes NVARCHAR(200) NULL, Total DECIMAL(18, 2) NOT NULL\nGO\n\
             ALTER TABLE dbo.Orders ADD CONSTRAINT DF_Orders_Total DEFAULT (0) FOR Total",
        ),
    ]);
    let table = catalog.get_table("Sales", "dbo", "Orders").unwrap();
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Id", "Notes", "Total"]);
    let total = table.column("total").unwrap();
    assert_eq!(total.ordinal, 2);
    assert_eq!((total.precision, total.scale), (Some(18), Some(2)));
    assert!(total.default_value.is_some());
}

#[test]
fn test_objects_inside_if_blocks_are_cataloged() {
    let (catalog, _) = catalog_of(&[(
        "guarded.sql",
        "USE Sales\nGO\nIF OBJECT_ID('dbo.Audit') IS NULL\nBEGIN\n    CREATE TABLE dbo.Audit (Id INT)\nEND",
    )]);
    assert!(catalog.get_table("Sales", "dbo", "Audit").is_some());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_indeterminate_database_fails_the_build() {
    let mut reporter = CollectingReporter::new();
    let err = build_catalog(
        &scripts(&[("orphan.sql", "\n\nCREATE TABLE dbo.Orphan (Id INT)")]),
        "dbo",
        &mut reporter,
    )
    .unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::IndeterminateDatabase {
            object_kind,
            object_name,
            line,
            ..
        }) => {
            assert_eq!(*object_kind, "Table");
            assert_eq!(object_name, "dbo.Orphan");
            assert_eq!(*line, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_foreign_key_without_database_fails_the_build() {
    let mut reporter = CollectingReporter::new();
    let err = build_catalog(
        &scripts(&[
            ("table.sql", "USE Sales\nGO\nCREATE TABLE dbo.Orders (Id INT, CustomerId INT)"),
            (
                "keys.sql",
                "ALTER TABLE dbo.Orders ADD CONSTRAINT FK_Orders_Customers \
                 FOREIGN KEY (CustomerId) REFERENCES dbo.Customers (Id)",
            ),
        ]),
        "dbo",
        &mut reporter,
    )
    .unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::IndeterminateDatabase {
            object_kind,
            object_name,
            ..
        }) => {
            assert_eq!(*object_kind, "ForeignKey");
            assert_eq!(object_name, "dbo.Orders");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
