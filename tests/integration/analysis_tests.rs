//! End-to-end analysis tests: discovery, parsing, catalog and resolution

use pretty_assertions::assert_eq;
use rust_tsql_resolver::parser::collect_sql_files;
use rust_tsql_resolver::report::{DUPLICATE_OBJECT, MISSING_ALIAS};
use rust_tsql_resolver::resolve::{
    AnalysisContext, ColumnReferenceResolver, SourceKind, TableReferenceResolver,
};
use rust_tsql_resolver::{analyze_scripts, AnalysisOptions, CollectingReporter};

use crate::common::{columns_with_text, init_tracing, nodes_of, table_named, ScriptDir};

fn sample_project() -> ScriptDir {
    init_tracing();
    let dir = ScriptDir::new();
    dir.write(
        "Tables/Orders.sql",
        "USE Sales
GO
CREATE TABLE dbo.Orders (
    Id INT NOT NULL CONSTRAINT PK_Orders PRIMARY KEY,
    CustomerId INT NOT NULL,
    Total MONEY NULL
)
GO
CREATE INDEX IX_Orders_CustomerId ON dbo.Orders (CustomerId)",
    );
    dir.write(
        "Tables/Customers.sql",
        "USE Sales
GO
CREATE TABLE dbo.Customers (Id INT NOT NULL PRIMARY KEY, Name NVARCHAR(100) NOT NULL)
GO
ALTER TABLE dbo.Orders ADD CONSTRAINT FK_Orders_Customers
    FOREIGN KEY (CustomerId) REFERENCES dbo.Customers (Id)",
    );
    dir.write(
        "Procedures/GetCustomerOrders.sql",
        "USE Sales
GO
CREATE PROCEDURE dbo.GetCustomerOrders @CustomerId INT AS
BEGIN
    SELECT o.Id, o.Total, c.Name
    FROM dbo.Orders o
    JOIN dbo.Customers c ON c.Id = o.CustomerId
    WHERE c.Id = @CustomerId AND Total > 0;
END",
    );
    dir.write("notes.txt", "not a script");
    dir
}

#[test]
fn test_collect_sql_files_is_sorted_and_filtered() {
    let dir = sample_project();
    let files = collect_sql_files(&dir.root).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|f| {
            f.strip_prefix(&dir.root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "Procedures/GetCustomerOrders.sql",
            "Tables/Customers.sql",
            "Tables/Orders.sql",
        ]
    );
}

#[test]
fn test_analysis_builds_catalog_and_resolves_against_it() {
    let dir = sample_project();
    let files = collect_sql_files(&dir.root).unwrap();
    let mut reporter = CollectingReporter::new();
    let analysis = analyze_scripts(&files, &AnalysisOptions::default(), &mut reporter).unwrap();
    assert!(reporter.is_empty());

    let orders = analysis.catalog.get_table("Sales", "dbo", "Orders").unwrap();
    assert_eq!(orders.indexes.len(), 2);
    assert_eq!(orders.foreign_keys.len(), 1);
    assert_eq!(orders.foreign_keys[0].referenced_table, "Customers");

    let procedure_script = analysis
        .scripts
        .iter()
        .find(|s| s.path.ends_with("GetCustomerOrders.sql"))
        .unwrap();
    let ctx = AnalysisContext::new(procedure_script, "dbo");

    let table = TableReferenceResolver::new(&ctx)
        .resolve(table_named(&ctx, "Customers"), &mut reporter)
        .unwrap();
    assert_eq!(table.owning_object.as_deref(), Some("dbo.GetCustomerOrders"));
    assert!(analysis.catalog.find_table(&table).is_some());

    let column_resolver = ColumnReferenceResolver::new(&ctx);
    let name = column_resolver
        .resolve(columns_with_text(&ctx, "c . Name")[0], &mut reporter)
        .unwrap();
    assert_eq!(name.full_name(), "Sales.dbo.Customers.Name");
    assert!(analysis
        .catalog
        .get_column("Sales", &name.schema, &name.table, &name.column)
        .is_some());

    // `Total` is unqualified in a two-table join
    assert!(column_resolver
        .resolve(columns_with_text(&ctx, "Total")[0], &mut reporter)
        .is_none());
    assert_eq!(reporter.of_rule(&MISSING_ALIAS).len(), 1);
    assert_eq!(
        reporter.diagnostics[0].owning_object.as_deref(),
        Some("dbo.GetCustomerOrders")
    );
    assert_eq!(reporter.diagnostics[0].database.as_deref(), Some("Sales"));
}

#[test]
fn test_every_reference_resolves_or_reports() {
    let dir = sample_project();
    let files = collect_sql_files(&dir.root).unwrap();
    let mut reporter = CollectingReporter::new();
    let analysis = analyze_scripts(&files, &AnalysisOptions::default(), &mut reporter).unwrap();

    let mut resolved = 0;
    for script in &analysis.scripts {
        let ctx = AnalysisContext::new(script, "dbo");
        let resolver = TableReferenceResolver::new(&ctx);
        for node in nodes_of(&ctx, "NamedTableReference") {
            let reference = resolver.resolve(node, &mut reporter).unwrap();
            assert_eq!(reference.kind, SourceKind::TableOrView);
            resolved += 1;
        }
    }
    assert_eq!(resolved, 2);
    assert!(reporter.is_empty());
}

#[test]
fn test_parallel_and_sequential_analysis_agree() {
    init_tracing();
    let dir = ScriptDir::new();
    for i in 0..20 {
        dir.write(
            &format!("t{i:02}.sql"),
            &format!("USE Sales\nGO\nCREATE TABLE dbo.Shared (Id INT)\nGO\nCREATE TABLE dbo.T{i} (Id INT)"),
        );
    }
    let files = collect_sql_files(&dir.root).unwrap();

    let mut sequential_reporter = CollectingReporter::new();
    let sequential = analyze_scripts(
        &files,
        &AnalysisOptions {
            parallel_threshold: usize::MAX,
            ..AnalysisOptions::default()
        },
        &mut sequential_reporter,
    )
    .unwrap();

    let mut parallel_reporter = CollectingReporter::new();
    let parallel = analyze_scripts(
        &files,
        &AnalysisOptions {
            parallel_threshold: 1,
            ..AnalysisOptions::default()
        },
        &mut parallel_reporter,
    )
    .unwrap();

    assert_eq!(sequential.catalog, parallel.catalog);
    assert_eq!(sequential_reporter.diagnostics, parallel_reporter.diagnostics);
    assert_eq!(parallel_reporter.of_rule(&DUPLICATE_OBJECT).len(), 1);
    let shared = parallel.catalog.get_table("Sales", "dbo", "Shared").unwrap();
    assert!(shared.object.path.ends_with("t00.sql"));
}

#[test]
fn test_legacy_encoded_script() {
    init_tracing();
    let dir = ScriptDir::new();
    dir.write_bytes(
        "legacy.sql",
        b"USE Sales\r\nGO\r\n-- Cr\xE9\xE9 par l'ancien outil\r\nCREATE VIEW dbo.Summary AS SELECT 1 AS One",
    );
    let files = collect_sql_files(&dir.root).unwrap();
    let mut reporter = CollectingReporter::new();
    let analysis = analyze_scripts(&files, &AnalysisOptions::default(), &mut reporter).unwrap();
    assert!(analysis.catalog.get_view("Sales", "dbo", "Summary").is_some());
}
