//! Pipeline benchmarks for rust-tsql-resolver
//!
//! Measures each stage over a generated project:
//! - Script parsing
//! - Catalog building
//! - Table and column resolution
//!
//! Run with: cargo bench
//! Compare against baseline: cargo bench -- --save-baseline before
//!                          (make changes)
//!                          cargo bench -- --baseline before

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_tsql_resolver::catalog::build_catalog;
use rust_tsql_resolver::parser::{collect_sql_files, parse_sql_files, Script};
use rust_tsql_resolver::resolve::{AnalysisContext, ColumnReferenceResolver, TableReferenceResolver};
use rust_tsql_resolver::syntax::NodeKind;
use rust_tsql_resolver::CollectingReporter;
use tempfile::TempDir;

/// Write `tables` table scripts and one procedure per table joining its neighbour.
fn generate_project(tables: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..tables {
        let next = (i + 1) % tables;
        let table = format!(
            "USE Sales\nGO\n\
             CREATE TABLE dbo.T{i} (\n\
                 Id INT NOT NULL CONSTRAINT PK_T{i} PRIMARY KEY,\n\
                 ParentId INT NULL,\n\
                 Amount DECIMAL(18, 2) NOT NULL DEFAULT (0),\n\
                 Label NVARCHAR(50) NULL\n\
             )\nGO\n\
             CREATE INDEX IX_T{i}_ParentId ON dbo.T{i} (ParentId) INCLUDE (Amount)\n"
        );
        std::fs::write(dir.path().join(format!("T{i:03}.sql")), table).unwrap();

        let procedure = format!(
            "USE Sales\nGO\n\
             CREATE PROCEDURE dbo.Load{i} @Min DECIMAL(18, 2) AS\n\
             BEGIN\n\
                 WITH Recent AS (SELECT a.Id, a.Amount FROM dbo.T{i} a WHERE a.Amount > @Min)\n\
                 SELECT r.Id, b.Label, DATEDIFF(day, GETDATE(), GETDATE()) AS Age\n\
                 FROM Recent r\n\
                 JOIN dbo.T{next} b ON b.ParentId = r.Id\n\
                 WHERE Label IS NOT NULL;\n\
                 UPDATE t SET t.Amount = 0 FROM dbo.T{i} t WHERE t.ParentId IS NULL;\n\
             END\n"
        );
        std::fs::write(dir.path().join(format!("P{i:03}.sql")), procedure).unwrap();
    }
    dir
}

/// Resolve every table and column reference in `scripts`.
fn resolve_all(scripts: &[Script], reporter: &mut CollectingReporter) -> usize {
    let mut resolved = 0;
    for script in scripts {
        let ctx = AnalysisContext::new(script, "dbo");
        let tables = TableReferenceResolver::new(&ctx);
        let columns = ColumnReferenceResolver::new(&ctx);
        for node in ctx.tree.walk() {
            let hit = match ctx.kind(node) {
                NodeKind::NamedTableReference { .. } => tables.resolve(node, reporter).is_some(),
                NodeKind::ColumnReference { .. } => columns.resolve(node, reporter).is_some(),
                _ => false,
            };
            resolved += usize::from(hit);
        }
    }
    resolved
}

/// Benchmark SQL file parsing
fn bench_sql_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_parsing");

    for tables in [10, 100] {
        let project = generate_project(tables);
        let files = collect_sql_files(project.path()).unwrap();
        group.throughput(Throughput::Elements(files.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(files.len()), &files, |b, files| {
            b.iter(|| parse_sql_files(black_box(files)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark catalog building
fn bench_catalog_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_building");

    for tables in [10, 100] {
        let project = generate_project(tables);
        let files = collect_sql_files(project.path()).unwrap();
        let scripts = parse_sql_files(&files).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(scripts.len()), &scripts, |b, scripts| {
            b.iter(|| {
                let mut reporter = CollectingReporter::new();
                build_catalog(black_box(scripts), "dbo", &mut reporter).unwrap()
            })
        });
    }

    group.finish();
}

/// Benchmark reference resolution
fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for tables in [10, 100] {
        let project = generate_project(tables);
        let files = collect_sql_files(project.path()).unwrap();
        let scripts = parse_sql_files(&files).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(scripts.len()), &scripts, |b, scripts| {
            b.iter(|| {
                let mut reporter = CollectingReporter::new();
                resolve_all(black_box(scripts), &mut reporter)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sql_parsing,
    bench_catalog_building,
    bench_resolution,
);

criterion_main!(benches);
