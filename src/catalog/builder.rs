//! Build the cross-script catalog from parsed scripts
//!
//! Extraction runs per script, in parallel for larger script sets. The merge
//! that follows is single-threaded and walks definitions in script order, so
//! "first seen" always means the earliest script in the input slice.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::elements::{
    DatabaseInfo, DatabaseObject, ForeignKeyInfo, FunctionInfo, IndexInfo, ProcedureInfo,
    SchemaInfo, SynonymInfo, TableInfo, ViewInfo,
};
use super::extractors::{extract_script, SchemaDefinition, ScriptDefinitions, TableAddition};
use super::Catalog;
use crate::parser::{Script, PARALLEL_THRESHOLD};
use crate::report::{Diagnostic, Reporter, DUPLICATE_OBJECT};
use crate::util::ci_key;

/// A definition that takes part in duplicate detection
trait Definition {
    fn kind(&self) -> &'static str;

    fn origin(&self) -> &DatabaseObject;

    fn key(&self) -> String {
        self.origin().key()
    }

    fn display_name(&self) -> String {
        self.origin().full_name()
    }
}

impl Definition for SchemaDefinition {
    fn kind(&self) -> &'static str {
        "Schema"
    }

    fn origin(&self) -> &DatabaseObject {
        &self.object
    }
}

impl Definition for IndexInfo {
    fn kind(&self) -> &'static str {
        "Index"
    }

    fn origin(&self) -> &DatabaseObject {
        &self.object
    }

    fn key(&self) -> String {
        IndexInfo::key(self)
    }

    fn display_name(&self) -> String {
        let table = format!(
            "{}.{}.{}",
            self.object.database, self.object.schema, self.table
        );
        match &self.name {
            Some(name) => format!("{table}.{name}"),
            None => format!("{table} ({})", self.columns.join(", ")),
        }
    }
}

/// Tables, views, procedures, functions and synonyms share one name space
#[derive(Debug)]
enum SchemaObject {
    Table(TableInfo),
    View(ViewInfo),
    Procedure(ProcedureInfo),
    Function(FunctionInfo),
    Synonym(SynonymInfo),
}

impl Definition for SchemaObject {
    fn kind(&self) -> &'static str {
        match self {
            SchemaObject::Table(_) => "Table",
            SchemaObject::View(_) => "View",
            SchemaObject::Procedure(_) => "Procedure",
            SchemaObject::Function(_) => "Function",
            SchemaObject::Synonym(_) => "Synonym",
        }
    }

    fn origin(&self) -> &DatabaseObject {
        match self {
            SchemaObject::Table(t) => &t.object,
            SchemaObject::View(v) => &v.object,
            SchemaObject::Procedure(p) => &p.object,
            SchemaObject::Function(f) => &f.object,
            SchemaObject::Synonym(s) => &s.object,
        }
    }
}

impl SchemaObject {
    /// Every object of one script, in source order.
    fn of_script(defs: &mut ScriptDefinitions) -> Vec<SchemaObject> {
        let mut objects: Vec<SchemaObject> = std::mem::take(&mut defs.tables)
            .into_iter()
            .map(SchemaObject::Table)
            .chain(std::mem::take(&mut defs.views).into_iter().map(SchemaObject::View))
            .chain(
                std::mem::take(&mut defs.procedures)
                    .into_iter()
                    .map(SchemaObject::Procedure),
            )
            .chain(
                std::mem::take(&mut defs.functions)
                    .into_iter()
                    .map(SchemaObject::Function),
            )
            .chain(
                std::mem::take(&mut defs.synonyms)
                    .into_iter()
                    .map(SchemaObject::Synonym),
            )
            .collect();
        objects.sort_by_key(|o| o.origin().region.begin);
        objects
    }
}

/// Build the catalog for `scripts` in their given order.
pub fn build_catalog(
    scripts: &[Script],
    default_schema: &str,
    reporter: &mut dyn Reporter,
) -> Result<Catalog> {
    build_catalog_with_threshold(scripts, default_schema, PARALLEL_THRESHOLD, reporter)
}

pub(crate) fn build_catalog_with_threshold(
    scripts: &[Script],
    default_schema: &str,
    parallel_threshold: usize,
    reporter: &mut dyn Reporter,
) -> Result<Catalog> {
    let per_script: Vec<ScriptDefinitions> = if scripts.len() >= parallel_threshold {
        scripts
            .par_iter()
            .map(|script| extract_script(script, default_schema))
            .collect::<Result<_, _>>()?
    } else {
        scripts
            .iter()
            .map(|script| extract_script(script, default_schema))
            .collect::<Result<_, _>>()?
    };

    let mut all = ScriptDefinitions::default();
    let mut objects = Vec::new();
    for mut defs in per_script {
        objects.extend(SchemaObject::of_script(&mut defs));
        all.schemas.extend(defs.schemas);
        all.indexes.extend(defs.indexes);
        all.foreign_keys.extend(defs.foreign_keys);
        all.additions.extend(defs.additions);
    }

    let indexes = dedup(all.indexes, reporter);

    let mut builder = CatalogBuilder::default();
    for object in dedup(objects, reporter) {
        builder.insert(object);
    }
    for definition in dedup(all.schemas, reporter) {
        let schema = builder.schema(&definition.object.database, &definition.object.name);
        schema.authorization = definition.authorization;
        schema.definition = Some(definition.object);
    }

    for index in indexes {
        builder.attach_index(index);
    }
    for fk in all.foreign_keys {
        builder.attach_foreign_key(fk);
    }
    for addition in all.additions {
        builder.apply_addition(addition);
    }
    builder.mark_primary_keys_not_null();

    let catalog = Catalog::new(builder.databases);
    info!(
        scripts = scripts.len(),
        databases = catalog.databases().count(),
        tables = catalog.tables().count(),
        "Built schema catalog"
    );
    Ok(catalog)
}

/// Keep the first definition of every key; report each colliding group once.
fn dedup<T: Definition>(definitions: Vec<T>, reporter: &mut dyn Reporter) -> Vec<T> {
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for definition in definitions {
        match by_key.get(&definition.key()) {
            Some(&i) => groups[i].push(definition),
            None => {
                by_key.insert(definition.key(), groups.len());
                groups.push(vec![definition]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|group| {
            if group.len() > 1 {
                report_duplicates(&group, reporter);
            }
            group.into_iter().next()
        })
        .collect()
}

fn report_duplicates<T: Definition>(group: &[T], reporter: &mut dyn Reporter) {
    let first = &group[0];
    let second = group[1].origin();
    let paths = group
        .iter()
        .map(|d| d.origin().path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    warn!(
        kind = first.kind(),
        name = %first.display_name(),
        count = group.len(),
        "Duplicate definitions, keeping the first"
    );
    reporter.report(Diagnostic {
        rule: &DUPLICATE_OBJECT,
        database: Some(second.database.clone()),
        path: second.path.clone(),
        owning_object: None,
        region: second.region,
        args: vec![first.kind().to_string(), first.display_name(), paths],
    });
}

#[derive(Default)]
struct CatalogBuilder {
    databases: BTreeMap<String, DatabaseInfo>,
}

impl CatalogBuilder {
    /// Schema entry, creating the database and schema on first use.
    fn schema(&mut self, database: &str, schema: &str) -> &mut SchemaInfo {
        self.databases
            .entry(ci_key(database))
            .or_insert_with(|| DatabaseInfo::new(database))
            .schema_entry(schema)
    }

    fn insert(&mut self, object: SchemaObject) {
        let (database, schema, key) = {
            let origin = object.origin();
            (origin.database.clone(), origin.schema.clone(), ci_key(&origin.name))
        };
        let schema = self.schema(&database, &schema);
        match object {
            SchemaObject::Table(table) => {
                schema.tables.insert(key, table);
            }
            SchemaObject::View(view) => {
                schema.views.insert(key, view);
            }
            SchemaObject::Procedure(procedure) => {
                schema.procedures.insert(key, procedure);
            }
            SchemaObject::Function(function) => {
                schema.functions.insert(key, function);
            }
            SchemaObject::Synonym(synonym) => {
                schema.synonyms.insert(key, synonym);
            }
        }
    }

    fn table_mut(&mut self, database: &str, schema: &str, table: &str) -> Option<&mut TableInfo> {
        self.databases
            .get_mut(&ci_key(database))?
            .schemas
            .get_mut(&ci_key(schema))?
            .tables
            .get_mut(&ci_key(table))
    }

    fn attach_index(&mut self, index: IndexInfo) {
        let (database, schema, table) = (
            index.object.database.clone(),
            index.object.schema.clone(),
            index.table.clone(),
        );
        match self.table_mut(&database, &schema, &table) {
            Some(owner) => owner.indexes.push(index),
            None => debug!(table = %index.table_key(), "Index on an unknown table dropped"),
        }
    }

    fn attach_foreign_key(&mut self, fk: ForeignKeyInfo) {
        let (database, schema, table) = (fk.database.clone(), fk.schema.clone(), fk.table.clone());
        match self.table_mut(&database, &schema, &table) {
            Some(owner) => owner.foreign_keys.push(fk),
            None => debug!(table = %fk.table_key(), "Foreign key on an unknown table dropped"),
        }
    }

    fn apply_addition(&mut self, addition: TableAddition) {
        let Some(owner) = self.table_mut(&addition.database, &addition.schema, &addition.table)
        else {
            debug!(
                table = %format!("{}.{}.{}", addition.database, addition.schema, addition.table),
                "ALTER TABLE on an unknown table dropped"
            );
            return;
        };
        for column in addition.columns {
            owner.add_column(column);
        }
        for (column, value) in addition.defaults {
            if let Some(target) = owner.column_mut(&column) {
                target.default_value = Some(value);
            }
        }
    }

    /// Primary key columns are NOT NULL unless declared otherwise.
    fn mark_primary_keys_not_null(&mut self) {
        let tables = self
            .databases
            .values_mut()
            .flat_map(|d| d.schemas.values_mut())
            .flat_map(|s| s.tables.values_mut());
        for table in tables {
            let key_columns = table
                .primary_key()
                .map(|pk| pk.columns.clone())
                .unwrap_or_default();
            for name in key_columns {
                if let Some(column) = table.column_mut(&name) {
                    if !column.explicit_nullability {
                        column.is_nullable = false;
                    }
                }
            }
        }
    }
}
