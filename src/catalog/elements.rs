//! Catalog element types

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::syntax::{CodeRegion, NodeId};
use crate::util::{ci_full_key, ci_key, starts_with_ci};

/// `(length)` or `(precision, scale)` suffix of a data type
static TYPE_PARAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)(?:\s*,\s*(\d+))?\)").unwrap());

/// Where and how a schema-bound object was defined
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseObject {
    pub database: String,
    pub schema: String,
    pub name: String,
    /// Creation statement in the defining script's tree
    pub node: NodeId,
    pub region: CodeRegion,
    pub path: PathBuf,
}

impl DatabaseObject {
    pub fn full_name_parts(&self) -> [&str; 3] {
        [&self.database, &self.schema, &self.name]
    }

    pub fn full_name(&self) -> String {
        self.full_name_parts().join(".")
    }

    /// Case-insensitive dedup key.
    pub fn key(&self) -> String {
        ci_full_key(&self.full_name_parts())
    }
}

/// Table column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// `None` for computed columns
    pub data_type: Option<String>,
    pub is_computed: bool,
    pub is_nullable: bool,
    /// NULL / NOT NULL written in the definition
    pub explicit_nullability: bool,
    pub is_identity: bool,
    pub default_value: Option<String>,
    /// Zero-based position in the table
    pub ordinal: usize,
    /// -1 for MAX
    pub max_length: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl ColumnInfo {
    pub fn new(name: String, data_type: Option<String>, ordinal: usize) -> Self {
        let (max_length, precision, scale) = data_type
            .as_deref()
            .map(type_params)
            .unwrap_or((None, None, None));
        Self {
            name,
            is_computed: data_type.is_none(),
            data_type,
            is_nullable: true,
            explicit_nullability: false,
            is_identity: false,
            default_value: None,
            ordinal,
            max_length,
            precision,
            scale,
        }
    }
}

/// Length, precision and scale from a type such as `NVARCHAR(50)` or
/// `DECIMAL(18, 2)`.
pub fn type_params(data_type: &str) -> (Option<i32>, Option<u8>, Option<u8>) {
    let base = data_type.trim_start_matches('[');
    if data_type.to_uppercase().contains("(MAX)") {
        return (Some(-1), None, None);
    }
    let fractional_seconds = starts_with_ci(base, "DATETIME2")
        || starts_with_ci(base, "TIME")
        || starts_with_ci(base, "DATETIMEOFFSET");

    if let Some(caps) = TYPE_PARAMS_RE.captures(data_type) {
        let first: Option<i32> = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let second: Option<u8> = caps.get(2).and_then(|m| m.as_str().parse().ok());
        return if starts_with_ci(base, "DECIMAL") || starts_with_ci(base, "NUMERIC") {
            (None, first.and_then(|v| u8::try_from(v).ok()), second)
        } else if fractional_seconds {
            (None, None, first.and_then(|v| u8::try_from(v).ok()))
        } else {
            (first, None, None)
        };
    }
    if fractional_seconds {
        // Fractional seconds default to 7 digits
        return (None, None, Some(7));
    }
    (None, None, None)
}

/// Index kind and property flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexFlags {
    pub unique: bool,
    pub clustered: bool,
    pub primary_key: bool,
    pub filtered: bool,
    pub spatial: bool,
    pub xml: bool,
    pub full_text: bool,
    pub column_store: bool,
    pub with_included_columns: bool,
}

/// Index on a table; primary key and unique constraints included
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    /// `name` is the index name, empty for anonymous constraints
    pub object: DatabaseObject,
    pub table: String,
    pub name: Option<String>,
    pub flags: IndexFlags,
    pub columns: Vec<String>,
    pub included_columns: Vec<String>,
}

impl IndexInfo {
    /// `db.schema.table.index`, case-insensitive. Anonymous constraints are
    /// keyed by their flags and column set instead of a name.
    pub fn key(&self) -> String {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut columns: Vec<String> = self.columns.iter().map(|c| ci_key(c)).collect();
                columns.sort();
                format!("({:?}:{})", self.flags, columns.join(","))
            }
        };
        ci_full_key(&[&self.object.database, &self.object.schema, &self.table, &name])
    }

    pub fn table_key(&self) -> String {
        ci_full_key(&[&self.object.database, &self.object.schema, &self.table])
    }

    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// One column of a foreign key
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyInfo {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub constraint_name: Option<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: Option<String>,
}

impl ForeignKeyInfo {
    pub fn table_key(&self) -> String {
        ci_full_key(&[&self.database, &self.schema, &self.table])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub object: DatabaseObject,
    pub columns: Vec<ColumnInfo>,
    columns_by_name: HashMap<String, usize>,
    pub indexes: Vec<IndexInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl TableInfo {
    pub fn new(object: DatabaseObject) -> Self {
        Self {
            object,
            columns: Vec::new(),
            columns_by_name: HashMap::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Append a column; a name already present is ignored.
    pub fn add_column(&mut self, mut column: ColumnInfo) {
        let key = ci_key(&column.name);
        if self.columns_by_name.contains_key(&key) {
            return;
        }
        column.ordinal = self.columns.len();
        self.columns_by_name.insert(key, self.columns.len());
        self.columns.push(column);
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns_by_name
            .get(&ci_key(name))
            .map(|&i| &self.columns[i])
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnInfo> {
        let index = *self.columns_by_name.get(&ci_key(name))?;
        self.columns.get_mut(index)
    }

    pub fn primary_key(&self) -> Option<&IndexInfo> {
        self.indexes.iter().find(|i| i.flags.primary_key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewInfo {
    pub object: DatabaseObject,
    /// Explicit column list, if any
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub data_type: String,
    pub is_output: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureInfo {
    pub object: DatabaseObject,
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionReturnInfo {
    Scalar(String),
    InlineTable,
    TableVariable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub object: DatabaseObject,
    pub parameters: Vec<ParameterInfo>,
    pub returns: FunctionReturnInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynonymInfo {
    pub object: DatabaseObject,
    /// Target name as written, e.g. `Crm.dbo.Customers`
    pub target: String,
}

/// A schema and the objects in it. Schemas without a CREATE SCHEMA
/// statement have no `definition`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
    pub database: String,
    pub name: String,
    pub authorization: Option<String>,
    pub definition: Option<DatabaseObject>,
    pub tables: BTreeMap<String, TableInfo>,
    pub views: BTreeMap<String, ViewInfo>,
    pub procedures: BTreeMap<String, ProcedureInfo>,
    pub functions: BTreeMap<String, FunctionInfo>,
    pub synonyms: BTreeMap<String, SynonymInfo>,
}

impl SchemaInfo {
    pub fn new(database: &str, name: &str) -> Self {
        Self {
            database: database.to_string(),
            name: name.to_string(),
            authorization: None,
            definition: None,
            tables: BTreeMap::new(),
            views: BTreeMap::new(),
            procedures: BTreeMap::new(),
            functions: BTreeMap::new(),
            synonyms: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.views.is_empty()
            && self.procedures.is_empty()
            && self.functions.is_empty()
            && self.synonyms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub schemas: BTreeMap<String, SchemaInfo>,
}

impl DatabaseInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schemas: BTreeMap::new(),
        }
    }

    /// Schema entry, created empty on first use.
    pub fn schema_entry(&mut self, name: &str) -> &mut SchemaInfo {
        let database = &self.name;
        self.schemas
            .entry(ci_key(name))
            .or_insert_with(|| SchemaInfo::new(database, name))
    }
}
