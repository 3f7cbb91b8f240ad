//! Resolved identities of table and column references

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::syntax::NodeId;
use crate::util::ci_full_key;

/// Where a resolved reference comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    TableOrView,
    Cte,
    TempTable,
    /// Reserved: no resolution path produces it
    DerivedTable,
    /// Unqualified column in a single-table scope
    NotDetermined,
}

/// Fully qualified identity of a table, view, CTE or temp table reference.
///
/// Equality and hashing use the three-part name, case-insensitively.
#[derive(Debug, Clone)]
pub struct TableOrViewReference {
    pub database: Option<String>,
    pub schema: String,
    pub name: String,
    pub kind: SourceKind,
    /// Table reference node the identity was taken from
    pub node: NodeId,
    pub owning_object: Option<String>,
}

impl TableOrViewReference {
    /// `database.schema.name`, with an empty database part when unknown.
    pub fn full_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.database.as_deref().unwrap_or_default(),
            self.schema,
            self.name
        )
    }

    fn key(&self) -> String {
        ci_full_key(&[
            self.database.as_deref().unwrap_or_default(),
            &self.schema,
            &self.name,
        ])
    }
}

impl PartialEq for TableOrViewReference {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TableOrViewReference {}

impl Hash for TableOrViewReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for TableOrViewReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Resolved owner of a column reference.
///
/// Equality and hashing use the four-part name, case-insensitively.
#[derive(Debug, Clone)]
pub struct ColumnReference {
    pub database: Option<String>,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub kind: SourceKind,
    /// The column reference node
    pub node: NodeId,
    pub owning_object: Option<String>,
    /// Alias the owning table was bound under, if any
    pub alias: Option<String>,
}

impl ColumnReference {
    pub(crate) fn from_table(
        table: TableOrViewReference,
        column: String,
        node: NodeId,
        alias: Option<String>,
    ) -> Self {
        Self {
            database: table.database,
            schema: table.schema,
            table: table.name,
            column,
            kind: table.kind,
            node,
            owning_object: table.owning_object,
            alias,
        }
    }

    pub fn full_name(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.database.as_deref().unwrap_or_default(),
            self.schema,
            self.table,
            self.column
        )
    }

    fn key(&self) -> String {
        ci_full_key(&[
            self.database.as_deref().unwrap_or_default(),
            &self.schema,
            &self.table,
            &self.column,
        ])
    }
}

impl PartialEq for ColumnReference {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ColumnReference {}

impl Hash for ColumnReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
