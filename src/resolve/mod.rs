//! Name resolution for table and column references
//!
//! Both resolvers walk upward from a reference through the [`ParentIndex`]
//! and consult each enclosing [`Scope`]. A reference that cannot be tied to
//! an object resolves to `None`; ambiguity is reported through a
//! [`Reporter`](crate::report::Reporter).
//!
//! [`ParentIndex`]: crate::syntax::ParentIndex

mod column_resolver;
mod context;
mod enum_params;
mod references;
mod scope;
mod table_resolver;

pub use column_resolver::ColumnReferenceResolver;
pub use context::{AnalysisContext, DatabaseContext};
pub use enum_params::is_enum_parameter;
pub use references::{ColumnReference, SourceKind, TableOrViewReference};
pub use scope::{effective_alias, CteScope, Scope, ScopeEntry};
pub use table_resolver::TableReferenceResolver;
