//! Common test utilities for rust-tsql-resolver tests

use std::fs;
use std::path::PathBuf;

use rust_tsql_resolver::resolve::AnalysisContext;
use rust_tsql_resolver::syntax::{NodeId, NodeKind};
use tempfile::TempDir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Route library tracing to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// Scripts written to a temporary directory for on-disk tests
pub struct ScriptDir {
    /// Kept to prevent temp directory cleanup until ScriptDir is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl ScriptDir {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write `content` to `relative` under the root, creating directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create script directory");
        }
        fs::write(&path, content).expect("Failed to write script");
        path
    }

    pub fn write_bytes(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.root.join(relative);
        fs::write(&path, content).expect("Failed to write script");
        path
    }
}

/// Every node of the given kind name, in pre-order.
pub fn nodes_of(ctx: &AnalysisContext<'_>, kind: &str) -> Vec<NodeId> {
    ctx.tree
        .walk()
        .into_iter()
        .filter(|id| ctx.kind(*id).name() == kind)
        .collect()
}

/// Column references whose token text equals `text`, in pre-order.
pub fn columns_with_text(ctx: &AnalysisContext<'_>, text: &str) -> Vec<NodeId> {
    nodes_of(ctx, "ColumnReference")
        .into_iter()
        .filter(|id| ctx.tree.text_of(*id) == text)
        .collect()
}

/// Named table reference with the given base name.
pub fn table_named(ctx: &AnalysisContext<'_>, name: &str) -> NodeId {
    nodes_of(ctx, "NamedTableReference")
        .into_iter()
        .find(|id| {
            matches!(ctx.kind(*id), NodeKind::NamedTableReference { name: n, .. } if n.base.matches(name))
        })
        .unwrap_or_else(|| panic!("no table reference named {name}"))
}
