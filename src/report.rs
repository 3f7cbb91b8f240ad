//! Diagnostic sink used by the resolvers and the catalog builder
//!
//! Rule ids are stable: never rename them, only add new ones.

use std::fmt;
use std::path::PathBuf;

use crate::syntax::CodeRegion;

/// A reportable rule with a message template.
///
/// `{0}`, `{1}`, ... in the template are filled from [`Diagnostic::args`].
#[derive(Debug, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: &'static str,
    pub template: &'static str,
}

/// Join member or column without the alias needed to tell tables apart
pub static MISSING_ALIAS: RuleDefinition = RuleDefinition {
    id: "SR0001",
    template: "Reference '{0}' needs a table alias to be resolved unambiguously",
};

/// Object defined by more than one script
pub static DUPLICATE_OBJECT: RuleDefinition = RuleDefinition {
    id: "SR0002",
    template: "{0} '{1}' is defined more than once: {2}",
};

impl fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}

/// One finding
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule: &'static RuleDefinition,
    /// Database active at the finding, if known
    pub database: Option<String>,
    pub path: PathBuf,
    /// Enclosing procedure, function, view or trigger
    pub owning_object: Option<String>,
    pub region: CodeRegion,
    pub args: Vec<String>,
}

impl Diagnostic {
    /// Rule template with `{n}` placeholders filled from `args`.
    pub fn message(&self) -> String {
        let mut message = self.rule.template.to_string();
        for (i, arg) in self.args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): {}: {}",
            self.path.display(),
            self.region.begin,
            self.rule.id,
            self.message()
        )
    }
}

/// Receives diagnostics. Callers never branch on what a reporter does.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Keeps every diagnostic in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics raised for one rule.
    pub fn of_rule(&self, rule: &RuleDefinition) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.rule.id == rule.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
