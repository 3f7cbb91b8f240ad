//! Source positions for fragments

use std::fmt;

/// A 1-based (line, column) position in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CodeLocation {
    pub line: usize,
    pub column: usize,
}

impl CodeLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<sqlparser::tokenizer::Location> for CodeLocation {
    fn from(location: sqlparser::tokenizer::Location) -> Self {
        Self {
            line: location.line as usize,
            column: location.column as usize,
        }
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An ordered (begin, end) pair of locations. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeRegion {
    pub begin: CodeLocation,
    pub end: CodeLocation,
}

impl CodeRegion {
    pub fn new(begin: CodeLocation, end: CodeLocation) -> Self {
        if end < begin {
            Self {
                begin: end,
                end: begin,
            }
        } else {
            Self { begin, end }
        }
    }

    /// Whether `location` falls inside this region (begin inclusive, end exclusive).
    pub fn is_around(&self, location: CodeLocation) -> bool {
        self.begin <= location && location < self.end
    }

    /// Smallest region covering both `self` and `other`.
    pub fn union(&self, other: &CodeRegion) -> CodeRegion {
        CodeRegion {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for CodeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}
