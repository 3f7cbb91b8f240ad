//! Function arguments that take keyword-like values rather than columns
//!
//! `DATEADD(day, 1, x)` parses `day` as a column reference; it must not be
//! resolved against the tables in scope.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::util::ci_key;

/// Lowercase function name -> zero-based argument positions
static ENUM_PARAMETERS: LazyLock<HashMap<&'static str, &'static [usize]>> = LazyLock::new(|| {
    HashMap::from([
        ("dateadd", &[0][..]),
        ("datediff", &[0][..]),
        ("datediff_big", &[0][..]),
        ("datename", &[0][..]),
        ("datepart", &[0][..]),
        ("datetrunc", &[0][..]),
        ("date_bucket", &[0][..]),
    ])
});

/// Whether argument `position` of `function` is an enumeration value.
pub fn is_enum_parameter(function: &str, position: usize) -> bool {
    ENUM_PARAMETERS
        .get(ci_key(function).as_str())
        .is_some_and(|positions| positions.contains(&position))
}
