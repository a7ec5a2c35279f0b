//! Error types for formula parsing and evaluation.
//!
//! Two disjoint taxonomies: `SyntaxError` for formula text that cannot be
//! turned into a tree (or an assignment the dependency graph must reject),
//! and `EvaluationError` for a valid tree that cannot produce a number
//! against the current state. The core returns errors to its caller; it
//! never logs or suppresses them.

use crate::value_id::ValueId;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[ValueId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised while validating or parsing a formula, or while rejecting
/// an expression assignment. None of these leave the store or a partially
/// built tree behind.
///
/// # Examples
///
/// ```rust
/// use charsheet::{Expression, SyntaxError, ValueId};
///
/// let mut e = Expression::new(ValueId::new("temp"));
/// let err = e.set_formula("( 1 * (8)").unwrap_err();
/// assert!(matches!(err, SyntaxError::UnbalancedParentheses { .. }));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    /// An opening bracket has no closing pair, or vice versa.
    #[error("unbalanced parentheses in expression \"{expr}\"")]
    UnbalancedParentheses { expr: String },

    /// Brackets close in the wrong order, e.g. `8 * (1 + 2]`.
    #[error(
        "parentheses are not ordered correctly in expression \"{expr}\": \
         expected a closing brace for '{expected}' but found '{found}'"
    )]
    InvalidOrderedParentheses {
        expr: String,
        expected: char,
        found: char,
    },

    /// A bracketed span contains no name at all, e.g. `8 + []`.
    #[error("expression \"{expr}\" has an empty name within brackets []")]
    EmptyStateValueName { expr: String },

    /// The expression cannot be decomposed into operations and operands.
    #[error("ill-formed expression \"{expr}\": {reason}")]
    IllformedExpression { expr: String, reason: String },

    /// An operation that does not exist, e.g. `docoolstuff(29)` or `1 % 2`.
    #[error("expression contains an operation that is not supported: \"{op}\"")]
    InvalidOperation { op: String },

    /// A bracketed name holds something other than letters, e.g. `[creo*2]`.
    #[error("variable name \"{name}\" contains invalid characters")]
    InvalidVariableName { name: String },

    /// An operation with no parameters, e.g. `sqrt()`.
    #[error("operation \"{op}\" was given no parameters")]
    EmptyOperation { op: String },

    /// A numeric literal that is not a valid number, e.g. `8.0.0`.
    #[error("\"{text}\" is not a valid number")]
    InvalidNumberFormat { text: String },

    /// Assigning the expression would make a value depend on itself.
    ///
    /// Contains the dependency path that closes the loop.
    #[error("cyclic dependency: {}", format_cycle_path(.path))]
    CyclicDependency { path: Vec<ValueId> },
}

/// Errors raised while evaluating a syntactically valid tree against the
/// current state. These occur only during reads and cascades, never during
/// parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// A referenced name exists in neither the sheet nor the fallback
    /// context.
    #[error("no state value named \"{0}\"")]
    NonexistentStateValue(ValueId),

    /// The tree contains a node that cannot be evaluated. A stored
    /// expression never contains one; hitting this is a defect, not a
    /// user mistake.
    #[error("expression tree contains an invalid node")]
    InvalidNode,

    /// The right-hand side of a division evaluated to exactly zero.
    #[error("division by zero")]
    DivideByZero,

    /// A cascade reached a base value, which must never be recomputed from
    /// its dependents.
    #[error("base value \"{0}\" appears as a dependent of another value")]
    InvertedDependency(ValueId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_display() {
        let a = ValueId::new("creo");
        let b = ValueId::new("creoexp");
        let err = SyntaxError::CyclicDependency {
            path: vec![a.clone(), b.clone(), a.clone()],
        };
        assert_eq!(err.to_string(), "cyclic dependency: creo -> creoexp -> creo");
    }

    #[test]
    fn test_empty_cycle_display() {
        let err = SyntaxError::CyclicDependency { path: vec![] };
        assert!(err.to_string().contains("(empty cycle)"));
    }

    #[test]
    fn test_evaluation_error_display() {
        let err = EvaluationError::NonexistentStateValue(ValueId::new("Creo Exp"));
        assert!(err.to_string().contains("creoexp"));
    }

    #[test]
    fn test_taxonomies_are_distinct_types() {
        // A syntax error and an evaluation error never unify; the compiler
        // enforces it. This just pins the Display texts apart.
        let s = SyntaxError::InvalidOperation { op: "%".into() };
        let e = EvaluationError::InvalidNode;
        assert_ne!(s.to_string(), e.to_string());
    }
}
