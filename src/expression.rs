//! Named formula values.
//!
//! An `Expression` couples a value name with the tree its formula parsed
//! into. The tree is owned exclusively by its expression; identical formula
//! text on two names still parses into two independent trees.

use crate::ast::Ast;
use crate::error::{EvaluationError, SyntaxError};
use crate::eval::{evaluate, ValueLookup};
use crate::parser::build;
use crate::validate::normalize;
use crate::value_id::ValueId;
use serde::{Deserialize, Serialize};

/// A named value computed from a formula.
///
/// The tree is absent until a syntactically valid formula has been set;
/// evaluating an expression with no tree yields `0.0` rather than an error,
/// so a partially initialized sheet still reads cleanly.
///
/// # Examples
///
/// ```rust
/// use charsheet::{Expression, ValueId};
/// use std::collections::HashMap;
///
/// let expr = Expression::parse(
///     ValueId::new("Creo"),
///     "RoundDown((sqrt(8 * [Creo Exp] + 1) - 1) / 2)",
/// )
/// .unwrap();
///
/// assert_eq!(expr.references(), vec![ValueId::new("creoexp")]);
///
/// let mut values = HashMap::new();
/// values.insert(ValueId::new("creoexp"), 10.0);
/// let empty: HashMap<charsheet::ValueId, f64> = HashMap::new();
/// assert_eq!(expr.evaluate(&values, &empty).unwrap(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    name: ValueId,
    root: Option<Ast>,
}

impl Expression {
    /// Create an expression with no formula yet.
    pub fn new(name: ValueId) -> Self {
        Self { name, root: None }
    }

    /// Create an expression and set its formula in one step.
    pub fn parse(name: ValueId, raw_formula: &str) -> Result<Self, SyntaxError> {
        let mut expression = Self::new(name);
        expression.set_formula(raw_formula)?;
        Ok(expression)
    }

    /// The value-store key this expression computes.
    pub fn name(&self) -> &ValueId {
        &self.name
    }

    /// Replace the formula. All-or-nothing: the new text is normalized,
    /// validated, and built to completion before the old tree is dropped,
    /// so a failed set leaves the previous formula in place.
    pub fn set_formula(&mut self, raw_formula: &str) -> Result<(), SyntaxError> {
        let ast = build(&normalize(raw_formula))?;
        self.root = Some(ast);
        Ok(())
    }

    /// The parsed tree, if a formula has been set.
    pub fn ast(&self) -> Option<&Ast> {
        self.root.as_ref()
    }

    /// The distinct names this expression reads, in first-appearance order.
    /// Empty while no formula is set.
    pub fn references(&self) -> Vec<ValueId> {
        self.root
            .as_ref()
            .map(Ast::references)
            .unwrap_or_default()
    }

    /// Evaluate against a primary and a fallback value source. An
    /// expression with no formula evaluates to `0.0`.
    pub fn evaluate(
        &self,
        primary: &dyn ValueLookup,
        fallback: &dyn ValueLookup,
    ) -> Result<f64, EvaluationError> {
        match &self.root {
            Some(ast) => evaluate(ast, primary, fallback),
            None => Ok(0.0),
        }
    }

    /// Debug rendering of the tree; empty while no formula is set.
    pub fn pretty_tree(&self) -> String {
        self.root.as_ref().map(Ast::pretty).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn empty() -> HashMap<ValueId, f64> {
        HashMap::new()
    }

    #[test]
    fn test_unset_expression_evaluates_to_zero() {
        let expr = Expression::new(ValueId::new("creo"));
        assert_eq!(expr.evaluate(&empty(), &empty()).unwrap(), 0.0);
        assert_eq!(expr.pretty_tree(), "");
        assert!(expr.references().is_empty());
    }

    #[test]
    fn test_set_formula_normalizes() {
        let expr = Expression::parse(ValueId::new("temp"), "8 * 2 + 1").unwrap();
        let expected = "|__+\n    |__*\n    |   |__8\n    |   |__2\n    |__1\n";
        assert_eq!(expr.pretty_tree(), expected);
    }

    #[test]
    fn test_failed_set_keeps_previous_formula() {
        let mut expr = Expression::parse(ValueId::new("temp"), "1+2").unwrap();
        let before = expr.clone();

        assert!(expr.set_formula("( 1 * (8)").is_err());
        assert_eq!(expr, before);
        assert_eq!(expr.evaluate(&empty(), &empty()).unwrap(), 3.0);
    }

    #[test]
    fn test_references_are_normalized() {
        let expr =
            Expression::parse(ValueId::new("soak"), "[Stamina] + [Tough Ness]").unwrap();
        assert_eq!(
            expr.references(),
            vec![ValueId::new("stamina"), ValueId::new("toughness")]
        );
    }

    #[test]
    fn test_identical_text_parses_to_equal_but_distinct_trees() {
        let a = Expression::parse(ValueId::new("a"), "[x]*2").unwrap();
        let b = Expression::parse(ValueId::new("b"), "[x]*2").unwrap();
        // structurally identical trees, separately owned
        assert_eq!(a.ast(), b.ast());
        assert_ne!(a.name(), b.name());
    }
}
