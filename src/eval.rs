//! Expression evaluation.
//!
//! A pure, recursive post-order walk of a formula tree against two value
//! sources: the primary store (the sheet's own values) and a fallback
//! (campaign-level state). Evaluation never mutates the tree or either
//! source.

use crate::ast::{Ast, NodeId, NodeKind};
use crate::error::EvaluationError;
use crate::value_id::ValueId;
use std::collections::HashMap;

/// A source of named numeric values.
///
/// This is the seam between the evaluator and whatever holds the numbers:
/// the sheet's base/cached values, a [`crate::GameContext`], or a plain map
/// in a test.
///
/// # Examples
///
/// ```rust
/// use charsheet::{evaluate, ValueId, ValueLookup};
/// use charsheet::parser::build;
/// use std::collections::HashMap;
///
/// let mut values: HashMap<ValueId, f64> = HashMap::new();
/// values.insert(ValueId::new("creoexp"), 7.0);
///
/// let ast = build("8*[creoexp]+1").unwrap();
/// let empty: HashMap<ValueId, f64> = HashMap::new();
/// assert_eq!(evaluate(&ast, &values, &empty).unwrap(), 57.0);
/// ```
pub trait ValueLookup {
    /// The current value of `name`, if this source knows it.
    fn lookup(&self, name: &ValueId) -> Option<f64>;
}

impl ValueLookup for HashMap<ValueId, f64> {
    fn lookup(&self, name: &ValueId) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Evaluate a tree to a number.
///
/// References resolve against `primary` first, then `fallback`; a name
/// missing from both is [`EvaluationError::NonexistentStateValue`].
/// Division checks its right side for exactly zero. `Min`/`Max` fold their
/// children left to right.
pub fn evaluate(
    ast: &Ast,
    primary: &dyn ValueLookup,
    fallback: &dyn ValueLookup,
) -> Result<f64, EvaluationError> {
    if ast.is_empty() {
        return Ok(0.0);
    }
    eval_node(ast, ast.root(), primary, fallback)
}

fn eval_node(
    ast: &Ast,
    id: NodeId,
    primary: &dyn ValueLookup,
    fallback: &dyn ValueLookup,
) -> Result<f64, EvaluationError> {
    let children = ast.children(id);
    match ast.kind(id) {
        NodeKind::Literal(value) => Ok(*value),
        NodeKind::Reference(name) => primary
            .lookup(name)
            .or_else(|| fallback.lookup(name))
            .ok_or_else(|| EvaluationError::NonexistentStateValue(name.clone())),
        NodeKind::Add => {
            let (l, r) = eval_pair(ast, children, primary, fallback)?;
            Ok(l + r)
        }
        NodeKind::Sub => {
            let (l, r) = eval_pair(ast, children, primary, fallback)?;
            Ok(l - r)
        }
        NodeKind::Mul => {
            let (l, r) = eval_pair(ast, children, primary, fallback)?;
            Ok(l * r)
        }
        NodeKind::Div => {
            let (l, r) = eval_pair(ast, children, primary, fallback)?;
            if r == 0.0 {
                return Err(EvaluationError::DivideByZero);
            }
            Ok(l / r)
        }
        NodeKind::Pow => {
            let (l, r) = eval_pair(ast, children, primary, fallback)?;
            Ok(l.powf(r))
        }
        NodeKind::Sqrt => Ok(eval_single(ast, children, primary, fallback)?.sqrt()),
        NodeKind::RoundDown => Ok(eval_single(ast, children, primary, fallback)?.floor()),
        NodeKind::RoundUp => Ok(eval_single(ast, children, primary, fallback)?.ceil()),
        NodeKind::Round => Ok(eval_single(ast, children, primary, fallback)?.round()),
        NodeKind::Min => fold_children(ast, children, primary, fallback, f64::min),
        NodeKind::Max => fold_children(ast, children, primary, fallback, f64::max),
        NodeKind::Invalid => Err(EvaluationError::InvalidNode),
    }
}

/// Evaluate the two children of a binary node. The builder guarantees the
/// arity; a tree that violates it anyway is a defect, reported rather than
/// indexed into.
fn eval_pair(
    ast: &Ast,
    children: &[NodeId],
    primary: &dyn ValueLookup,
    fallback: &dyn ValueLookup,
) -> Result<(f64, f64), EvaluationError> {
    let &[left, right] = children else {
        return Err(EvaluationError::InvalidNode);
    };
    Ok((
        eval_node(ast, left, primary, fallback)?,
        eval_node(ast, right, primary, fallback)?,
    ))
}

fn eval_single(
    ast: &Ast,
    children: &[NodeId],
    primary: &dyn ValueLookup,
    fallback: &dyn ValueLookup,
) -> Result<f64, EvaluationError> {
    let &[only] = children else {
        return Err(EvaluationError::InvalidNode);
    };
    eval_node(ast, only, primary, fallback)
}

/// Left-to-right fold for `Min`/`Max`, which take two or more children.
fn fold_children(
    ast: &Ast,
    children: &[NodeId],
    primary: &dyn ValueLookup,
    fallback: &dyn ValueLookup,
    combine: fn(f64, f64) -> f64,
) -> Result<f64, EvaluationError> {
    let (first, rest) = match children.split_first() {
        Some(split) if children.len() >= 2 => split,
        _ => return Err(EvaluationError::InvalidNode),
    };
    let mut acc = eval_node(ast, *first, primary, fallback)?;
    for child in rest {
        acc = combine(acc, eval_node(ast, *child, primary, fallback)?);
    }
    Ok(acc)
}
