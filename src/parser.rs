//! Formula parsing.
//!
//! Two pieces: the root-operation finder, which scans a balanced
//! sub-expression for the operator to place at the root of its subtree, and
//! the worklist builder, which applies the finder repeatedly to produce a
//! complete tree. There is no separate tokenizer pass; precedence falls out
//! of root selection. The builder uses an explicit FIFO worklist instead of
//! native recursion so deeply nested formulas cannot exhaust the stack.

use crate::ast::{is_operator_char, Arity, Ast, NodeKind};
use crate::error::SyntaxError;
use crate::validate::validate;
use crate::value_id::ValueId;
use std::collections::VecDeque;

/// Operator binding strength. Functions and `^` bind tightest (0), `*` and
/// `/` next (1), `+` and `-` loosest (2). The loosest-binding candidate at
/// paren depth 0 becomes the root of the current subtree; ties break to the
/// leftmost candidate.
fn precedence(op: &str) -> i32 {
    match op {
        "+" | "-" => 2,
        "*" | "/" => 1,
        _ => 0,
    }
}

/// Strip fully-enclosing redundant parentheses, repeatedly.
///
/// Only a leading `(` whose matching `)` is the final byte is redundant;
/// `(1)+(2)` keeps its parentheses.
fn trim_enclosing_parens(mut expr: &str) -> &str {
    loop {
        let bytes = expr.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
            return expr;
        }
        let mut depth = 0i32;
        let mut encloses_all = false;
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        encloses_all = i == bytes.len() - 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !encloses_all {
            return expr;
        }
        expr = &expr[1..bytes.len() - 1];
    }
}

/// Whether the function call starting at byte 0 (name of `name_len` bytes,
/// then its argument list) spans the entire expression. Only such a call can
/// be the root: anything to either side of a narrower call would have no
/// operator connecting it.
fn function_call_spans_all(expr: &str, name_len: usize) -> bool {
    let bytes = expr.as_bytes();
    if name_len >= bytes.len() || bytes[name_len] != b'(' {
        return false;
    }
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(name_len) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i == bytes.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

struct Candidate {
    op: String,
    pos: usize,
    prec: i32,
}

/// Find the root operation of a validated, balanced sub-expression and
/// slice out its operands.
///
/// Binary single-character operators split the text to their left and
/// right; a root function call splits its interior on depth-0 commas. An
/// expression with no viable root is not further decomposable.
fn find_root(expr: &str) -> Result<(String, Vec<String>), SyntaxError> {
    let expr = trim_enclosing_parens(expr);
    let bytes = expr.as_bytes();

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'(' {
            depth += 1;
            i += 1;
        } else if c == b')' {
            depth -= 1;
            i += 1;
        } else if c == b'[' {
            // names contain no structure; skip the whole span
            while i < bytes.len() && bytes[i] != b']' {
                i += 1;
            }
            i += 1;
        } else if depth == 0 && c.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            let op = expr[start..i].to_string();
            let prec = precedence(&op);
            candidates.push(Candidate {
                op,
                pos: start,
                prec,
            });
            // the '(' after the name raises depth on the next iteration,
            // which keeps the scan out of the argument list
        } else if depth == 0 && is_operator_char(c) {
            let op = (c as char).to_string();
            let prec = precedence(&op);
            candidates.push(Candidate { op, pos: i, prec });
            i += 1;
        } else {
            i += 1;
        }
    }

    // Loosest-binding candidate wins; candidates are in scan order, so
    // replacing only on strictly greater precedence keeps the leftmost of
    // any tie. A function is viable only when its call is the whole
    // expression.
    let mut best: Option<&Candidate> = None;
    for candidate in &candidates {
        let is_function = bytes[candidate.pos].is_ascii_alphabetic();
        if is_function
            && !(candidate.pos == 0 && function_call_spans_all(expr, candidate.op.len()))
        {
            continue;
        }
        if best.map_or(true, |b| candidate.prec > b.prec) {
            best = Some(candidate);
        }
    }
    let root = match best {
        Some(root) => root,
        None => {
            return Err(SyntaxError::IllformedExpression {
                expr: expr.to_string(),
                reason: "no operation found to decompose the expression".to_string(),
            })
        }
    };

    if is_operator_char(bytes[root.pos]) {
        let left = expr[..root.pos].to_string();
        let right = expr[root.pos + 1..].to_string();
        Ok((root.op.clone(), vec![left, right]))
    } else {
        // root function call: slice the interior on depth-0 commas
        let interior = &expr[root.op.len() + 1..expr.len() - 1];
        let mut operands = Vec::new();
        let mut depth = 0i32;
        let mut start = 0;
        for (i, &b) in interior.as_bytes().iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => depth -= 1,
                b',' if depth == 0 => {
                    operands.push(interior[start..i].to_string());
                    start = i + 1;
                }
                _ => {}
            }
        }
        operands.push(interior[start..].to_string());
        Ok((root.op.clone(), operands))
    }
}

/// Whether the text is a bracket-wrapped reference to another named value.
fn is_reference(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2
        && bytes[0] == b'['
        && bytes[bytes.len() - 1] == b']'
        && bytes.iter().filter(|&&b| b == b'[').count() == 1
}

/// Whether the text can only be a numeric literal.
fn is_literal_like(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

fn parse_literal(text: &str) -> Result<f64, SyntaxError> {
    let dots = text.bytes().filter(|&b| b == b'.').count();
    if dots > 1 {
        return Err(SyntaxError::InvalidNumberFormat {
            text: text.to_string(),
        });
    }
    text.parse::<f64>()
        .map_err(|_| SyntaxError::InvalidNumberFormat {
            text: text.to_string(),
        })
}

fn describe_arity(arity: Arity) -> String {
    match arity {
        Arity::Exactly(n) => format!("exactly {n}"),
        Arity::AtLeast(n) => format!("at least {n}"),
    }
}

/// Parse a normalized formula into a tree.
///
/// Runs the validator once up front, then drives [`find_root`] from an
/// explicit worklist of `(sub-expression, parent)` items. Construction is
/// all-or-nothing: any error aborts the whole build and no partial tree is
/// handed to the caller.
///
/// # Examples
///
/// ```rust
/// use charsheet::parser::build;
/// use charsheet::SyntaxError;
///
/// let ast = build("8*rounddown(2)+1").unwrap();
/// assert_eq!(
///     ast.pretty(),
///     "|__+\n    |__*\n    |   |__8\n    |   |__rounddown\n    |       |__2\n    |__1\n"
/// );
///
/// assert!(matches!(
///     build("(1*(8"),
///     Err(SyntaxError::UnbalancedParentheses { .. })
/// ));
/// ```
pub fn build(expr: &str) -> Result<Ast, SyntaxError> {
    validate(expr)?;

    let mut ast = Ast::empty();
    let mut work: VecDeque<(String, Option<crate::ast::NodeId>)> = VecDeque::new();
    work.push_back((expr.to_string(), None));

    while let Some((text, parent)) = work.pop_front() {
        let text = trim_enclosing_parens(&text);
        if text.is_empty() {
            return Err(SyntaxError::IllformedExpression {
                expr: expr.to_string(),
                reason: "an operand is empty".to_string(),
            });
        }

        let id = if is_literal_like(text) {
            ast.push(NodeKind::Literal(parse_literal(text)?))
        } else if is_reference(text) {
            let name = &text[1..text.len() - 1];
            ast.push(NodeKind::Reference(ValueId::new(name)))
        } else {
            let (op, operands) = find_root(text)?;
            let kind = match NodeKind::from_op(&op) {
                Some(kind) => kind,
                None => {
                    return Err(SyntaxError::IllformedExpression {
                        expr: expr.to_string(),
                        reason: format!("\"{op}\" cannot be used as an operation"),
                    })
                }
            };
            if !kind.arity().accepts(operands.len()) {
                return Err(SyntaxError::IllformedExpression {
                    expr: expr.to_string(),
                    reason: format!(
                        "operation \"{op}\" takes {} operands, got {}",
                        describe_arity(kind.arity()),
                        operands.len()
                    ),
                });
            }
            let id = ast.push(kind);
            for operand in operands {
                work.push_back((operand, Some(id)));
            }
            id
        };

        if let Some(parent) = parent {
            ast.attach(parent, id);
        }
    }

    Ok(ast)
}
