//! Formula normalization and validation.
//!
//! `normalize` brings free-form user text into canonical form; `validate`
//! scans the canonical text and rejects anything the parser could not turn
//! into a tree. Validation always runs to completion before any tree
//! construction is attempted and never mutates state.

use crate::ast::{is_function_name, is_operator_char};
use crate::error::SyntaxError;

/// Lowercase the text and strip all whitespace.
///
/// Every other layer of the crate operates on normalized text, so
/// `RoundDown(8 * [Creo Exp])` and `rounddown(8*[creoexp])` are the same
/// formula.
///
/// # Examples
///
/// ```rust
/// use charsheet::normalize;
///
/// assert_eq!(normalize("RoundDown(8 * [Creo Exp])"), "rounddown(8*[creoexp])");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Check a normalized formula for syntax errors without building anything.
///
/// Two passes: bracket balance, then operator/function/name placement.
/// The placement pass assumes balance, which the first pass guarantees.
///
/// # Examples
///
/// ```rust
/// use charsheet::{validate, SyntaxError};
///
/// assert!(validate("8*rounddown(2)+1").is_ok());
/// assert!(matches!(
///     validate("rounddown(1))"),
///     Err(SyntaxError::UnbalancedParentheses { .. })
/// ));
/// ```
pub fn validate(expr: &str) -> Result<(), SyntaxError> {
    check_balance(expr)?;
    check_placement(expr)
}

/// Stack-based balance check over `()`, `[]`, and `{}`.
///
/// A closing bracket that pairs with the wrong opener is
/// `InvalidOrderedParentheses`; a missing or surplus bracket is
/// `UnbalancedParentheses`.
fn check_balance(expr: &str) -> Result<(), SyntaxError> {
    let mut stack: Vec<char> = Vec::new();
    for cur in expr.chars() {
        match cur {
            '(' | '[' | '{' => stack.push(cur),
            ')' | ']' | '}' => {
                let open = match stack.pop() {
                    Some(open) => open,
                    None => {
                        return Err(SyntaxError::UnbalancedParentheses {
                            expr: expr.to_string(),
                        })
                    }
                };
                let closes = match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                if cur != closes {
                    return Err(SyntaxError::InvalidOrderedParentheses {
                        expr: expr.to_string(),
                        expected: open,
                        found: cur,
                    });
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(SyntaxError::UnbalancedParentheses {
            expr: expr.to_string(),
        });
    }
    Ok(())
}

/// Placement scan: every character must be legal for its position.
///
/// Bracketed spans hold ASCII letters only (names are already normalized);
/// letter runs outside brackets must be known functions immediately followed
/// by `(`; binary operators need an operand on both sides. Non-ASCII input
/// falls out through the same rules, which is what lets the parser index the
/// text by byte afterwards.
fn check_placement(expr: &str) -> Result<(), SyntaxError> {
    let bytes = expr.as_bytes();
    let mut words: Vec<String> = Vec::new();
    // end position of the most recent letter run, for pairing a word with
    // an empty argument list that follows it
    let mut last_word: Option<(usize, String)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'[' {
            let interior_start = i + 1;
            let interior_end = interior_start
                + bytes[interior_start..]
                    .iter()
                    .position(|&b| b == b']')
                    .unwrap_or(bytes.len() - interior_start);
            let mut letters = 0usize;
            for &b in &bytes[interior_start..interior_end] {
                if b.is_ascii_alphabetic() {
                    letters += 1;
                } else {
                    return Err(SyntaxError::InvalidVariableName {
                        name: expr[interior_start..interior_end].to_string(),
                    });
                }
            }
            if letters == 0 {
                return Err(SyntaxError::EmptyStateValueName {
                    expr: expr.to_string(),
                });
            }
            i = interior_end + 1;
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            let word = expr[start..i].to_string();
            if i >= bytes.len() || bytes[i] != b'(' {
                return Err(SyntaxError::IllformedExpression {
                    expr: expr.to_string(),
                    reason: format!("operation \"{word}\" is missing its parentheses"),
                });
            }
            last_word = Some((i, word.clone()));
            words.push(word);
        } else if c == b'(' && i + 1 < bytes.len() && bytes[i + 1] == b')' {
            // an empty argument list; decide whose it is
            return Err(match last_word {
                Some((end, ref word)) if end == i && is_function_name(word) => {
                    SyntaxError::EmptyOperation { op: word.clone() }
                }
                Some((end, ref word)) if end == i => {
                    SyntaxError::InvalidOperation { op: word.clone() }
                }
                _ => SyntaxError::EmptyOperation { op: "()".to_string() },
            });
        } else if is_operator_char(c) {
            let has_right = i + 1 < bytes.len()
                && (bytes[i + 1].is_ascii_alphanumeric()
                    || bytes[i + 1] == b'['
                    || bytes[i + 1] == b'(');
            if !has_right {
                return Err(SyntaxError::IllformedExpression {
                    expr: expr.to_string(),
                    reason: format!("operation '{}' is missing its right-hand side", c as char),
                });
            }
            let has_left = i > 0
                && (bytes[i - 1].is_ascii_alphanumeric()
                    || bytes[i - 1] == b']'
                    || bytes[i - 1] == b')');
            if !has_left {
                return Err(SyntaxError::IllformedExpression {
                    expr: expr.to_string(),
                    reason: format!("operation '{}' is missing its left-hand side", c as char),
                });
            }
            i += 1;
        } else if c.is_ascii_digit() || matches!(c, b'.' | b',' | b'(' | b')') {
            i += 1;
        } else {
            // '%', '?', '"', stray ']'/'}' survivors, non-ASCII, ...
            let op = expr[i..].chars().next().map(String::from).unwrap_or_default();
            return Err(SyntaxError::InvalidOperation { op });
        }
    }

    for word in words {
        if !is_function_name(&word) {
            return Err(SyntaxError::InvalidOperation { op: word });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("8 * [Creo Exp] + 1"), "8*[creoexp]+1");
        assert_eq!(normalize("RoundDown( 2 )"), "rounddown(2)");
        assert_eq!(normalize("\tMIN(1,\n2)"), "min(1,2)");
    }

    #[test]
    fn test_valid_expressions() {
        assert!(validate("8*2+1").is_ok());
        assert!(validate("8*rounddown(2)+1").is_ok());
        assert!(validate("rounddown((sqrt(8*[creoexp]+1)-1)/2)").is_ok());
        assert!(validate("min(1,2,3)").is_ok());
        assert!(validate("pow(2,10)").is_ok());
        assert!(validate("2^3").is_ok());
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(matches!(
            validate("(1*(8)"),
            Err(SyntaxError::UnbalancedParentheses { .. })
        ));
        assert!(matches!(
            validate("rounddown(1))"),
            Err(SyntaxError::UnbalancedParentheses { .. })
        ));
    }

    #[test]
    fn test_misordered_parentheses() {
        let err = validate("8*(1+[creo)]").unwrap_err();
        match err {
            SyntaxError::InvalidOrderedParentheses {
                expected, found, ..
            } => {
                assert_eq!(expected, '[');
                assert_eq!(found, ')');
            }
            other => panic!("expected InvalidOrderedParentheses, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_state_value_name() {
        assert!(matches!(
            validate("8+[]"),
            Err(SyntaxError::EmptyStateValueName { .. })
        ));
    }

    #[test]
    fn test_invalid_variable_name() {
        assert!(matches!(
            validate("8+[creo2]"),
            Err(SyntaxError::InvalidVariableName { .. })
        ));
        assert!(matches!(
            validate("[cr*eo]"),
            Err(SyntaxError::InvalidVariableName { .. })
        ));
    }

    #[test]
    fn test_operation_missing_parentheses() {
        // "sqrt 10" normalizes to "sqrt10"; the run ends at a digit
        assert!(matches!(
            validate("sqrt10"),
            Err(SyntaxError::IllformedExpression { .. })
        ));
        assert!(matches!(
            validate("8+rounddown"),
            Err(SyntaxError::IllformedExpression { .. })
        ));
    }

    #[test]
    fn test_unknown_operation() {
        assert!(matches!(
            validate("docoolstuff(29)"),
            Err(SyntaxError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_empty_operation() {
        assert!(matches!(
            validate("sqrt()"),
            Err(SyntaxError::EmptyOperation { .. })
        ));
        // unknown name with empty parens is an unknown operation, not an
        // empty one
        assert!(matches!(
            validate("foo()"),
            Err(SyntaxError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_binary_operator_missing_sides() {
        assert!(matches!(
            validate("8+"),
            Err(SyntaxError::IllformedExpression { .. })
        ));
        assert!(matches!(
            validate("*8"),
            Err(SyntaxError::IllformedExpression { .. })
        ));
        assert!(matches!(
            validate("8**2"),
            Err(SyntaxError::IllformedExpression { .. })
        ));
    }

    #[test]
    fn test_unexpected_characters() {
        assert!(matches!(
            validate("1%2"),
            Err(SyntaxError::InvalidOperation { .. })
        ));
        assert!(matches!(
            validate("8?1"),
            Err(SyntaxError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_operators_accept_all_operand_shapes() {
        // digits, brackets, parens and function names on either side
        assert!(validate("[creo]+8").is_ok());
        assert!(validate("8+[creo]").is_ok());
        assert!(validate("(8)+(1)").is_ok());
        assert!(validate("2+sqrt(4)").is_ok());
        assert!(validate("sqrt(4)+2").is_ok());
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert!(matches!(
            validate("8*2é"),
            Err(SyntaxError::InvalidOperation { .. })
        ));
        assert!(matches!(
            validate("[créo]"),
            Err(SyntaxError::InvalidVariableName { .. })
        ));
    }
}
