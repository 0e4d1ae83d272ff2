#![forbid(unsafe_code)]

//! The six-operator comparison grammar.
//!
//! An expression is `lhs OP rhs` where `lhs` is a data path and `rhs` a
//! literal. The operator is selected by testing `===`, `!==`, `==`, `!=`,
//! `>`, `<` for substring presence in that fixed order; the first operator
//! present anywhere in the string wins. Longer operators are listed before
//! their substrings so `===` never mis-splits as `==`.
//!
//! # Known limitation
//!
//! Substring selection means operand text containing an operator sequence
//! mis-splits, and an expression with several operators (`a != b === c`)
//! picks the highest-priority one regardless of position. This is the
//! accepted cost of keeping the grammar too small to inject through; it is
//! not repaired here.
//!
//! # Failure Modes
//!
//! | Input | Result |
//! |-------|--------|
//! | No supported operator (`x >= 5`) | `false` |
//! | Path resolution miss | comparison against an absent value, usually `false` |
//! | Empty right-hand side | parsed as numeric zero |

use serde_json::Value;
use tracing::debug;

use crate::DataRecord;
use crate::path::resolve_in_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Gt,
    Lt,
}

/// Priority order. Longer tokens first so `===` is found before `==`.
const OPERATORS: [(&str, Op); 6] = [
    ("===", Op::StrictEq),
    ("!==", Op::StrictNe),
    ("==", Op::LooseEq),
    ("!=", Op::LooseNe),
    (">", Op::Gt),
    ("<", Op::Lt),
];

/// A parsed right-hand-side literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// A quoted or bare string.
    Str(String),
    /// A numeric literal.
    Num(f64),
    /// `true` or `false`.
    Bool(bool),
}

/// Parse a trimmed right-hand-side literal.
///
/// Quoted text (single or double quotes) is stripped to a string; otherwise
/// numeric parses win, then `true`/`false`, then the raw text. An empty
/// operand parses as numeric zero.
#[must_use]
pub fn parse_literal(text: &str) -> Literal {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return Literal::Str(text[1..text.len() - 1].to_owned());
        }
    }
    if text.is_empty() {
        return Literal::Num(0.0);
    }
    if let Ok(num) = text.parse::<f64>() {
        return Literal::Num(num);
    }
    match text {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        _ => Literal::Str(text.to_owned()),
    }
}

/// Evaluate a comparison expression against a data record.
///
/// Returns `false` when no supported operator is present or when the
/// left-hand path does not satisfy the comparison.
#[must_use]
pub fn evaluate_expression(expr: &str, data: &DataRecord) -> bool {
    let Some((token, op)) = OPERATORS.iter().find(|(token, _)| expr.contains(token)) else {
        debug!(expr, "no supported operator in expression");
        return false;
    };

    let mut parts = expr.split(token);
    let lhs = parts.next().unwrap_or_default().trim();
    let rhs = parts.next().unwrap_or_default().trim();

    let left = resolve_in_record(data, lhs);
    let right = parse_literal(rhs);

    match op {
        Op::StrictEq => strict_eq(left, &right),
        Op::StrictNe => !strict_eq(left, &right),
        Op::LooseEq => loose_eq(left, &right),
        Op::LooseNe => !loose_eq(left, &right),
        Op::Gt => ordering(left, &right, |o| o == std::cmp::Ordering::Greater),
        Op::Lt => ordering(left, &right, |o| o == std::cmp::Ordering::Less),
    }
}

/// Same-type comparison only; absent values compare unequal to everything.
fn strict_eq(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (Some(Value::String(s)), Literal::Str(r)) => s == r,
        (Some(Value::Number(n)), Literal::Num(r)) => n.as_f64() == Some(*r),
        (Some(Value::Bool(b)), Literal::Bool(r)) => b == r,
        _ => false,
    }
}

/// Cross-type comparison with numeric coercion. Equal types fall back to the
/// strict rule; absent/null and composite values never compare equal to a
/// literal.
fn loose_eq(left: Option<&Value>, right: &Literal) -> bool {
    if strict_eq(left, right) {
        return true;
    }
    let same_type = matches!(
        (left, right),
        (Some(Value::String(_)), Literal::Str(_))
            | (Some(Value::Number(_)), Literal::Num(_))
            | (Some(Value::Bool(_)), Literal::Bool(_))
    );
    if same_type {
        return false;
    }
    match (value_to_num(left), literal_to_num(right)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

fn ordering(left: Option<&Value>, right: &Literal, check: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Some(Value::String(l)), Literal::Str(r)) = (left, right) {
        return check(l.as_str().cmp(r.as_str()));
    }
    match (value_to_num(left), literal_to_num(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).is_some_and(check),
        _ => false,
    }
}

fn value_to_num(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn literal_to_num(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Num(n) => Some(*n),
        Literal::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Literal::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> DataRecord {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn strict_equality_same_type() {
        let data = record(json!({"x": 5}));
        assert!(evaluate_expression("x === 5", &data));
        assert!(!evaluate_expression("x === 6", &data));
    }

    #[test]
    fn strict_equality_rejects_cross_type() {
        let data = record(json!({"x": 5}));
        assert!(!evaluate_expression("x === '5'", &data));
        assert!(evaluate_expression("x !== '5'", &data));
    }

    #[test]
    fn loose_equality_coerces_numeric_strings() {
        let data = record(json!({"x": 5}));
        assert!(evaluate_expression("x == '5'", &data));
        assert!(!evaluate_expression("x != '5'", &data));
    }

    #[test]
    fn loose_equality_same_type_stays_strict() {
        let data = record(json!({"x": "5"}));
        assert!(!evaluate_expression("x == '5.0'", &data));
    }

    #[test]
    fn path_into_array_of_objects() {
        let data = record(json!({"status": [{"label": "Done"}]}));
        assert!(evaluate_expression("status[0].label === 'Done'", &data));
        assert!(!evaluate_expression("status[0].label === 'Open'", &data));
    }

    #[test]
    fn unsupported_operator_is_false() {
        let data = record(json!({"x": 5}));
        assert!(!evaluate_expression("x >= 5", &data));
        assert!(!evaluate_expression("x", &data));
    }

    #[test]
    fn ordering_comparisons() {
        let data = record(json!({"x": 5, "name": "bob"}));
        assert!(evaluate_expression("x > 4", &data));
        assert!(evaluate_expression("x < 6", &data));
        assert!(!evaluate_expression("x > 5", &data));
        assert!(evaluate_expression("name > 'alice'", &data));
    }

    #[test]
    fn missing_path_resolves_false() {
        let data = record(json!({"x": 5}));
        assert!(!evaluate_expression("y === 5", &data));
        assert!(!evaluate_expression("y > 1", &data));
        // Strict not-equal against an absent value is vacuously true.
        assert!(evaluate_expression("y !== 5", &data));
    }

    #[test]
    fn boolean_literals() {
        let data = record(json!({"done": true}));
        assert!(evaluate_expression("done === true", &data));
        assert!(!evaluate_expression("done === false", &data));
        assert!(evaluate_expression("done == 1", &data));
    }

    #[test]
    fn priority_order_picks_triple_equals_first() {
        // Ambiguous by design: `===` wins over `!=` regardless of position.
        let data = record(json!({"a": "b !"}));
        assert!(!evaluate_expression("a != b === c", &data));
    }

    #[test]
    fn parse_literal_rules() {
        assert_eq!(parse_literal("'Done'"), Literal::Str("Done".to_owned()));
        assert_eq!(parse_literal("\"Done\""), Literal::Str("Done".to_owned()));
        assert_eq!(parse_literal("5"), Literal::Num(5.0));
        assert_eq!(parse_literal("-2.5"), Literal::Num(-2.5));
        assert_eq!(parse_literal("true"), Literal::Bool(true));
        assert_eq!(parse_literal("false"), Literal::Bool(false));
        assert_eq!(parse_literal("Done"), Literal::Str("Done".to_owned()));
        assert_eq!(parse_literal(""), Literal::Num(0.0));
    }
}
