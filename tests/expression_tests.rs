// Integration tests for the operator-precedence expression parser

use ifjc::errors::ErrorKind;
use ifjc::parser::ast::{Expr, Literal, SourceLocation};
use ifjc::parser::parse::parse_expression_str;
use ifjc::semantic::checks::retype;
use ifjc::semantic::symtable::{ScopeStack, Symbol, VariableEntry};
use ifjc::semantic::types::{DataType, TypeSpec};
use std::rc::Rc;

fn scopes_with(vars: &[(&str, TypeSpec)]) -> ScopeStack {
    let mut scopes = ScopeStack::new();
    scopes.push_scope();
    for (name, ty) in vars {
        let name: Rc<str> = Rc::from(*name);
        let slot = scopes.fresh_slot(&name);
        let entry = VariableEntry::new(*ty, slot, SourceLocation::new(1, 1));
        scopes
            .declare(name, Symbol::Variable(entry))
            .expect("declaration failed");
    }
    scopes
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let mut scopes = ScopeStack::new();
    let (expr, info) = parse_expression_str("1 + 2 * 3", &mut scopes).expect("parse failed");

    assert_eq!(expr.to_string(), "(+ 1 (* 2 3))");
    assert_eq!(info.ty, DataType::I32);
    assert!(info.known);
    assert!(!info.nullable);
}

#[test]
fn test_parentheses_override_precedence() {
    let mut scopes = ScopeStack::new();
    let (expr, info) = parse_expression_str("(1 + 2) * 3", &mut scopes).expect("parse failed");

    assert_eq!(expr.to_string(), "(* (+ 1 2) 3)");
    assert_eq!(info.ty, DataType::I32);
}

#[test]
fn test_comparison_of_arithmetic() {
    let mut scopes = scopes_with(&[("n", TypeSpec::new(DataType::I32))]);
    let (expr, _) = parse_expression_str("n * 2 + 1 >= n - 3 / 1", &mut scopes).expect("parse failed");

    assert_eq!(expr.to_string(), "(>= (+ (* n 2) 1) (- n (/ 3 1)))");
    assert!(expr.is_relational());
}

#[test]
fn test_nullable_compared_with_null() {
    let mut scopes = scopes_with(&[("x", TypeSpec::nullable(DataType::I32))]);
    let (expr, info) = parse_expression_str("x == null", &mut scopes).expect("parse failed");

    assert_eq!(expr.to_string(), "(== x null)");
    assert_eq!(info.ty, DataType::Null);
    assert!(info.nullable);
    assert!(!info.known);
}

#[test]
fn test_null_comparison_is_symmetric() {
    let mut nullable = scopes_with(&[("x", TypeSpec::nullable(DataType::F64))]);
    assert!(parse_expression_str("null != x", &mut nullable).is_ok());
    assert!(parse_expression_str("x != null", &mut nullable).is_ok());

    let mut plain = scopes_with(&[("x", TypeSpec::new(DataType::F64))]);
    let left = parse_expression_str("null == x", &mut plain).unwrap_err();
    let right = parse_expression_str("x == null", &mut plain).unwrap_err();
    assert_eq!(left.kind, ErrorKind::Type);
    assert_eq!(right.kind, ErrorKind::Type);
}

#[test]
fn test_non_nullable_compared_with_null_is_type_error() {
    let mut scopes = scopes_with(&[("x", TypeSpec::new(DataType::I32))]);
    let err = parse_expression_str("x == null", &mut scopes).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(err.exit_code(), 7);
}

#[test]
fn test_int_literal_retyped_next_to_float() {
    let mut scopes = ScopeStack::new();
    let (expr, info) = parse_expression_str("1.0 + 2", &mut scopes).expect("parse failed");

    match &expr {
        Expr::Binary { right, .. } => {
            assert!(matches!(**right, Expr::Literal(Literal::Float(v), _) if v == 2.0));
        }
        other => panic!("Expected binary expression, got {:?}", other),
    }
    assert_eq!(info.ty, DataType::F64);
    assert!(info.known);
}

#[test]
fn test_fractional_float_is_not_convertible() {
    let mut scopes = scopes_with(&[("i", TypeSpec::new(DataType::I32))]);
    let err = parse_expression_str("i + 1.5", &mut scopes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);

    let (expr, info) = parse_expression_str("i + 2.0", &mut scopes).expect("parse failed");
    assert_eq!(expr.to_string(), "(+ i 2)");
    assert_eq!(info.ty, DataType::I32);
}

#[test]
fn test_chained_comparison_is_syntax_error() {
    let mut scopes = scopes_with(&[
        ("a", TypeSpec::new(DataType::I32)),
        ("b", TypeSpec::new(DataType::I32)),
        ("c", TypeSpec::new(DataType::I32)),
    ]);
    let err = parse_expression_str("a < b < c", &mut scopes).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_retype_twice_is_identity_on_integers() {
    let mut scopes = ScopeStack::new();
    for source in ["7", "1 + 2 * 3", "(10 - 4) / 2", "0"] {
        let (original, _) = parse_expression_str(source, &mut scopes).expect("parse failed");
        let mut expr = original.clone();
        retype(&mut expr).expect("first retype");
        retype(&mut expr).expect("second retype");
        assert_eq!(expr, original, "source: {}", source);
    }
}

#[test]
fn test_used_flag_set_by_reference() {
    let mut scopes = scopes_with(&[
        ("read", TypeSpec::new(DataType::I32)),
        ("unread", TypeSpec::new(DataType::I32)),
    ]);
    parse_expression_str("read + 1", &mut scopes).expect("parse failed");

    assert!(scopes.lookup_variable("read").unwrap().used);
    assert!(!scopes.lookup_variable("unread").unwrap().used);
    assert_eq!(scopes.pop_scope().unwrap_err().kind, ErrorKind::Unused);
}

#[test]
fn test_string_operands_rejected() {
    let mut scopes = scopes_with(&[("s", TypeSpec::new(DataType::U8Slice))]);
    for source in ["s + s", "s == s", "s < \"x\""] {
        let err = parse_expression_str(source, &mut scopes).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type, "source: {}", source);
    }
}

#[test]
fn test_builtin_call_as_operand() {
    let mut scopes = ScopeStack::new();
    let (expr, info) =
        parse_expression_str("ifj.length(\"abc\") * 2", &mut scopes).expect("parse failed");

    assert_eq!(expr.to_string(), "(* (call ifj.length \"abc\") 2)");
    assert_eq!(info.ty, DataType::I32);
    assert!(!info.known);
}

#[test]
fn test_nullable_call_result_in_arithmetic() {
    let mut scopes = ScopeStack::new();
    let err = parse_expression_str("ifj.readi32() + 1", &mut scopes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn test_shadowed_variable_type_follows_scope() {
    let mut scopes = scopes_with(&[("x", TypeSpec::new(DataType::I32))]);
    scopes.push_scope();
    let name: Rc<str> = Rc::from("x");
    let slot = scopes.fresh_slot(&name);
    let inner = VariableEntry::new(TypeSpec::new(DataType::F64), slot, SourceLocation::new(2, 1));
    scopes
        .declare(name, Symbol::Variable(inner))
        .expect("declaration failed");

    let (expr, info) = parse_expression_str("x + 1.5", &mut scopes).expect("parse failed");
    assert_eq!(info.ty, DataType::F64);
    match &expr {
        Expr::Binary { left, .. } => {
            assert!(matches!(&**left, Expr::Variable { slot, .. } if &**slot == "x$1"));
        }
        other => panic!("Expected binary expression, got {:?}", other),
    }
    scopes.pop_scope().expect("inner x was read");

    let err = parse_expression_str("x + 1.5", &mut scopes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn test_inexact_quotient_keeps_its_type() {
    let mut scopes = scopes_with(&[
        ("f", TypeSpec::new(DataType::F64)),
        ("i", TypeSpec::new(DataType::I32)),
    ]);

    let err = parse_expression_str("f + 7 / 2", &mut scopes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
    let err = parse_expression_str("i + 1.0 / 2.0", &mut scopes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);

    let (expr, info) = parse_expression_str("f + 8 / 2", &mut scopes).expect("parse failed");
    assert_eq!(expr.to_string(), "(+ f (/ 8.0 2.0))");
    assert_eq!(info.ty, DataType::F64);

    let (expr, info) = parse_expression_str("i + 4.0 / 2.0", &mut scopes).expect("parse failed");
    assert_eq!(expr.to_string(), "(+ i (/ 4 2))");
    assert_eq!(info.ty, DataType::I32);
}
