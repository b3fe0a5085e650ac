#![allow(dead_code)]
//! Shared helpers for `dotted-syntax` integration tests.

use dotted_syntax::*;

pub fn parse_ok(input: &str) -> Expr<Atom> {
    parse_expr(input, &Syntax::default())
        .unwrap()
        .unwrap_or_else(|| panic!("expected an expression for {input:?}"))
}

pub fn parse_with(input: &str, syntax: &Syntax) -> Expr<Atom> {
    parse_expr(input, syntax)
        .unwrap()
        .unwrap_or_else(|| panic!("expected an expression for {input:?}"))
}

pub fn parse_err(input: &str) -> SyntaxError {
    parse_expr(input, &Syntax::default()).unwrap_err()
}

pub fn as_and<T: std::fmt::Debug>(expr: &Expr<T>) -> &Vec<Expr<T>> {
    match expr {
        Expr::And(parts) => parts,
        other => panic!("expected And, got: {other:?}"),
    }
}

pub fn as_or<T: std::fmt::Debug>(expr: &Expr<T>) -> &Vec<Expr<T>> {
    match expr {
        Expr::Or(parts) => parts,
        other => panic!("expected Or, got: {other:?}"),
    }
}

pub fn as_not<T: std::fmt::Debug>(expr: &Expr<T>) -> &Expr<T> {
    match expr {
        Expr::Not(inner) => inner,
        other => panic!("expected Not, got: {other:?}"),
    }
}

pub fn atom_is(expr: &Expr<Atom>, expected: &str) {
    match expr {
        Expr::Leaf(atom) => assert_eq!(atom.text, expected),
        other => panic!("expected Leaf, got: {other:?}"),
    }
}

/// Asserts that every And/Or node has at least two children.
pub fn assert_well_formed<T: std::fmt::Debug>(expr: &Expr<T>) {
    match expr {
        Expr::And(parts) | Expr::Or(parts) => {
            assert!(parts.len() >= 2, "degenerate node: {expr:?}");
            parts.iter().for_each(assert_well_formed);
        }
        Expr::Not(inner) => assert_well_formed(inner),
        Expr::Leaf(_) => {}
    }
}
