#![allow(dead_code)]
//! Shared helpers for `dotted-query` integration tests.

use dotted_query::*;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn parse_ok(input: &str) -> Query {
    init_tracing();
    parse_query(input).unwrap_or_else(|err| panic!("failed to parse {input:?}: {err}"))
}

pub fn parse_err(input: &str) -> SyntaxError {
    init_tracing();
    match parse_query(input) {
        Ok(query) => panic!("expected {input:?} to fail, got: {query:?}"),
        Err(err) => err,
    }
}

pub fn root(query: &Query) -> &Expr<Term> {
    query.condition.as_ref().expect("query has no condition")
}

pub fn as_and(expr: &Expr<Term>) -> &Vec<Expr<Term>> {
    match expr {
        Expr::And(parts) => parts,
        other => panic!("expected And, got: {other:?}"),
    }
}

pub fn as_or(expr: &Expr<Term>) -> &Vec<Expr<Term>> {
    match expr {
        Expr::Or(parts) => parts,
        other => panic!("expected Or, got: {other:?}"),
    }
}

pub fn as_not(expr: &Expr<Term>) -> &Expr<Term> {
    match expr {
        Expr::Not(inner) => inner,
        other => panic!("expected Not, got: {other:?}"),
    }
}

pub fn as_term(expr: &Expr<Term>) -> &Term {
    match expr {
        Expr::Leaf(term) => term,
        other => panic!("expected Leaf, got: {other:?}"),
    }
}

pub fn as_condition(expr: &Expr<Term>) -> &Condition {
    match as_term(expr) {
        Term::Condition(condition) => condition,
        other => panic!("expected Condition, got: {other:?}"),
    }
}

pub fn word_is(expr: &Expr<Term>, expected: &str) {
    match as_term(expr) {
        Term::Word(word) => assert_eq!(word, expected),
        other => panic!("expected Word, got: {other:?}"),
    }
}

pub fn phrase_is(expr: &Expr<Term>, expected: &str) {
    match as_term(expr) {
        Term::Phrase(phrase) => assert_eq!(phrase, expected),
        other => panic!("expected Phrase, got: {other:?}"),
    }
}

/// Parses a query holding exactly one condition token.
pub fn single_condition(input: &str) -> Condition {
    let query = parse_ok(input);
    as_condition(root(&query)).clone()
}

pub fn time(interval: &str, relation: Relation, negated: bool) -> TimeCondition {
    TimeCondition {
        interval: QueryInterval::parse(interval).expect("test interval must parse"),
        relation,
        negated,
    }
}
