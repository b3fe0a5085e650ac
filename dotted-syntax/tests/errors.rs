mod common;
use common::*;
use dotted_syntax::*;

fn count(input: &str, marker: char) -> usize {
    input.chars().filter(|&ch| ch == marker).count()
}

#[test]
fn mismatched_marker_counts_always_fail() {
    let cases = [
        "(", ")", "((a)", "(a))", "a (b (c)", "(a or b", "((((x)))", "x)))",
        "( ( ( )",
    ];
    for q in cases {
        assert_ne!(count(q, '('), count(q, ')'), "bad fixture {q:?}");
        let err = parse_err(q);
        assert_eq!(err.kind, SyntaxErrorKind::UnbalancedGroup, "input: {q:?}");
    }
}

#[test]
fn misordered_markers_fail_even_when_counts_match() {
    for q in [")(", "a) (b", "())("] {
        assert_eq!(parse_err(q).kind, SyntaxErrorKind::UnbalancedGroup, "input: {q:?}");
    }
}

#[test]
fn markers_inside_quotes_do_not_count() {
    let expr = parse_ok("\"(\" b.\")))\"");
    assert_eq!(as_and(&expr).len(), 2);
}

#[test]
fn dangling_operator_positions() {
    let err = parse_err("foo and");
    assert_eq!(err.kind, SyntaxErrorKind::DanglingOperator);
    assert_eq!(err.position, 4);

    let err = parse_err("OR foo");
    assert_eq!(err.kind, SyntaxErrorKind::DanglingOperator);
    assert_eq!(err.position, 0);

    let err = parse_err("(foo !)");
    assert_eq!(err.kind, SyntaxErrorKind::DanglingOperator);
    assert_eq!(err.position, 5);

    // an empty group is no operand for an operator
    for (input, position) in [("a or ()", 2), ("a and ( )", 2), ("() or a", 3), ("x ! ()", 2)] {
        let err = parse_err(input);
        assert_eq!(err.kind, SyntaxErrorKind::DanglingOperator, "input: {input:?}");
        assert_eq!(err.position, position, "input: {input:?}");
    }
}

#[test]
fn empty_groups_next_to_operands_are_dropped() {
    assert!(matches!(parse_ok("a ()"), Expr::Leaf(atom) if atom.text == "a"));
    assert!(matches!(parse_ok("(() b)"), Expr::Leaf(atom) if atom.text == "b"));
    assert_eq!(parse_expr("( ( ) )", &Syntax::default()), Ok(None));
}

#[test]
fn long_runs_of_open_markers_are_unbalanced() {
    let err = parse_err(&"(".repeat(10_000));
    assert_eq!(err.kind, SyntaxErrorKind::UnbalancedGroup);
    assert_eq!(err.position, 9_999);

    let err = parse_err(&")".repeat(10_000));
    assert_eq!(err.kind, SyntaxErrorKind::UnbalancedGroup);
    assert_eq!(err.position, 0);
}

#[test]
fn nesting_depth_is_capped() {
    let nested = |depth: usize| format!("{}a{}", "(".repeat(depth), ")".repeat(depth));

    assert!(matches!(parse_ok(&nested(MAX_GROUP_DEPTH)), Expr::Leaf(atom) if atom.text == "a"));

    let err = parse_err(&nested(MAX_GROUP_DEPTH + 1));
    assert_eq!(err.kind, SyntaxErrorKind::TooDeep);
    assert_eq!(err.position, MAX_GROUP_DEPTH);

    let err = parse_err(&nested(10_000));
    assert_eq!(err.kind, SyntaxErrorKind::TooDeep);
    assert_eq!(err.to_string(), format!("groups nested too deeply (at byte {MAX_GROUP_DEPTH})"));
}

#[test]
fn long_runs_of_standalone_not_markers() {
    let even = format!("{}a", "! ".repeat(10_000));
    assert!(matches!(parse_ok(&even), Expr::Leaf(atom) if atom.text == "a"));

    let odd = format!("{}a", "! ".repeat(10_001));
    let expr = parse_ok(&odd);
    assert!(matches!(as_not(&expr), Expr::Leaf(atom) if atom.text == "a"));

    let err = parse_err(&"! ".repeat(10_000));
    assert_eq!(err.kind, SyntaxErrorKind::DanglingOperator);
    assert_eq!(err.position, 19_998);
}

#[test]
fn long_flat_input_parses() {
    let input = vec!["word"; 50_000].join(" or ");
    assert_eq!(as_or(&parse_ok(&input)).len(), 50_000);
}

#[test]
fn error_display_mentions_offset() {
    let err = parse_err("(foo");
    assert_eq!(err.to_string(), "unbalanced group (at byte 0)");

    let err = parse_err("a \"b");
    assert_eq!(err.to_string(), "missing closing quote (at byte 2)");
}
