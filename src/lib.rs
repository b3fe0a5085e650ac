//! # Dotted search queries
//!
//! `dotted-query` turns one line of search text into a [`Query`]: a boolean
//! tree of structured conditions and free-text terms, the requested sort
//! orders, and option overrides. Evaluating the query against notes is up to
//! the caller.
//!
//! Structured tokens use dotted prefixes (`t.work`, `b."My Book"`,
//! `s.le.today`, `it.done`); a leading `.` negates a condition or reverses a
//! sort order. Tokens combine with `and`, `or`, juxtaposition (implicit
//! `and`), parentheses, and the `!` prefix for boolean negation.
//!
//! ## Example
//! ```
//! use dotted_query::{parse_query, Condition, Expr, Term};
//!
//! let query = parse_query("report .t.work (it.todo or d.today) o.sched").unwrap();
//! let Some(Expr::And(parts)) = &query.condition else { panic!() };
//! assert!(matches!(&parts[0], Expr::Leaf(Term::Word(word)) if word == "report"));
//! assert!(matches!(
//!     &parts[1],
//!     Expr::Leaf(Term::Condition(Condition::HasTag { tag, negated: true })) if tag == "work"
//! ));
//! assert!(matches!(&parts[2], Expr::Or(choices) if choices.len() == 2));
//! assert_eq!(query.sort_orders.len(), 1);
//! ```

mod classify;
mod config;
mod grammar;
mod parser;
mod query;

pub use classify::*;
pub use config::*;
pub use dotted_syntax::{Expr, MAX_GROUP_DEPTH, Syntax, SyntaxError, SyntaxErrorKind};
pub use grammar::{Grammar, grammar};
pub use parser::*;
pub use query::*;
pub use query_interval::{IntervalUnit, QueryInterval};
