use crate::grammar::{Grammar, negated};
use crate::query::{Condition, Options, SortOrder, Term};
use dotted_syntax::{is_quoted, unquote};
use tracing::trace;

/// What a single token turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Condition(Condition),
    SortOrder(SortOrder),
    /// `options` with the token's field overridden.
    Options(Options),
    Term(Term),
}

impl Grammar {
    /// Classifies one token: conditions first, then sort orders, then
    /// options. A rule whose payload is rejected falls through to the rules
    /// after it; a token nothing accepts becomes a plain search term.
    ///
    /// ```
    /// use dotted_query::{grammar, Classified, Condition, Options, Term};
    ///
    /// let grammar = grammar();
    /// assert!(matches!(
    ///     grammar.classify("it.TODO", Options::default()),
    ///     Classified::Condition(Condition::HasStateType { .. })
    /// ));
    /// assert_eq!(
    ///     grammar.classify("s.xx.not-a-date", Options::default()),
    ///     Classified::Term(Term::Word("s.xx.not-a-date".into()))
    /// );
    /// ```
    pub fn classify(&self, token: &str, options: Options) -> Classified {
        for rule in &self.conditions {
            let Some(caps) = rule.pattern.captures(token) else {
                continue;
            };
            match (rule.build)(&caps) {
                Some(condition) => return Classified::Condition(condition),
                None => trace!(rule = rule.name, token, "condition payload rejected"),
            }
        }

        for rule in &self.sort_orders {
            if let Some(caps) = rule.pattern.captures(token) {
                return Classified::SortOrder(SortOrder {
                    key: rule.build,
                    reversed: negated(&caps),
                });
            }
        }

        for rule in &self.options {
            let Some(caps) = rule.pattern.captures(token) else {
                continue;
            };
            match (rule.build)(&caps, options) {
                Some(options) => return Classified::Options(options),
                None => trace!(rule = rule.name, token, "option value rejected"),
            }
        }

        Classified::Term(plain_term(token))
    }
}

fn plain_term(token: &str) -> Term {
    if is_quoted(token) {
        Term::Phrase(unquote(token).into_owned())
    } else {
        Term::Word(token.to_string())
    }
}
