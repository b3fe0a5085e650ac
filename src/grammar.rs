//! Ordered pattern tables for dotted tokens.
//!
//! Each list is tried top to bottom and the first rule that both matches the
//! whole token and accepts its payload wins. Rules sharing a prefix letter
//! are listed most specific first (`it.` before `i.`, `ps.` before `p.`,
//! `tn.` before `t.`).
//!
//! Capture groups follow one convention: group 1 is the optional `.`
//! negation marker (absent for `tn.` and the options, which cannot be
//! negated) and the last group is the payload.

use crate::query::{
    Condition, Options, Relation, SortKey, StateType, TimeCondition, TimeType,
};
use dotted_syntax::unquote;
use once_cell::sync::Lazy;
use query_interval::QueryInterval;
use regex::{Captures, Regex};

static GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::dotted);

/// The dotted grammar. Compiled on first use, read-only afterwards.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

pub(crate) type ConditionBuilder = fn(&Captures<'_>) -> Option<Condition>;
pub(crate) type OptionBuilder = fn(&Captures<'_>, Options) -> Option<Options>;

pub(crate) struct Rule<B> {
    pub(crate) name: &'static str,
    pub(crate) pattern: Regex,
    pub(crate) build: B,
}

impl Rule<ConditionBuilder> {
    fn condition(name: &'static str, pattern: &str, build: ConditionBuilder) -> Self {
        Self {
            name,
            pattern: compile(name, pattern),
            build,
        }
    }
}

impl Rule<SortKey> {
    fn sort_order(name: &'static str, pattern: &str, key: SortKey) -> Self {
        Self {
            name,
            pattern: compile(name, pattern),
            build: key,
        }
    }
}

impl Rule<OptionBuilder> {
    fn option(name: &'static str, pattern: &str, build: OptionBuilder) -> Self {
        Self {
            name,
            pattern: compile(name, pattern),
            build,
        }
    }
}

// Patterns are literals checked by the tests below.
fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|err| panic!("grammar rule {name:?} has an invalid pattern: {err}"))
}

pub struct Grammar {
    pub(crate) conditions: Vec<Rule<ConditionBuilder>>,
    pub(crate) sort_orders: Vec<Rule<SortKey>>,
    pub(crate) options: Vec<Rule<OptionBuilder>>,
}

impl Grammar {
    fn dotted() -> Self {
        let conditions = vec![
            Rule::condition("in-book", r"^(\.)?b\.(?s:(.+))$", |caps| {
                Some(Condition::InBook {
                    name: text_payload(caps)?,
                    negated: negated(caps),
                })
            }),
            Rule::condition("has-state-type", r"^(\.)?it\.(\w+)$", |caps| {
                Some(Condition::HasStateType {
                    state_type: StateType::from_name(payload(caps))?,
                    negated: negated(caps),
                })
            }),
            Rule::condition("has-state", r"^(\.)?i\.(?s:(.+))$", |caps| {
                Some(Condition::HasState {
                    state: text_payload(caps)?,
                    negated: negated(caps),
                })
            }),
            Rule::condition("has-set-priority", r"^(\.)?ps\.([a-zA-Z])$", |caps| {
                Some(Condition::HasSetPriority {
                    priority: payload(caps).chars().next()?,
                    negated: negated(caps),
                })
            }),
            Rule::condition("has-priority", r"^(\.)?p\.([a-zA-Z])$", |caps| {
                Some(Condition::HasPriority {
                    priority: payload(caps).chars().next()?,
                    negated: negated(caps),
                })
            }),
            Rule::condition("has-own-tag", r"^tn\.(?s:(.+))$", |caps| {
                Some(Condition::HasOwnTag {
                    tag: text_payload(caps)?,
                })
            }),
            Rule::condition("has-tag", r"^(\.)?t\.(?s:(.+))$", |caps| {
                Some(Condition::HasTag {
                    tag: text_payload(caps)?,
                    negated: negated(caps),
                })
            }),
            Rule::condition(
                "time",
                r"^(\.)?([sdc])(?:\.(eq|ne|lt|le|gt|ge))?\.(?s:(.+))$",
                time_condition,
            ),
        ];

        let sort_orders = vec![
            Rule::sort_order(
                "scheduled",
                r"^(\.)?o\.(?:scheduled|sched|s)$",
                SortKey::Scheduled,
            ),
            Rule::sort_order("deadline", r"^(\.)?o\.(?:deadline|dead|d)$", SortKey::Deadline),
            Rule::sort_order("closed", r"^(\.)?o\.(?:closed|close|c)$", SortKey::Closed),
            Rule::sort_order(
                "priority",
                r"^(\.)?o\.(?:priority|prio|pri|p)$",
                SortKey::Priority,
            ),
            Rule::sort_order("book", r"^(\.)?o\.(?:notebook|book|b)$", SortKey::Book),
            Rule::sort_order("state", r"^(\.)?o\.(?:state|st)$", SortKey::State),
        ];

        let options = vec![Rule::option("agenda-days", r"^ad\.(\d+)$", |caps, options| {
            let days: u32 = payload(caps).parse().ok()?;
            (days > 0).then(|| options.with_agenda_days(days))
        })];

        Self {
            conditions,
            sort_orders,
            options,
        }
    }

    /// Condition rule names in the order they are tried.
    pub fn condition_names(&self) -> Vec<&'static str> {
        self.conditions.iter().map(|rule| rule.name).collect()
    }

    pub fn sort_order_names(&self) -> Vec<&'static str> {
        self.sort_orders.iter().map(|rule| rule.name).collect()
    }

    pub fn option_names(&self) -> Vec<&'static str> {
        self.options.iter().map(|rule| rule.name).collect()
    }
}

pub(crate) fn negated(caps: &Captures<'_>) -> bool {
    caps.get(1).is_some()
}

fn payload<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(caps.len() - 1).map_or("", |m| m.as_str())
}

/// Unquoted payload; an empty name is rejected rather than matched.
fn text_payload(caps: &Captures<'_>) -> Option<String> {
    let text = unquote(payload(caps));
    if text.is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}

fn time_condition(caps: &Captures<'_>) -> Option<Condition> {
    let time_type = TimeType::from_prefix(caps.get(2)?.as_str())?;
    let relation = match caps.get(3) {
        Some(code) => Relation::from_code(code.as_str())?,
        None => time_type.default_relation(),
    };
    let interval = QueryInterval::parse(&unquote(payload(caps)))?;
    Some(Condition::time(
        time_type,
        TimeCondition {
            interval,
            relation,
            negated: negated(caps),
        },
    ))
}
