use dotted_syntax::{Expr, Syntax, quote, quote_if_needed};
use query_interval::QueryInterval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of parsing one line of search text.
///
/// Sort orders and options never take part in the boolean logic; they are
/// lifted out of the expression tree while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// `None` when the text held no conditions or search terms.
    pub condition: Option<Expr<Term>>,
    /// The first entry is the primary sort key.
    pub sort_orders: Vec<SortOrder>,
    pub options: Options,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.condition.is_none()
    }

    /// Structured conditions in textual order, ignoring boolean structure.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.condition
            .iter()
            .flat_map(|expr| expr.leaves())
            .filter_map(|term| match term {
                Term::Condition(condition) => Some(condition),
                Term::Word(_) | Term::Phrase(_) => None,
            })
    }
}

/// Renders the canonical dotted form: the expression first, then sort
/// orders, then options.
///
/// ```
/// use dotted_query::parse_query;
/// let query = parse_query("o.prio .t.work AND (s.today or d.le.tmrw) ad.3").unwrap();
/// assert_eq!(query.to_string(), ".t.work (s.today or d.tomorrow) o.priority ad.3");
/// ```
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(expr) = &self.condition {
            parts.push(expr.to_string());
        }
        parts.extend(self.sort_orders.iter().map(ToString::to_string));
        if let Some(days) = self.options.agenda_days {
            parts.push(format!("ad.{days}"));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Leaf of the condition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Condition(Condition),
    /// Free text, kept exactly as typed. Dotted tokens that failed to parse
    /// as a condition end up here too.
    Word(String),
    /// Fully quoted free text with the quotes removed.
    Phrase(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Condition(condition) => write!(f, "{condition}"),
            Term::Word(word) => f.write_str(word),
            Term::Phrase(phrase) => f.write_str(&quote(phrase)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `b.name`
    InBook { name: String, negated: bool },
    /// `i.name`
    HasState { state: String, negated: bool },
    /// `it.todo`, `it.done`, `it.none`
    HasStateType { state_type: StateType, negated: bool },
    /// `p.a`
    HasPriority { priority: char, negated: bool },
    /// `ps.a`, priority that was set explicitly rather than defaulted.
    HasSetPriority { priority: char, negated: bool },
    /// `t.tag`, inherited tags included.
    HasTag { tag: String, negated: bool },
    /// `tn.tag`, only tags set on the note itself. Cannot be negated.
    HasOwnTag { tag: String },
    Scheduled(TimeCondition),
    Deadline(TimeCondition),
    Closed(TimeCondition),
}

impl Condition {
    pub fn is_negated(&self) -> bool {
        match self {
            Condition::InBook { negated, .. }
            | Condition::HasState { negated, .. }
            | Condition::HasStateType { negated, .. }
            | Condition::HasPriority { negated, .. }
            | Condition::HasSetPriority { negated, .. }
            | Condition::HasTag { negated, .. } => *negated,
            Condition::HasOwnTag { .. } => false,
            Condition::Scheduled(time) | Condition::Deadline(time) | Condition::Closed(time) => {
                time.negated
            }
        }
    }

    pub(crate) fn time(time_type: TimeType, time: TimeCondition) -> Self {
        match time_type {
            TimeType::Scheduled => Condition::Scheduled(time),
            TimeType::Deadline => Condition::Deadline(time),
            TimeType::Closed => Condition::Closed(time),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let syntax = Syntax::default();
        let neg = |negated: bool| if negated { "." } else { "" };
        match self {
            Condition::InBook { name, negated } => {
                write!(f, "{}b.{}", neg(*negated), quote_if_needed(name, &syntax))
            }
            Condition::HasState { state, negated } => {
                write!(f, "{}i.{}", neg(*negated), quote_if_needed(state, &syntax))
            }
            Condition::HasStateType {
                state_type,
                negated,
            } => write!(f, "{}it.{}", neg(*negated), state_type.as_str()),
            Condition::HasPriority { priority, negated } => {
                write!(f, "{}p.{priority}", neg(*negated))
            }
            Condition::HasSetPriority { priority, negated } => {
                write!(f, "{}ps.{priority}", neg(*negated))
            }
            Condition::HasTag { tag, negated } => {
                write!(f, "{}t.{}", neg(*negated), quote_if_needed(tag, &syntax))
            }
            Condition::HasOwnTag { tag } => write!(f, "tn.{}", quote_if_needed(tag, &syntax)),
            Condition::Scheduled(time) => time.render(f, TimeType::Scheduled),
            Condition::Deadline(time) => time.render(f, TimeType::Deadline),
            Condition::Closed(time) => time.render(f, TimeType::Closed),
        }
    }
}

/// Payload shared by `s.`, `d.` and `c.` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCondition {
    pub interval: QueryInterval,
    pub relation: Relation,
    pub negated: bool,
}

impl TimeCondition {
    fn render(&self, f: &mut fmt::Formatter<'_>, time_type: TimeType) -> fmt::Result {
        if self.negated {
            f.write_str(".")?;
        }
        write!(f, "{}.", time_type.prefix())?;
        if self.relation != time_type.default_relation() {
            write!(f, "{}.", self.relation.as_str())?;
        }
        write!(f, "{}", self.interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeType {
    Scheduled,
    Deadline,
    Closed,
}

impl TimeType {
    pub(crate) fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "s" => Some(TimeType::Scheduled),
            "d" => Some(TimeType::Deadline),
            "c" => Some(TimeType::Closed),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            TimeType::Scheduled => "s",
            TimeType::Deadline => "d",
            TimeType::Closed => "c",
        }
    }

    /// Relation used when the token names none: closed times compare for
    /// equality, scheduled times and deadlines match anything up to the
    /// interval.
    pub fn default_relation(self) -> Relation {
        match self {
            TimeType::Closed => Relation::Eq,
            TimeType::Scheduled | TimeType::Deadline => Relation::Le,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    const TABLE: [(&'static str, Relation); 6] = [
        ("eq", Relation::Eq),
        ("ne", Relation::Ne),
        ("lt", Relation::Lt),
        ("le", Relation::Le),
        ("gt", Relation::Gt),
        ("ge", Relation::Ge),
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == code)
            .map(|(_, relation)| *relation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Eq => "eq",
            Relation::Ne => "ne",
            Relation::Lt => "lt",
            Relation::Le => "le",
            Relation::Gt => "gt",
            Relation::Ge => "ge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateType {
    Todo,
    Done,
    None,
}

impl StateType {
    const TABLE: [(&'static str, StateType); 3] = [
        ("todo", StateType::Todo),
        ("done", StateType::Done),
        ("none", StateType::None),
    ];

    /// Case-insensitive lookup; anything outside the fixed set is rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::TABLE
            .iter()
            .find(|(key, _)| *key == lower)
            .map(|(_, state_type)| *state_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateType::Todo => "todo",
            StateType::Done => "done",
            StateType::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub key: SortKey,
    /// Set by a leading `.` (`.o.book`).
    pub reversed: bool,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reversed {
            f.write_str(".")?;
        }
        write!(f, "o.{}", self.key.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Scheduled,
    Deadline,
    Closed,
    Priority,
    Book,
    State,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Scheduled => "scheduled",
            SortKey::Deadline => "deadline",
            SortKey::Closed => "closed",
            SortKey::Priority => "priority",
            SortKey::Book => "book",
            SortKey::State => "state",
        }
    }
}

/// Settings carried by option tokens such as `ad.7`. Unset fields fall back
/// to whatever the evaluator considers its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Agenda look-ahead in days.
    pub agenda_days: Option<u32>,
}

impl Options {
    pub fn with_agenda_days(self, days: u32) -> Self {
        Self {
            agenda_days: Some(days),
            ..self
        }
    }
}
