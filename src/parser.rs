use crate::classify::Classified;
use crate::config::ParserConfig;
use crate::grammar::grammar;
use crate::query::{Query, Term};
use dotted_syntax::{SyntaxError, parse_expr};
use once_cell::sync::Lazy;
use tracing::debug;

static DEFAULT_PARSER: Lazy<DottedQueryParser> = Lazy::new(DottedQueryParser::default);

/// Parses `text` with the default configuration.
///
/// ```
/// use dotted_query::{parse_query, SortKey};
///
/// let query = parse_query("t.work o.priority o.book ad.5 ad.10").unwrap();
/// let keys: Vec<_> = query.sort_orders.iter().map(|order| order.key).collect();
/// assert_eq!(keys, [SortKey::Priority, SortKey::Book]);
/// assert_eq!(query.options.agenda_days, Some(10));
/// ```
pub fn parse_query(text: &str) -> Result<Query, SyntaxError> {
    DEFAULT_PARSER.parse(text)
}

/// Parser bound to one configuration. Holds no state between calls, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct DottedQueryParser {
    config: ParserConfig,
}

impl DottedQueryParser {
    /// Uses `config` as given; see [`ParserConfig::validate`] for checking
    /// hand-built configurations first.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Validates `config` before building the parser.
    pub fn try_new(config: ParserConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Builds the boolean tree, classifies every leaf left to right, and
    /// moves sort orders and options out of the tree. Option tokens fold
    /// onto the configured base options; a later token overrides an earlier
    /// one.
    pub fn parse(&self, text: &str) -> Result<Query, SyntaxError> {
        let tree = parse_expr(text, &self.config.syntax)?;

        let grammar = grammar();
        let mut sort_orders = Vec::new();
        let mut options = self.config.base_options;
        let condition = tree.and_then(|expr| {
            expr.filter_map(|atom| match grammar.classify(&atom.text, options) {
                Classified::Condition(condition) => Some(Term::Condition(condition)),
                Classified::Term(term) => Some(term),
                Classified::SortOrder(order) => {
                    sort_orders.push(order);
                    None
                }
                Classified::Options(updated) => {
                    options = updated;
                    None
                }
            })
        });

        debug!(
            text,
            has_condition = condition.is_some(),
            sort_orders = sort_orders.len(),
            "parsed query"
        );
        Ok(Query {
            condition,
            sort_orders,
            options,
        })
    }
}
