use crate::query::Options;
use anyhow::{Context, Result, bail};
use dotted_syntax::Syntax;
use serde::{Deserialize, Serialize};

/// Everything a [`DottedQueryParser`](crate::DottedQueryParser) can be
/// configured with. Missing fields take their defaults, so `{}` is a valid
/// configuration.
///
/// ```
/// use dotted_query::{DottedQueryParser, ParserConfig};
///
/// let config = ParserConfig::from_json(r#"{
///     "syntax": { "operators_and": ["and", "&&"] },
///     "base_options": { "agenda_days": 7 }
/// }"#).unwrap();
/// let query = DottedQueryParser::new(config).parse("a && b").unwrap();
/// assert_eq!(query.options.agenda_days, Some(7));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub syntax: Syntax,
    /// Options every query starts from before its own option tokens apply.
    pub base_options: Options,
}

impl ParserConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).context("Failed to deserialize parser config")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects markers and keywords the tokenizer could not tell apart.
    pub fn validate(&self) -> Result<()> {
        let syntax = &self.syntax;
        let markers = [
            ("group_open", syntax.group_open),
            ("group_close", syntax.group_close),
            ("not_marker", syntax.not_marker),
        ];
        for (field, marker) in markers {
            if marker.is_whitespace() || matches!(marker, '"' | '.' | '\\') {
                bail!("{field} cannot be {marker:?}");
            }
        }
        if syntax.group_open == syntax.group_close {
            bail!("group markers must differ, both are {:?}", syntax.group_open);
        }
        if syntax.not_marker == syntax.group_open || syntax.not_marker == syntax.group_close {
            bail!("not_marker {:?} collides with a group marker", syntax.not_marker);
        }

        for (field, keywords) in [
            ("operators_and", &syntax.operators_and),
            ("operators_or", &syntax.operators_or),
        ] {
            if keywords.is_empty() {
                bail!("{field} needs at least one keyword");
            }
            for keyword in keywords {
                let breaks_token = keyword.chars().any(|ch| {
                    ch.is_whitespace()
                        || ch == '"'
                        || ch == syntax.group_open
                        || ch == syntax.group_close
                });
                if keyword.is_empty() || breaks_token {
                    bail!("{field} keyword {keyword:?} is not a single token");
                }
                if keyword.starts_with(syntax.not_marker) {
                    bail!("{field} keyword {keyword:?} starts with the not_marker");
                }
            }
        }

        if let Some(shared) = syntax.operators_and.iter().find(|keyword| {
            syntax
                .operators_or
                .iter()
                .any(|other| other.eq_ignore_ascii_case(keyword))
        }) {
            bail!("keyword {shared:?} is both an and- and an or-operator");
        }

        if self.base_options.agenda_days == Some(0) {
            bail!("base_options.agenda_days must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ParserConfig::from_json("{}").unwrap(), ParserConfig::default());
    }

    #[test]
    fn default_config_is_valid() {
        ParserConfig::default().validate().unwrap();
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cases = [
            r#"{"syntax": {"group_open": "(", "group_close": "("}}"#,
            r#"{"syntax": {"not_marker": "."}}"#,
            r#"{"syntax": {"not_marker": "("}}"#,
            r#"{"syntax": {"operators_or": []}}"#,
            r#"{"syntax": {"operators_and": ["and also"]}}"#,
            r#"{"syntax": {"operators_and": ["!and"]}}"#,
            r#"{"syntax": {"operators_and": ["x"], "operators_or": ["X"]}}"#,
            r#"{"base_options": {"agenda_days": 0}}"#,
            r#"{"syntax": {"group_open": "ab"}}"#,
            r#"not json"#,
        ];
        for json in cases {
            assert!(ParserConfig::from_json(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ParserConfig {
            base_options: Options {
                agenda_days: Some(3),
            },
            ..ParserConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ParserConfig::from_json(&json).unwrap(), config);
    }
}
