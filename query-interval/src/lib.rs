//! Date values accepted by time conditions such as `s.today` or
//! `d.lt.2024-01-01`.
//!
//! [`QueryInterval::parse`] only recognizes the text; turning an interval
//! into concrete instants is left to whoever evaluates the query.
//!
//! ```
//! use query_interval::{IntervalUnit, QueryInterval};
//!
//! assert_eq!(QueryInterval::parse("today"), Some(QueryInterval::days(0)));
//! assert_eq!(
//!     QueryInterval::parse("-2w"),
//!     Some(QueryInterval::Relative { unit: IntervalUnit::Week, value: -2 })
//! );
//! assert_eq!(QueryInterval::parse("not-a-date"), None);
//! ```

use jiff::civil::Date;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    fn from_suffix(suffix: char) -> Option<Self> {
        match suffix.to_ascii_lowercase() {
            'h' => Some(IntervalUnit::Hour),
            'd' => Some(IntervalUnit::Day),
            'w' => Some(IntervalUnit::Week),
            'm' => Some(IntervalUnit::Month),
            'y' => Some(IntervalUnit::Year),
            _ => None,
        }
    }

    pub fn suffix(self) -> char {
        match self {
            IntervalUnit::Hour => 'h',
            IntervalUnit::Day => 'd',
            IntervalUnit::Week => 'w',
            IntervalUnit::Month => 'm',
            IntervalUnit::Year => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryInterval {
    /// The time field is not set at all (`none`, `no`).
    None,
    /// The current instant (`now`).
    Now,
    /// Offset from the current day (or hour), e.g. `today`, `3d`, `-1w`.
    Relative { unit: IntervalUnit, value: i32 },
    /// A calendar day such as `2024-01-01`.
    Date(Date),
}

impl QueryInterval {
    pub const fn days(value: i32) -> Self {
        QueryInterval::Relative {
            unit: IntervalUnit::Day,
            value,
        }
    }

    /// Recognizes keywords (`today`, `tomorrow`, `none`...), signed offsets
    /// (`+3`, `2w`, `-1m`, a bare number counts days) and calendar dates.
    /// Anything else is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        keyword_interval(trimmed)
            .or_else(|| parse_relative(trimmed))
            .or_else(|| parse_absolute_date(trimmed).map(QueryInterval::Date))
    }
}

/// Canonical spelling; [`QueryInterval::parse`] maps it back to the same
/// value.
impl fmt::Display for QueryInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryInterval::None => f.write_str("none"),
            QueryInterval::Now => f.write_str("now"),
            QueryInterval::Relative {
                unit: IntervalUnit::Day,
                value: 0,
            } => f.write_str("today"),
            QueryInterval::Relative {
                unit: IntervalUnit::Day,
                value: 1,
            } => f.write_str("tomorrow"),
            QueryInterval::Relative {
                unit: IntervalUnit::Day,
                value: -1,
            } => f.write_str("yesterday"),
            QueryInterval::Relative { unit, value } => write!(f, "{value}{}", unit.suffix()),
            QueryInterval::Date(date) => write!(f, "{}", date.strftime("%Y-%m-%d")),
        }
    }
}

fn keyword_interval(keyword: &str) -> Option<QueryInterval> {
    let lower = keyword.to_ascii_lowercase();
    match lower.as_str() {
        "none" | "no" => Some(QueryInterval::None),
        "now" => Some(QueryInterval::Now),
        "today" | "tod" => Some(QueryInterval::days(0)),
        "tomorrow" | "tmrw" | "tom" => Some(QueryInterval::days(1)),
        "yesterday" => Some(QueryInterval::days(-1)),
        _ => None,
    }
}

fn parse_relative(text: &str) -> Option<QueryInterval> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };
    let digits_end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let (digits, suffix) = rest.split_at(digits_end);

    let mut suffix = suffix.chars();
    let unit = match (suffix.next(), suffix.next()) {
        (None, _) => IntervalUnit::Day,
        (Some(ch), None) => IntervalUnit::from_suffix(ch)?,
        _ => return None,
    };
    let value: i32 = digits.parse().ok()?;
    Some(QueryInterval::Relative {
        unit,
        value: sign * value,
    })
}

fn parse_absolute_date(raw: &str) -> Option<Date> {
    let sep = raw.chars().find(|ch| matches!(ch, '-' | '/' | '.'))?;
    let mut formats = match sep {
        '-' => vec!["%Y-%m-%d", "%d-%m-%Y", "%m-%d-%Y"],
        '/' => vec!["%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"],
        '.' => vec!["%Y.%m.%d", "%d.%m.%Y", "%m.%d.%Y"],
        _ => vec![],
    };
    let starts_with_year = raw.len() >= 4
        && raw.chars().take(4).all(|c| c.is_ascii_digit())
        && matches!(raw.chars().nth(4), Some('-' | '/' | '.'));
    formats.sort_by_key(|fmt| {
        let year_first = fmt.starts_with("%Y");
        if starts_with_year == year_first { 0 } else { 1 }
    });
    formats
        .into_iter()
        .find_map(|fmt| Date::strptime(fmt, raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(QueryInterval::parse("TODAY"), Some(QueryInterval::days(0)));
        assert_eq!(QueryInterval::parse("tod"), Some(QueryInterval::days(0)));
        assert_eq!(QueryInterval::parse("Tmrw"), Some(QueryInterval::days(1)));
        assert_eq!(QueryInterval::parse("yesterday"), Some(QueryInterval::days(-1)));
        assert_eq!(QueryInterval::parse("no"), Some(QueryInterval::None));
        assert_eq!(QueryInterval::parse("now"), Some(QueryInterval::Now));
    }

    #[test]
    fn relative_offsets() {
        assert_eq!(QueryInterval::parse("+3"), Some(QueryInterval::days(3)));
        assert_eq!(QueryInterval::parse("3"), Some(QueryInterval::days(3)));
        assert_eq!(QueryInterval::parse("-1d"), Some(QueryInterval::days(-1)));
        assert_eq!(
            QueryInterval::parse("12H"),
            Some(QueryInterval::Relative {
                unit: IntervalUnit::Hour,
                value: 12
            })
        );
        assert_eq!(
            QueryInterval::parse("1y"),
            Some(QueryInterval::Relative {
                unit: IntervalUnit::Year,
                value: 1
            })
        );
    }

    #[test]
    fn malformed_offsets_are_rejected() {
        for text in ["", "+", "-", "d", "3dd", "3x", "99999999999d", "1.5d"] {
            assert_eq!(QueryInterval::parse(text), None, "text: {text:?}");
        }
    }

    #[test]
    fn absolute_dates() {
        assert_eq!(
            QueryInterval::parse("2024-01-01"),
            Some(QueryInterval::Date(date(2024, 1, 1)))
        );
        assert_eq!(
            QueryInterval::parse("2024/02/29"),
            Some(QueryInterval::Date(date(2024, 2, 29)))
        );
        assert_eq!(
            QueryInterval::parse("31.12.2023"),
            Some(QueryInterval::Date(date(2023, 12, 31)))
        );
        assert_eq!(QueryInterval::parse("2023-02-30"), None);
        assert_eq!(QueryInterval::parse("xx.not-a-date"), None);
    }

    #[test]
    fn display_is_canonical() {
        let cases = [
            ("tod", "today"),
            ("tom", "tomorrow"),
            ("-1", "yesterday"),
            ("+3", "3d"),
            ("-2W", "-2w"),
            ("no", "none"),
            ("NOW", "now"),
            ("2024/01/05", "2024-01-05"),
        ];
        for (input, expected) in cases {
            let interval = QueryInterval::parse(input).unwrap();
            assert_eq!(interval.to_string(), expected);
            assert_eq!(QueryInterval::parse(expected), Some(interval));
        }
    }
}
