//! # Boolean syntax for dotted search queries
//!
//! `dotted-syntax` turns a single line of search text into a boolean
//! expression tree. It only understands the structural parts of the
//! language: whitespace, quoting, grouping markers, the `and`/`or` keywords
//! and the `!` negation marker. Every leaf comes back as a raw [`Atom`] so a
//! grammar layer can decide what the token means.
//!
//! ## Example
//! ```
//! use dotted_syntax::{parse_expr, Expr, Syntax};
//!
//! let expr = parse_expr("a and b or c", &Syntax::default()).unwrap().unwrap();
//! let Expr::Or(parts) = &expr else { panic!("expected disjunction") };
//! // AND binds tighter than OR
//! assert!(matches!(&parts[0], Expr::And(inner) if inner.len() == 2));
//! assert!(matches!(&parts[1], Expr::Leaf(atom) if atom.text == "c"));
//! ```

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt, ops::Range};

const QUOTE: char = '"';

/// Deepest group nesting [`parse_expr`] accepts.
pub const MAX_GROUP_DEPTH: usize = 128;

/// Parses `input` into an expression tree.
///
/// Returns `Ok(None)` when the input holds no operands at all (only
/// whitespace or empty groups).
pub fn parse_expr(input: &str, syntax: &Syntax) -> Result<Option<Expr<Atom>>, SyntaxError> {
    let tokens = tokenize(input, syntax)?;
    Parser::new(tokens, syntax).parse()
}

/// Surface markers of the language. Everything except the quote character
/// is configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub group_open: char,
    pub group_close: char,
    /// Prefix that wraps the following operand in [`Expr::Not`].
    pub not_marker: char,
    /// Keywords joining operands with AND, matched case-insensitively.
    pub operators_and: Vec<String>,
    /// Keywords joining operands with OR, matched case-insensitively.
    pub operators_or: Vec<String>,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            group_open: '(',
            group_close: ')',
            not_marker: '!',
            operators_and: vec!["and".to_string()],
            operators_or: vec!["or".to_string()],
        }
    }
}

impl Syntax {
    fn keyword(&self, text: &str) -> Option<Keyword> {
        if self
            .operators_and
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(text))
        {
            Some(Keyword::And)
        } else if self
            .operators_or
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(text))
        {
            Some(Keyword::Or)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    And,
    Or,
}

/// Boolean structure over leaves of type `T`.
///
/// `And`/`Or` always hold at least two children and `Not` exactly one; the
/// parser and [`Expr::filter_map`] never build anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<T> {
    /// Conjunction, explicit (`and`) or implicit (juxtaposition).
    ///
    /// ```
    /// use dotted_syntax::{parse_expr, Expr, Syntax};
    /// let Some(Expr::And(parts)) = parse_expr("foo bar", &Syntax::default()).unwrap() else { panic!() };
    /// assert_eq!(parts.len(), 2);
    /// ```
    And(Vec<Expr<T>>),
    /// Disjunction triggered by an `or` keyword.
    Or(Vec<Expr<T>>),
    /// Negation triggered by the `!` marker.
    ///
    /// ```
    /// use dotted_syntax::{parse_expr, Expr, Syntax};
    /// let Some(Expr::Not(inner)) = parse_expr("!temp", &Syntax::default()).unwrap() else { panic!() };
    /// assert!(matches!(&*inner, Expr::Leaf(atom) if atom.text == "temp"));
    /// ```
    Not(Box<Expr<T>>),
    Leaf(T),
}

impl<T> Expr<T> {
    /// Wraps `self` in `Not`, or unwraps an existing `Not`.
    pub fn negate(self) -> Self {
        match self {
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }

    /// Leaves in textual order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'e>(&'e self, out: &mut Vec<&'e T>) {
        match self {
            Expr::Leaf(value) => out.push(value),
            Expr::Not(inner) => inner.collect_leaves(out),
            Expr::And(parts) | Expr::Or(parts) => {
                parts.iter().for_each(|part| part.collect_leaves(out))
            }
        }
    }

    /// Maps every leaf in textual order, dropping the ones `f` rejects.
    ///
    /// Conjunctions and disjunctions left with a single child collapse into
    /// that child, and a `Not` whose operand disappeared disappears as well.
    /// A `Not` whose operand collapsed into another `Not` cancels with it.
    /// Returns `None` when no leaf survives.
    ///
    /// ```
    /// use dotted_syntax::{parse_expr, Expr, Syntax};
    /// let expr = parse_expr("a (b or skip) !skip", &Syntax::default()).unwrap().unwrap();
    /// let kept = expr.filter_map(|atom| (atom.text != "skip").then_some(atom.text)).unwrap();
    /// assert_eq!(kept, Expr::And(vec![Expr::Leaf("a".to_string()), Expr::Leaf("b".to_string())]));
    /// ```
    pub fn filter_map<U, F>(self, mut f: F) -> Option<Expr<U>>
    where
        F: FnMut(T) -> Option<U>,
    {
        self.filter_map_with(&mut f)
    }

    fn filter_map_with<U, F>(self, f: &mut F) -> Option<Expr<U>>
    where
        F: FnMut(T) -> Option<U>,
    {
        match self {
            Expr::Leaf(value) => f(value).map(Expr::Leaf),
            Expr::Not(inner) => inner.filter_map_with(f).map(Expr::negate),
            Expr::And(parts) => Expr::join(
                parts
                    .into_iter()
                    .filter_map(|part| part.filter_map_with(&mut *f))
                    .collect(),
                Expr::And,
            ),
            Expr::Or(parts) => Expr::join(
                parts
                    .into_iter()
                    .filter_map(|part| part.filter_map_with(&mut *f))
                    .collect(),
                Expr::Or,
            ),
        }
    }

    fn join(mut parts: Vec<Expr<T>>, build: fn(Vec<Expr<T>>) -> Expr<T>) -> Option<Expr<T>> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(build(parts)),
        }
    }
}

/// Renders the tree with the default [`Syntax`]. Nested groups keep their
/// parentheses so parsing the output rebuilds the same tree.
impl<T: fmt::Display> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(value) => write!(f, "{value}"),
            Expr::Not(inner) => {
                f.write_str("!")?;
                write_operand(f, inner, !matches!(**inner, Expr::Leaf(_)))
            }
            Expr::And(parts) => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write_operand(f, part, matches!(part, Expr::And(_) | Expr::Or(_)))?;
                }
                Ok(())
            }
            Expr::Or(parts) => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" or ")?;
                    }
                    write_operand(f, part, matches!(part, Expr::Or(_)))?;
                }
                Ok(())
            }
        }
    }
}

fn write_operand<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    expr: &Expr<T>,
    grouped: bool,
) -> fmt::Result {
    if grouped {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// A raw leaf token. Quotes are kept verbatim; the negation markers that
/// produced an enclosing [`Expr::Not`] are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub text: String,
    /// Byte range of `text` inside the parsed input.
    pub span: Range<usize>,
}

impl Atom {
    fn new(text: &str, start: usize) -> Self {
        Self {
            text: text.to_string(),
            span: start..start + text.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    GroupOpen,
    GroupClose,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` inside the input.
    pub start: usize,
}

impl Token<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }
}

/// Splits `input` into words and group markers.
///
/// A double quote anywhere inside a word starts a quoted section that runs
/// to the next unescaped quote, so `b."My Book"` is a single word.
pub fn tokenize<'a>(input: &'a str, syntax: &Syntax) -> Result<Vec<Token<'a>>, SyntaxError> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        syntax,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a, 's> {
    input: &'a str,
    pos: usize,
    syntax: &'s Syntax,
}

impl<'a> Lexer<'a, '_> {
    fn next_token(&mut self) -> Result<Option<Token<'a>>, SyntaxError> {
        self.skip_ws();
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let kind = if ch == self.syntax.group_open {
            self.advance_char();
            TokenKind::GroupOpen
        } else if ch == self.syntax.group_close {
            self.advance_char();
            TokenKind::GroupClose
        } else {
            self.consume_word()?;
            TokenKind::Word
        };

        Ok(Some(Token {
            kind,
            text: &self.input[start..self.pos],
            start,
        }))
    }

    fn consume_word(&mut self) -> Result<(), SyntaxError> {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == self.syntax.group_open || ch == self.syntax.group_close
            {
                break;
            }
            if ch == QUOTE {
                let quote_pos = self.pos;
                self.pos = quoted_end(self.input, quote_pos).ok_or(SyntaxError {
                    kind: SyntaxErrorKind::UnterminatedQuote,
                    position: quote_pos,
                })?;
                continue;
            }
            self.advance_char();
        }
        Ok(())
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}

/// Byte offset just past the quote closing the section that opens at
/// `start`.
fn quoted_end(text: &str, start: usize) -> Option<usize> {
    let mut chars = text[start..].char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            QUOTE => return Some(start + idx + 1),
            _ => {}
        }
    }
    None
}

/// Whether the whole of `text` is one quoted section.
pub fn is_quoted(text: &str) -> bool {
    text.starts_with(QUOTE) && quoted_end(text, 0) == Some(text.len())
}

/// Strips the surrounding quotes of a fully quoted `text` and resolves its
/// backslash escapes. Anything else is returned untouched.
///
/// ```
/// use dotted_syntax::unquote;
/// assert_eq!(unquote("\"My Book\""), "My Book");
/// assert_eq!(unquote(r#""say \"hi\"""#), r#"say "hi""#);
/// assert_eq!(unquote("plain"), "plain");
/// ```
pub fn unquote(text: &str) -> Cow<'_, str> {
    if !is_quoted(text) {
        return Cow::Borrowed(text);
    }
    let inner = &text[1..text.len() - 1];
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
                continue;
            }
        }
        result.push(ch);
    }
    Cow::Owned(result)
}

/// Wraps `text` in quotes, escaping quotes and backslashes. Inverse of
/// [`unquote`].
pub fn quote(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push(QUOTE);
    for ch in text.chars() {
        if matches!(ch, QUOTE | '\\') {
            result.push('\\');
        }
        result.push(ch);
    }
    result.push(QUOTE);
    result
}

/// Quotes `text` only when it would not survive tokenizing as part of a
/// single word.
pub fn quote_if_needed<'t>(text: &'t str, syntax: &Syntax) -> Cow<'t, str> {
    let needs_quotes = text.is_empty()
        || text.chars().any(|ch| {
            ch.is_whitespace()
                || matches!(ch, QUOTE | '\\')
                || ch == syntax.group_open
                || ch == syntax.group_close
        });
    if needs_quotes {
        Cow::Owned(quote(text))
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A group was opened and never closed, or closed without being opened.
    UnbalancedGroup,
    /// `and`, `or` or the negation marker is missing an operand.
    DanglingOperator,
    UnterminatedQuote,
    /// Groups nested deeper than [`MAX_GROUP_DEPTH`].
    TooDeep,
}

impl SyntaxErrorKind {
    fn message(self) -> &'static str {
        match self {
            SyntaxErrorKind::UnbalancedGroup => "unbalanced group",
            SyntaxErrorKind::DanglingOperator => "operator is missing an operand",
            SyntaxErrorKind::UnterminatedQuote => "missing closing quote",
            SyntaxErrorKind::TooDeep => "groups nested too deeply",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Byte offset of the offending marker, keyword or quote.
    pub position: usize,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.kind.message(), self.position)
    }
}

impl std::error::Error for SyntaxError {}

/// Recursive descent over the token stream with precedence
/// OR < AND < NOT < group/word.
struct Parser<'a, 's> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    syntax: &'s Syntax,
}

impl<'a, 's> Parser<'a, 's> {
    fn new(tokens: Vec<Token<'a>>, syntax: &'s Syntax) -> Self {
        Self {
            tokens,
            pos: 0,
            syntax,
        }
    }

    fn parse(mut self) -> Result<Option<Expr<Atom>>, SyntaxError> {
        self.check_groups()?;
        let expr = self.parse_or()?;
        // parse_or only stops before the end on a close marker nobody opened
        if let Some(token) = self.peek() {
            return Err(self.error(SyntaxErrorKind::UnbalancedGroup, token.start));
        }
        Ok(expr)
    }

    /// Balance and depth are settled up front so the descent below never
    /// nests deeper than [`MAX_GROUP_DEPTH`].
    fn check_groups(&self) -> Result<(), SyntaxError> {
        let mut open = Vec::new();
        let mut too_deep = None;
        for token in &self.tokens {
            match token.kind {
                TokenKind::GroupOpen => {
                    open.push(token.start);
                    if open.len() > MAX_GROUP_DEPTH && too_deep.is_none() {
                        too_deep = Some(token.start);
                    }
                }
                TokenKind::GroupClose => {
                    if open.pop().is_none() {
                        return Err(self.error(SyntaxErrorKind::UnbalancedGroup, token.start));
                    }
                }
                TokenKind::Word => {}
            }
        }
        if let Some(&start) = open.last() {
            return Err(self.error(SyntaxErrorKind::UnbalancedGroup, start));
        }
        match too_deep {
            Some(start) => Err(self.error(SyntaxErrorKind::TooDeep, start)),
            None => Ok(()),
        }
    }

    // Every `or` needs a non-empty operand on both sides; `a or ()` is an
    // error rather than `a`.
    fn parse_or(&mut self) -> Result<Option<Expr<Atom>>, SyntaxError> {
        if !self.at_operand() {
            if let Some((_, start)) = self.peek_keyword() {
                return Err(self.error(SyntaxErrorKind::DanglingOperator, start));
            }
            // empty query or empty group
            return Ok(None);
        }

        let mut parts = Vec::new();
        let mut operand = self.parse_and()?;
        while let Some(start) = self.eat_keyword(Keyword::Or) {
            let right = if self.at_operand() {
                self.parse_and()?
            } else {
                None
            };
            match (operand.take(), right) {
                (Some(left), Some(right)) => {
                    parts.push(left);
                    operand = Some(right);
                }
                _ => return Err(self.error(SyntaxErrorKind::DanglingOperator, start)),
            }
        }
        parts.extend(operand);
        Ok(Expr::join(parts, Expr::Or))
    }

    // Juxtaposed operands are joined like an explicit `and`, except that an
    // empty group next to them is simply dropped.
    fn parse_and(&mut self) -> Result<Option<Expr<Atom>>, SyntaxError> {
        let mut parts = Vec::new();
        let mut operand = self.parse_not()?;
        loop {
            if let Some(start) = self.eat_keyword(Keyword::And) {
                let right = if self.at_operand() {
                    self.parse_not()?
                } else {
                    None
                };
                match (operand.take(), right) {
                    (Some(left), Some(right)) => {
                        parts.push(left);
                        operand = Some(right);
                    }
                    _ => return Err(self.error(SyntaxErrorKind::DanglingOperator, start)),
                }
            } else if self.at_operand() {
                parts.extend(operand.take());
                operand = self.parse_not()?;
            } else {
                break;
            }
        }
        parts.extend(operand);
        Ok(Expr::join(parts, Expr::And))
    }

    // Markers may be glued to the word (`!foo`), stand alone (`! foo`), or
    // precede a group (`!(a or b)`). Only the parity of the count matters.
    fn parse_not(&mut self) -> Result<Option<Expr<Atom>>, SyntaxError> {
        let marker = self.syntax.not_marker;
        let mut negations = 0;
        let mut first_marker = None;
        let operand = loop {
            let Some(token) = self.next_token() else {
                return Ok(None);
            };
            match token.kind {
                TokenKind::GroupOpen => break self.parse_group(token.start)?,
                TokenKind::GroupClose => {
                    return Err(self.error(SyntaxErrorKind::UnbalancedGroup, token.start));
                }
                TokenKind::Word => {
                    let text = token.text.trim_start_matches(marker);
                    let prefix_len = token.text.len() - text.len();
                    if prefix_len > 0 {
                        negations += prefix_len / marker.len_utf8();
                        if first_marker.is_none() {
                            first_marker = Some(token.start);
                        }
                    }
                    if !text.is_empty() {
                        break Some(Expr::Leaf(Atom::new(text, token.start + prefix_len)));
                    }
                    if !self.at_operand() {
                        return Err(self.error(SyntaxErrorKind::DanglingOperator, token.start));
                    }
                }
            }
        };

        match (operand, first_marker) {
            (Some(expr), _) if negations % 2 == 1 => Ok(Some(expr.negate())),
            (Some(expr), _) => Ok(Some(expr)),
            // `! ()`
            (None, Some(start)) => Err(self.error(SyntaxErrorKind::DanglingOperator, start)),
            (None, None) => Ok(None),
        }
    }

    fn parse_group(&mut self, open_at: usize) -> Result<Option<Expr<Atom>>, SyntaxError> {
        let inner = self.parse_or()?;
        match self.next_token() {
            Some(token) if token.kind == TokenKind::GroupClose => Ok(inner),
            _ => Err(self.error(SyntaxErrorKind::UnbalancedGroup, open_at)),
        }
    }

    /// Whether the next token can start an operand.
    fn at_operand(&self) -> bool {
        match self.peek() {
            Some(token) => match token.kind {
                TokenKind::GroupOpen => true,
                TokenKind::GroupClose => false,
                TokenKind::Word => self.syntax.keyword(token.text).is_none(),
            },
            None => false,
        }
    }

    fn peek_keyword(&self) -> Option<(Keyword, usize)> {
        let token = self.peek()?;
        if token.kind != TokenKind::Word {
            return None;
        }
        self.syntax
            .keyword(token.text)
            .map(|keyword| (keyword, token.start))
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> Option<usize> {
        match self.peek_keyword() {
            Some((found, start)) if found == keyword => {
                self.pos += 1;
                Some(start)
            }
            _ => None,
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, kind: SyntaxErrorKind, position: usize) -> SyntaxError {
        SyntaxError { kind, position }
    }
}
