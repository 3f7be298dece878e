//! Alert conditions.
//!
//! Schemas attach boolean conditions such as `result > 30` to alert rules.
//! They are compiled by a small tokenizer and recursive-descent parser into
//! an AST and evaluated by walking it. The grammar only admits numeric
//! literals, the bound variable, comparisons, `&&`, `||` and parentheses:
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := atom ( "&&" atom )*
//! atom    := "(" or ")" | operand cmp operand
//! operand := number | "result" | "total"
//! cmp     := "<" | "<=" | ">" | ">=" | "=="
//! ```
//!
//! Anything outside it is a parse error; nothing is ever executed.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Nesting limit for parenthesised groups.
const MAX_DEPTH: usize = 32;

/// Comparison limit per condition. `&&`/`||` chains build one tree level
/// per term, so this bounds the AST depth alongside [`MAX_DEPTH`].
const MAX_TERMS: usize = 64;

/// Names that bind to the computed result total. `resultado` is accepted
/// for page configurations written against the Portuguese field names.
const RESULT_NAMES: &[&str] = &["result", "total", "resultado"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unknown identifier '{name}' at offset {offset}")]
    UnknownIdentifier { name: String, offset: usize },

    #[error("expected {expected} at offset {offset}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of condition, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("condition nests deeper than {MAX_DEPTH} groups")]
    TooDeep,

    #[error("condition has more than {MAX_TERMS} comparisons")]
    TooManyTerms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Eq => left == right,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Result,
    Literal(f64),
}

impl Operand {
    fn resolve(self, result: f64) -> f64 {
        match self {
            Self::Result => result,
            Self::Literal(value) => value,
        }
    }
}

/// A compiled alert condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Operand,
        op: Comparison,
        right: Operand,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn parse(source: &str) -> Result<Self, ConditionError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ConditionError::Empty);
        }
        let mut parser = Parser {
            tokens,
            position: 0,
            depth: 0,
            terms: 0,
        };
        let condition = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(ConditionError::UnexpectedToken {
                expected: "end of condition",
                found: token.kind.to_string(),
                offset: token.offset,
            });
        }
        Ok(condition)
    }

    /// Evaluate against the computed result total.
    pub fn evaluate(&self, result: f64) -> bool {
        match self {
            Self::Compare { left, op, right } => {
                op.apply(left.resolve(result), right.resolve(result))
            }
            Self::And(left, right) => left.evaluate(result) && right.evaluate(result),
            Self::Or(left, right) => left.evaluate(result) || right.evaluate(result),
        }
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Result => f.write_str("result"),
            Self::Literal(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { left, op, right } => write!(f, "{left} {} {right}", op.symbol()),
            Self::And(left, right) => write!(f, "({left} && {right})"),
            Self::Or(left, right) => write!(f, "({left} || {right})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Cmp(Comparison),
    AndAnd,
    OrOr,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number {value}"),
            Self::Ident(name) => write!(f, "'{name}'"),
            Self::Cmp(op) => write!(f, "'{}'", op.symbol()),
            Self::AndAnd => f.write_str("'&&'"),
            Self::OrOr => f.write_str("'||'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ConditionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let offset = i;
        let next = bytes.get(i + 1).copied();

        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b'<' | b'>' => {
                let inclusive = next == Some(b'=');
                i += if inclusive { 2 } else { 1 };
                TokenKind::Cmp(match (c, inclusive) {
                    (b'<', false) => Comparison::Lt,
                    (b'<', true) => Comparison::Le,
                    (_, false) => Comparison::Gt,
                    (_, true) => Comparison::Ge,
                })
            }
            b'=' if next == Some(b'=') => {
                i += 2;
                TokenKind::Cmp(Comparison::Eq)
            }
            b'&' if next == Some(b'&') => {
                i += 2;
                TokenKind::AndAnd
            }
            b'|' if next == Some(b'|') => {
                i += 2;
                TokenKind::OrOr
            }
            b'0'..=b'9' | b'.' => {
                let (value, end) = lex_number(source, i)?;
                i = end;
                TokenKind::Number(value)
            }
            b'-' if next.is_some_and(|n| n.is_ascii_digit() || n == b'.') => {
                let (value, end) = lex_number(source, i + 1)?;
                i = end;
                TokenKind::Number(-value)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(source[start..i].to_string())
            }
            _ => {
                // Report the full character, not just the leading byte.
                let ch = source[offset..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ConditionError::UnexpectedChar { ch, offset });
            }
        };

        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn lex_number(source: &str, start: usize) -> Result<(f64, usize), ConditionError> {
    let bytes = source.as_bytes();
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    let text = &source[start..end];
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| (v, end))
        .ok_or_else(|| ConditionError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        })
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Condition, ConditionError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token { kind: TokenKind::OrOr, .. })) {
            self.advance();
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition, ConditionError> {
        let mut left = self.parse_atom()?;
        while matches!(self.peek(), Some(Token { kind: TokenKind::AndAnd, .. })) {
            self.advance();
            let right = self.parse_atom()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Condition, ConditionError> {
        if matches!(self.peek(), Some(Token { kind: TokenKind::LParen, .. })) {
            self.advance();
            self.depth += 1;
            if self.depth > MAX_DEPTH {
                return Err(ConditionError::TooDeep);
            }
            let inner = self.parse_or()?;
            self.depth -= 1;
            return match self.advance() {
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => Ok(inner),
                Some(token) => Err(ConditionError::UnexpectedToken {
                    expected: "')'",
                    found: token.kind.to_string(),
                    offset: token.offset,
                }),
                None => Err(ConditionError::UnexpectedEnd { expected: "')'" }),
            };
        }

        self.terms += 1;
        if self.terms > MAX_TERMS {
            return Err(ConditionError::TooManyTerms);
        }
        let left = self.parse_operand()?;
        let op = match self.advance() {
            Some(Token {
                kind: TokenKind::Cmp(op),
                ..
            }) => op,
            Some(token) => {
                return Err(ConditionError::UnexpectedToken {
                    expected: "comparison operator",
                    found: token.kind.to_string(),
                    offset: token.offset,
                });
            }
            None => {
                return Err(ConditionError::UnexpectedEnd {
                    expected: "comparison operator",
                });
            }
        };
        let right = self.parse_operand()?;
        Ok(Condition::Compare { left, op, right })
    }

    fn parse_operand(&mut self) -> Result<Operand, ConditionError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Number(value),
                ..
            }) => Ok(Operand::Literal(value)),
            Some(Token {
                kind: TokenKind::Ident(name),
                offset,
            }) => {
                if RESULT_NAMES.contains(&name.as_str()) {
                    Ok(Operand::Result)
                } else {
                    Err(ConditionError::UnknownIdentifier { name, offset })
                }
            }
            Some(token) => Err(ConditionError::UnexpectedToken {
                expected: "number or 'result'",
                found: token.kind.to_string(),
                offset: token.offset,
            }),
            None => Err(ConditionError::UnexpectedEnd {
                expected: "number or 'result'",
            }),
        }
    }
}
