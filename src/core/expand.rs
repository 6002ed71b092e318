//! Expansion of `key=value` dumps embedded in string columns.
//!
//! CloudTrail Lake renders nested event fields (for example `userIdentity` or
//! `requestParameters`) as `{type=IAMUser, sessionContext={mfaAuthenticated=false}}`.
//! The dialect is lexed into tokens and parsed recursively:
//!
//! ```text
//! top    := object | array | pairs
//! object := '{' [ pair (',' pair)* ] '}'
//! pair   := key '=' value
//! array  := '[' [ value (',' value)* ] ']'
//! value  := object | array | quoted | scalar
//! ```
//!
//! Scalars stay strings; typing them is the normalizer's job.

use crate::domain::model::Row;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const PARSED_SUFFIX: &str = "__parsed";

/// Deepest `{`/`[` nesting accepted before a dump is rejected.
pub const MAX_DEPTH: usize = 128;

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+\s*=").expect("key pattern is a valid regex")
});

/// Adds a `<column>__parsed` field for every string column holding a parsable dump.
/// Columns that do not parse are left alone.
pub fn expand_row(row: &mut Row) {
    let parsed: Vec<(String, Value)> = row
        .iter()
        .filter_map(|(column, value)| match value {
            Value::String(text) => {
                expand_value(text).map(|parsed| (format!("{column}{PARSED_SUFFIX}"), parsed))
            }
            _ => None,
        })
        .collect();

    for (column, value) in parsed {
        tracing::trace!("expanded column {}", column);
        row.insert(column, value);
    }
}

/// Parses one dump into a structured value, or `None` when the text is not a dump.
pub fn expand_value(text: &str) -> Option<Value> {
    if text.is_empty() || !KEY_PATTERN.is_match(text) {
        return None;
    }
    let tokens = tokenize(text)?;
    let mut parser = Parser::new(&tokens);
    let value = parser.parse_document()?;
    (parser.pairs > 0).then_some(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Equals,
    Quoted(String),
    Text(&'a str),
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ',' | '=' | '"')
}

fn tokenize(text: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let token = match c {
            '{' => Token::OpenBrace,
            '}' => Token::CloseBrace,
            '[' => Token::OpenBracket,
            ']' => Token::CloseBracket,
            ',' => Token::Comma,
            '=' => Token::Equals,
            '"' => {
                chars.next();
                tokens.push(Token::Quoted(read_quoted(&mut chars)?));
                continue;
            }
            _ => {
                let mut end = text.len();
                while let Some(&(i, c)) = chars.peek() {
                    if is_delimiter(c) {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                tokens.push(Token::Text(&text[start..end]));
                continue;
            }
        };
        chars.next();
        tokens.push(token);
    }

    Some(tokens)
}

// Reads up to the closing quote; `None` if the string is unterminated.
fn read_quoted(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<String> {
    let mut out = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => {
                let (_, escaped) = chars.next()?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }
    None
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    pairs: usize,
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            pairs: 0,
            depth: 0,
        }
    }

    fn parse_document(&mut self) -> Option<Value> {
        self.skip_blank();
        let value = match self.peek()? {
            Token::OpenBrace | Token::OpenBracket => self.parse_value()?,
            _ => Value::Object(self.parse_pairs(None)?),
        };
        self.skip_blank();
        self.at_end().then_some(value)
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_blank();
        match self.peek() {
            Some(Token::OpenBrace) => {
                self.pos += 1;
                self.enter()?;
                let map = self.parse_pairs(Some(Token::CloseBrace))?;
                self.depth -= 1;
                Some(Value::Object(map))
            }
            Some(Token::OpenBracket) => {
                self.pos += 1;
                self.enter()?;
                let array = self.parse_array()?;
                self.depth -= 1;
                Some(array)
            }
            Some(Token::Quoted(s)) => {
                let s = s.clone();
                self.pos += 1;
                self.skip_blank();
                Some(Value::String(s))
            }
            _ => Some(Value::String(self.parse_scalar())),
        }
    }

    // Pairs up to `close`, or to the end of input for a bare top-level list.
    fn parse_pairs(&mut self, close: Option<Token<'a>>) -> Option<Map<String, Value>> {
        let mut map = Map::new();
        self.skip_blank();
        if close.is_some() && self.peek() == close.as_ref() {
            self.pos += 1;
            return Some(map);
        }

        loop {
            let key = self.parse_key()?;
            self.expect(&Token::Equals)?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.pairs += 1;

            self.skip_blank();
            match (self.peek(), &close) {
                (Some(Token::Comma), _) => self.pos += 1,
                (Some(token), Some(close)) if token == close => {
                    self.pos += 1;
                    return Some(map);
                }
                (None, None) => return Some(map),
                _ => return None,
            }
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        let mut items = Vec::new();
        self.skip_blank();
        if self.peek() == Some(&Token::CloseBracket) {
            self.pos += 1;
            return Some(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_blank();
            match self.peek()? {
                Token::Comma => self.pos += 1,
                Token::CloseBracket => {
                    self.pos += 1;
                    return Some(Value::Array(items));
                }
                _ => return None,
            }
        }
    }

    fn parse_key(&mut self) -> Option<String> {
        self.skip_blank();
        let key = match self.peek()? {
            Token::Quoted(s) => s.clone(),
            Token::Text(text) => {
                let key = text.trim();
                if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return None;
                }
                key.to_string()
            }
            _ => return None,
        };
        self.pos += 1;
        self.skip_blank();
        Some(key)
    }

    // Raw text up to the next ',' '}' or ']'. An '=' inside a value is kept.
    fn parse_scalar(&mut self) -> String {
        let mut raw = String::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Text(text) => raw.push_str(text),
                Token::Equals => raw.push('='),
                _ => break,
            }
            self.pos += 1;
        }
        raw.trim().to_string()
    }

    fn enter(&mut self) -> Option<()> {
        self.depth += 1;
        (self.depth <= MAX_DEPTH).then_some(())
    }

    fn expect(&mut self, expected: &Token<'a>) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn skip_blank(&mut self) {
        while let Some(Token::Text(text)) = self.peek() {
            if !text.trim().is_empty() {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
