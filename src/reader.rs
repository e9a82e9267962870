//! Streaming JSON tokenizer
//!
//! [`JsonReader`] turns JSON text into a flat sequence of [`Token`]s, each
//! stamped with the 1-based line and column of its first character. A single
//! token of look-ahead is available through [`JsonReader::peek`].

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;

/// Kind and literal value of a token
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// Member name, including the `:` that follows it
    PropertyName(String),
    /// String literal
    String(String),
    /// Number without fraction or exponent that fits in an `i64`
    Integer(i64),
    /// Any other number
    Float(f64),
    /// `true` or `false`
    Boolean(bool),
    /// `null`
    Null,
}

impl JsonToken {
    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            JsonToken::StartObject => "StartObject",
            JsonToken::EndObject => "EndObject",
            JsonToken::StartArray => "StartArray",
            JsonToken::EndArray => "EndArray",
            JsonToken::PropertyName(_) => "PropertyName",
            JsonToken::String(_) => "String",
            JsonToken::Integer(_) => "Integer",
            JsonToken::Float(_) => "Float",
            JsonToken::Boolean(_) => "Boolean",
            JsonToken::Null => "Null",
        }
    }
}

/// A token with the position of its first character
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read
    pub kind: JsonToken,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    ObjectStart,
    ObjectValue,
    ObjectAfterValue,
    ArrayStart,
    ArrayAfterValue,
    Finished,
}

/// Pull-based JSON tokenizer
pub struct JsonReader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    state: State,
    stack: Vec<Container>,
    peeked: Option<Token>,
    limits: Limits,
}

impl<'a> JsonReader<'a> {
    /// Create a reader over `text` with default limits
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
            state: State::Start,
            stack: Vec::new(),
            peeked: None,
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Current container nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume the next token; `Ok(None)` once the top-level value is complete
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.read_token()
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Result<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = self.read_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn read_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        match self.state {
            State::Start | State::ObjectValue => self.read_value().map(Some),
            State::ObjectStart => match self.chars.peek() {
                Some('}') => Ok(Some(self.end_container(JsonToken::EndObject))),
                Some('"') => self.read_property_name().map(Some),
                Some(&c) => Err(self.unexpected(c, "while parsing object")),
                None => Err(self.eof()),
            },
            State::ObjectAfterValue => match self.chars.peek() {
                Some('}') => Ok(Some(self.end_container(JsonToken::EndObject))),
                Some(',') => {
                    self.bump();
                    self.skip_whitespace();
                    match self.chars.peek() {
                        Some('"') => self.read_property_name().map(Some),
                        Some(&c) => Err(self.unexpected(c, "while parsing object")),
                        None => Err(self.eof()),
                    }
                }
                Some(&c) => Err(self.unexpected(c, "after property value")),
                None => Err(self.eof()),
            },
            State::ArrayStart => match self.chars.peek() {
                Some(']') => Ok(Some(self.end_container(JsonToken::EndArray))),
                _ => self.read_value().map(Some),
            },
            State::ArrayAfterValue => match self.chars.peek() {
                Some(']') => Ok(Some(self.end_container(JsonToken::EndArray))),
                Some(',') => {
                    self.bump();
                    self.skip_whitespace();
                    self.read_value().map(Some)
                }
                Some(&c) => Err(self.unexpected(c, "after array item")),
                None => Err(self.eof()),
            },
            State::Finished => match self.chars.peek() {
                None => Ok(None),
                Some(&c) => Err(parse_error(
                    format!(
                        "Additional text encountered after finished reading JSON content: '{}'.",
                        c
                    ),
                    self.line,
                    self.column,
                )),
            },
        }
    }

    fn read_value(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let kind = match self.chars.peek().copied() {
            Some('{') => {
                self.bump();
                self.stack.push(Container::Object);
                self.limits.check_depth(self.stack.len())?;
                self.state = State::ObjectStart;
                return Ok(Token {
                    kind: JsonToken::StartObject,
                    line,
                    column,
                });
            }
            Some('[') => {
                self.bump();
                self.stack.push(Container::Array);
                self.limits.check_depth(self.stack.len())?;
                self.state = State::ArrayStart;
                return Ok(Token {
                    kind: JsonToken::StartArray,
                    line,
                    column,
                });
            }
            Some('"') => JsonToken::String(self.read_string()?),
            Some('t') => {
                self.expect_literal("true")?;
                JsonToken::Boolean(true)
            }
            Some('f') => {
                self.expect_literal("false")?;
                JsonToken::Boolean(false)
            }
            Some('n') => {
                self.expect_literal("null")?;
                JsonToken::Null
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.read_number()?,
            Some(c) => return Err(self.unexpected(c, "while parsing value")),
            None => return Err(self.eof()),
        };
        self.after_value();
        Ok(Token { kind, line, column })
    }

    fn read_property_name(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let name = self.read_string()?;
        self.skip_whitespace();
        match self.chars.peek() {
            Some(':') => {
                self.bump();
            }
            Some(&c) => return Err(self.unexpected(c, "after property name")),
            None => return Err(self.eof()),
        }
        self.state = State::ObjectValue;
        Ok(Token {
            kind: JsonToken::PropertyName(name),
            line,
            column,
        })
    }

    fn end_container(&mut self, kind: JsonToken) -> Token {
        let (line, column) = (self.line, self.column);
        self.bump();
        self.stack.pop();
        self.after_value();
        Token { kind, line, column }
    }

    fn after_value(&mut self) {
        self.state = match self.stack.last() {
            None => State::Finished,
            Some(Container::Object) => State::ObjectAfterValue,
            Some(Container::Array) => State::ArrayAfterValue,
        };
    }

    fn read_string(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        // opening quote
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(parse_error("Unterminated string.", line, column)),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let c = self.read_escape()?;
                    out.push(c);
                }
                Some(c) if (c as u32) < 0x20 => {
                    return Err(parse_error(
                        format!("Invalid control character {:#04x} in string.", c as u32),
                        self.line,
                        self.column,
                    ))
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char> {
        let (line, column) = (self.line, self.column);
        let c = match self.bump() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000C}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                let high = self.read_hex4()?;
                if (0xD800..0xDC00).contains(&high) {
                    if self.bump() != Some('\\') || self.bump() != Some('u') {
                        return Err(parse_error("Invalid Unicode surrogate pair.", line, column));
                    }
                    let low = self.read_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(parse_error("Invalid Unicode surrogate pair.", line, column));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code)
                        .ok_or_else(|| parse_error("Invalid Unicode escape.", line, column))?
                } else {
                    char::from_u32(high)
                        .ok_or_else(|| parse_error("Invalid Unicode escape.", line, column))?
                }
            }
            Some(c) => {
                return Err(parse_error(
                    format!("Bad JSON escape sequence: \\{}.", c),
                    line,
                    column,
                ))
            }
            None => return Err(self.eof()),
        };
        Ok(c)
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let (line, column) = (self.line, self.column);
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| parse_error("Invalid Unicode escape.", line, column))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn read_number(&mut self) -> Result<JsonToken> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let invalid = || parse_error(format!("Input string '{}' is not a valid number.", text), line, column);
        if !is_json_number(&text) {
            return Err(invalid());
        }

        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().map(JsonToken::Float).map_err(|_| invalid())
        } else {
            match text.parse::<i64>() {
                Ok(i) => Ok(JsonToken::Integer(i)),
                Err(_) => text.parse::<f64>().map(JsonToken::Float).map_err(|_| invalid()),
            }
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<()> {
        let (line, column) = (self.line, self.column);
        for expected in literal.chars() {
            if self.bump() != Some(expected) {
                return Err(parse_error(
                    format!("Error parsing literal, expected '{}'.", literal),
                    line,
                    column,
                ));
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {
                if self.chars.peek() == Some(&'\n') {
                    self.chars.next();
                }
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        Some(c)
    }

    fn unexpected(&self, c: char, context: &str) -> Error {
        parse_error(
            format!("Unexpected character encountered {}: '{}'.", context, c),
            self.line,
            self.column,
        )
    }

    fn eof(&self) -> Error {
        parse_error("Unexpected end of content.", self.line, self.column)
    }
}

fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Error {
    Error::Parse(ParseError::new(message, line, column))
}

/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn is_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
