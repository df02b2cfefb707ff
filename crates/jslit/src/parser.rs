//! Cursor parser for the object-literal micro-language.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::JsLitError;

/// Recursive-descent parser over a source string.
///
/// The accepted grammar is JSON extended with what minified manifest scripts
/// actually contain: single-quoted strings, unquoted object keys, `undefined`
/// and `void 0` (both read as null), the minified booleans `!0`/`!1`, and
/// bare identifiers resolved through a substitution map.
pub struct Parser<'a> {
    src: &'a str,
    pos: usize,
    vars: Option<&'a HashMap<String, Value>>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            vars: None,
        }
    }

    pub fn with_vars(src: &'a str, vars: &'a HashMap<String, Value>) -> Self {
        Self {
            src,
            pos: 0,
            vars: Some(vars),
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Result<char, JsLitError> {
        self.src[self.pos..]
            .chars()
            .next()
            .ok_or(JsLitError::UnexpectedEof)
    }

    fn bump(&mut self) -> Result<char, JsLitError> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    fn try_eat(&mut self, what: &str) -> bool {
        if self.src[self.pos..].starts_with(what) {
            self.pos += what.len();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, what: char) -> Result<(), JsLitError> {
        let ch = self.peek()?;
        if ch == what {
            self.pos += ch.len_utf8();
            Ok(())
        } else {
            Err(JsLitError::UnexpectedChar {
                found: ch,
                at: self.pos,
            })
        }
    }

    fn skip_spaces(&mut self) {
        while let Some(ch) = self.src[self.pos..].chars().next() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Parses one value, leaving the cursor just past it.
    pub fn value(&mut self) -> Result<Value, JsLitError> {
        self.skip_spaces();
        let ch = self.peek()?;
        match ch {
            '{' => self.object(),
            '[' => self.array(),
            '"' | '\'' => Ok(Value::String(self.string()?)),
            '-' | '.' | '0'..='9' => self.number(),
            _ => {
                if self.try_eat("null") {
                    Ok(Value::Null)
                } else if self.try_eat("true") || self.try_eat("!0") {
                    Ok(Value::Bool(true))
                } else if self.try_eat("false") || self.try_eat("!1") {
                    Ok(Value::Bool(false))
                } else if self.try_eat("void 0") || self.try_eat("undefined") {
                    Ok(Value::Null)
                } else {
                    let at = self.pos;
                    let name = self.identifier();
                    if name.is_empty() {
                        return Err(JsLitError::UnexpectedChar { found: ch, at });
                    }
                    match self.vars.and_then(|vars| vars.get(&name)) {
                        Some(value) => Ok(value.clone()),
                        None => Err(JsLitError::UnknownIdentifier { name, at }),
                    }
                }
            }
        }
    }

    fn object(&mut self) -> Result<Value, JsLitError> {
        self.eat('{')?;
        let mut map = Map::new();
        self.skip_spaces();
        while self.peek()? != '}' {
            let key = self.object_key()?;
            self.eat(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_spaces();
            if self.peek()? == '}' {
                break;
            }
            self.eat(',')?;
            self.skip_spaces();
        }
        self.eat('}')?;
        Ok(Value::Object(map))
    }

    fn object_key(&mut self) -> Result<String, JsLitError> {
        self.skip_spaces();
        let key = match self.peek()? {
            '"' | '\'' => self.string()?,
            _ => {
                let at = self.pos;
                let name = self.identifier();
                if name.is_empty() {
                    return Err(JsLitError::Expected {
                        what: "object key",
                        at,
                    });
                }
                name
            }
        };
        self.skip_spaces();
        Ok(key)
    }

    fn array(&mut self) -> Result<Value, JsLitError> {
        self.eat('[')?;
        let mut items = Vec::new();
        self.skip_spaces();
        while self.peek()? != ']' {
            items.push(self.value()?);
            self.skip_spaces();
            if !self.try_eat(",") {
                break;
            }
            self.skip_spaces();
        }
        self.eat(']')?;
        Ok(Value::Array(items))
    }

    fn string(&mut self) -> Result<String, JsLitError> {
        let delim = self.bump()?;
        let mut out = String::new();
        loop {
            let ch = self.bump()?;
            if ch == delim {
                return Ok(out);
            }
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            let escaped = self.bump()?;
            match escaped {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => out.push(self.unicode_escape()?),
                other => out.push(other),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, JsLitError> {
        let at = self.pos;
        let first = self.hex4()?;
        // Surrogate pairs arrive as two consecutive \uXXXX escapes.
        if (0xd800..0xdc00).contains(&first) {
            if !self.try_eat("\\u") {
                return Err(JsLitError::InvalidEscape { at });
            }
            let second = self.hex4()?;
            if !(0xdc00..0xe000).contains(&second) {
                return Err(JsLitError::InvalidEscape { at });
            }
            let combined = 0x10000 + ((first - 0xd800) << 10) + (second - 0xdc00);
            return char::from_u32(combined).ok_or(JsLitError::InvalidEscape { at });
        }
        char::from_u32(first).ok_or(JsLitError::InvalidEscape { at })
    }

    fn hex4(&mut self) -> Result<u32, JsLitError> {
        let at = self.pos;
        let digits = self
            .src
            .get(self.pos..self.pos + 4)
            .ok_or(JsLitError::UnexpectedEof)?;
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| JsLitError::InvalidEscape { at })?;
        self.pos += 4;
        Ok(code)
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while let Ok(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_owned()
    }

    fn number(&mut self) -> Result<Value, JsLitError> {
        let start = self.pos;
        let mut integer = true;
        if self.peek()? == '-' {
            self.bump()?;
        }
        while !self.eof() && self.peek()?.is_ascii_digit() {
            self.bump()?;
        }
        if !self.eof() && self.peek()? == '.' {
            integer = false;
            self.bump()?;
            while !self.eof() && self.peek()?.is_ascii_digit() {
                self.bump()?;
            }
        }
        if !self.eof() && matches!(self.peek()?, 'e' | 'E') {
            integer = false;
            self.bump()?;
            if !self.eof() && matches!(self.peek()?, '-' | '+') {
                self.bump()?;
            }
            while !self.eof() && self.peek()?.is_ascii_digit() {
                self.bump()?;
            }
        }
        let text = &self.src[start..self.pos];
        if text.is_empty() || text == "-" {
            return Err(JsLitError::InvalidNumber { at: start });
        }
        if integer {
            let n: i64 = text
                .parse()
                .map_err(|_| JsLitError::InvalidNumber { at: start })?;
            Ok(Value::Number(n.into()))
        } else {
            let n: f64 = text
                .parse()
                .map_err(|_| JsLitError::InvalidNumber { at: start })?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or(JsLitError::InvalidNumber { at: start })
        }
    }

    /// Parses the whole source as one value; trailing non-space input is an
    /// error when `strict` is set.
    pub fn parse_document(&mut self, strict: bool) -> Result<Value, JsLitError> {
        let value = self.value()?;
        self.skip_spaces();
        if strict && !self.eof() {
            return Err(JsLitError::TrailingData { at: self.pos });
        }
        Ok(value)
    }
}
