//! Recursive-descent reader for definition text.

use crate::error::{BlazonError, Result};

use super::span::Location;
use super::types::{scalar_from_token, Block, Map, Value};

/// Marker older exports put in front of editor-only fields so the game
/// treats them as comments. The reader ignores the marker itself.
pub const META_PREFIX: &str = "##META##";

/// Parse definition text into a generic tree.
///
/// The root is an implicit mapping with no surrounding braces; any key is
/// accepted there. Errors abort the whole parse.
pub fn parse(text: &str) -> Result<Map> {
    let map = Reader::new(text).read_entries(None)?;
    tracing::trace!(keys = map.len(), "parsed root");
    Ok(map)
}

struct Reader<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':' | b'@')
}

fn is_token_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'=' | b'{' | b'}' | b'#' | b'"')
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, offset: usize, message: impl Into<String>, help: Option<&str>) -> BlazonError {
        BlazonError::Parse {
            message: message.into(),
            location: Location::at(self.source, offset),
            help: help.map(str::to_string),
        }
    }

    /// Describe the byte at `pos` for error messages.
    fn found(&self) -> String {
        match self.source[self.pos..].chars().next() {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        }
    }

    /// Skip whitespace, comments and metadata markers.
    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'#' {
                if self.source[self.pos..].starts_with(META_PREFIX) {
                    self.pos += META_PREFIX.len();
                    continue;
                }
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_byte) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn read_token(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| !is_token_end(b)) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    /// Read mapping entries until the closing brace, or until end of input
    /// for the root (`open` is `None`).
    fn read_entries(&mut self, open: Option<usize>) -> Result<Map> {
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match (self.peek(), open) {
                (None, None) => return Ok(map),
                (None, Some(open)) => {
                    return Err(self.error(open, "unclosed block", Some("Add a matching '}'")))
                }
                (Some(b'}'), Some(_)) => {
                    self.pos += 1;
                    return Ok(map);
                }
                (Some(b'}'), None) => {
                    return Err(self.error(self.pos, "unexpected '}'", Some("Remove the extra '}'")))
                }
                _ => {}
            }

            let key_start = self.pos;
            let key = self.read_identifier();
            if key.is_empty() {
                return Err(self.error(key_start, format!("expected key, found {}", self.found()), None));
            }

            self.skip_trivia();
            if self.peek() != Some(b'=') {
                return Err(self.error(
                    self.pos,
                    format!("expected '=' after key '{}'", key),
                    Some("Entries are written as `key = value`"),
                ));
            }
            self.pos += 1;

            let value = self.read_value()?;
            map.push(key, value);
        }
    }

    fn read_value(&mut self) -> Result<Value> {
        self.skip_trivia();
        let start = self.pos;
        match self.peek() {
            None => Err(self.error(start, "expected value, found end of input", None)),
            Some(b'"') => self.read_string().map(Value::Str),
            Some(b'{') => {
                self.pos += 1;
                self.read_block(start).map(Value::Block)
            }
            Some(b'}') | Some(b'=') => {
                Err(self.error(start, format!("expected value, found {}", self.found()), None))
            }
            Some(_) => {
                let token = self.read_token();
                if token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                    let after_token = self.pos;
                    self.skip_trivia();
                    if self.peek() == Some(b'{') {
                        self.skip_braced(start)?;
                        return Ok(Value::Raw(self.source[start..self.pos].trim().to_string()));
                    }
                    self.pos = after_token;
                }
                Ok(scalar_from_token(token))
            }
        }
    }

    /// Read a quoted string. `\"` and `\\` are unescaped; any other
    /// backslash is kept as written.
    fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        let mut run = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    text.push_str(&self.source[run..self.pos]);
                    self.pos += 1;
                    return Ok(text);
                }
                b'\\' if matches!(self.bytes.get(self.pos + 1), Some(b'"' | b'\\')) => {
                    text.push_str(&self.source[run..self.pos]);
                    self.pos += 1;
                    run = self.pos;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        Err(self.error(start, "unterminated string", Some("Add a closing '\"'")))
    }

    /// Consume a balanced `{ ... }` starting at the current position.
    fn skip_braced(&mut self, construct_start: usize) -> Result<()> {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                b'"' => {
                    self.read_string()?;
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error(construct_start, "unterminated block construct", Some("Add a matching '}'")))
    }

    /// Read a block body after its `{`. A leading `identifier =` makes it a
    /// mapping; anything else (including `{ }`) is an array.
    fn read_block(&mut self, open: usize) -> Result<Block> {
        if self.looks_like_map() {
            self.read_entries(Some(open)).map(Block::Map)
        } else {
            self.read_array(open).map(Block::Array)
        }
    }

    fn looks_like_map(&mut self) -> bool {
        let saved = self.pos;
        self.skip_trivia();
        let is_map = !self.read_identifier().is_empty() && {
            self.skip_trivia();
            self.peek() == Some(b'=')
        };
        self.pos = saved;
        is_map
    }

    fn read_array(&mut self, open: usize) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(self.error(open, "unclosed block", Some("Add a matching '}'"))),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(b'=') => {
                    return Err(self.error(self.pos, "unexpected '=' inside array", None));
                }
                Some(_) => items.push(self.read_value()?),
            }
        }
    }
}
