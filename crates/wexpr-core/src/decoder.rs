//! Textual Wexpr decoder — parses Wexpr source into an [`Expression`] tree.
//!
//! The decoder is a recursive-descent parser over a byte cursor. It handles
//! the full textual surface:
//!
//! - Unquoted values (`asdf`, `2.3`) and quoted values (`"with spaces"`)
//! - `nil` / `null` keywords
//! - Arrays `#(a b c)` and maps `@(key1 value1 key2 value2)`
//! - Binary data as Base64 between angle brackets (`<SGVsbG8=>`)
//! - Line comments (`;` to end of line) and block comments (`;(--` to the
//!   first `--)`), stripped and never stored
//! - Reference declarations `[name]` and expansions `*[name]`, resolved at
//!   parse time and never stored
//!
//! # Key design decisions
//!
//! - **Two-byte sigil lookahead**: `#(`, `@(` and `*[` are only structural
//!   as a pair; a lone `*` still starts an unquoted value.
//! - **Construct-anchored errors**: "unterminated X" errors report the
//!   line/column where X *started*, not where the input ran out.
//! - **Transient reference table**: `[name]` bindings live in the decoder
//!   only. Expansion deep-copies the bound subtree, so the resulting tree
//!   stays acyclic and shares no storage with the table.

use crate::error::{ErrorCode, Result, WexprError};
use crate::expression::Expression;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;

/// Flags for parsing. Only [`ParseFlags::None`] exists today; the parameter
/// is kept so the signatures can grow with the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseFlags {
    #[default]
    None,
}

impl Expression {
    /// Parse a textual Wexpr document into an expression tree.
    ///
    /// The document must hold exactly one root expression; anything but
    /// whitespace or comments after it is an error. An input that is empty
    /// once comments and whitespace are stripped yields
    /// [`Expression::Invalid`] without an error.
    pub fn from_text(text: &str, _flags: ParseFlags) -> Result<Expression> {
        let mut decoder = Decoder::new(text);
        decoder.skip_whitespace_and_comments()?;
        if decoder.at_end() {
            return Ok(Expression::Invalid);
        }
        let expr = decoder.parse_expression()?;
        decoder.skip_whitespace_and_comments()?;
        if !decoder.at_end() {
            return Err(WexprError::parse(
                ErrorCode::ExtraDataAfterExpression,
                decoder.line,
                decoder.column,
                "extra data after the root expression",
            ));
        }
        Ok(expr)
    }

    /// Parse a raw buffer that may hold either encoding.
    ///
    /// A leading `0x83` byte marks a binary Wexpr document (validated header
    /// plus chunks); anything else is taken as UTF-8 text. Invalid UTF-8 in
    /// the text path reports the position of the offending byte.
    pub fn from_buffer(data: &[u8], flags: ParseFlags) -> Result<Expression> {
        if data.first() == Some(&0x83) {
            return crate::binary::decode_document(data);
        }
        let text = std::str::from_utf8(data).map_err(|e| {
            let (line, column) = position_of_byte(data, e.valid_up_to());
            WexprError::parse(ErrorCode::InvalidUtf8, line, column, "invalid UTF-8 in input")
        })?;
        Expression::from_text(text, flags)
    }
}

/// Line/column (1-based, byte-counted) of the byte at `offset`.
fn position_of_byte(data: &[u8], offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for &b in &data[..offset] {
        if b == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Bytes that terminate an unquoted value and may never appear in one.
fn is_structural(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'[' | b']' | b'<' | b'>' | b'#' | b'@' | b'"' | b';'
    )
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_reference_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

struct Decoder<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    /// Declared references, by-value snapshots keyed by name. Lives only for
    /// the duration of one parse.
    references: HashMap<String, Expression>,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a str) -> Self {
        Decoder {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            references: HashMap::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consume one byte, keeping the line/column counters in step.
    fn advance(&mut self) {
        if let Some(&b) = self.bytes.get(self.pos) {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn error(
        &self,
        code: ErrorCode,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> WexprError {
        WexprError::parse(code, line, column, message)
    }

    /// Skip whitespace, line comments (`;` to end of line) and block
    /// comments (`;(--` to the first `--)`, non-nesting).
    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b) if is_whitespace(b) => self.advance(),
                Some(b';') => {
                    if self.peek_at(1) == Some(b'(')
                        && self.peek_at(2) == Some(b'-')
                        && self.peek_at(3) == Some(b'-')
                    {
                        self.skip_block_comment()?;
                    } else {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.advance();
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance_by(4); // ;(--
        loop {
            if self.pos + 3 > self.bytes.len() {
                return Err(self.error(
                    ErrorCode::BlockCommentMissingEnd,
                    start_line,
                    start_column,
                    "block comment is never closed with --)",
                ));
            }
            if &self.bytes[self.pos..self.pos + 3] == b"--)" {
                self.advance_by(3);
                return Ok(());
            }
            self.advance();
        }
    }

    /// Parse one expression at the cursor. The caller has already skipped
    /// leading whitespace and comments.
    fn parse_expression(&mut self) -> Result<Expression> {
        match self.peek() {
            None => Err(self.error(
                ErrorCode::InvalidExpression,
                self.line,
                self.column,
                "expected an expression, found end of input",
            )),
            Some(b'#') if self.peek_at(1) == Some(b'(') => self.parse_array(),
            Some(b'@') if self.peek_at(1) == Some(b'(') => self.parse_map(),
            Some(b'<') => self.parse_binary_data(),
            Some(b'"') => {
                let value = self.parse_quoted_value()?;
                Ok(Expression::Value(value))
            }
            Some(b'*') if self.peek_at(1) == Some(b'[') => self.parse_reference_expansion(),
            Some(b'[') => self.parse_reference_declaration(),
            Some(b) if is_structural(b) => Err(self.error(
                ErrorCode::InvalidExpression,
                self.line,
                self.column,
                format!("unexpected character '{}'", b as char),
            )),
            Some(_) => Ok(self.parse_word()),
        }
    }

    /// `#(` children... `)`
    fn parse_array(&mut self) -> Result<Expression> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance_by(2); // #(
        let mut children = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::ArrayMissingEndParen,
                        start_line,
                        start_column,
                        "array is never closed with )",
                    ));
                }
                Some(b')') => {
                    self.advance();
                    return Ok(Expression::Array(children));
                }
                Some(_) => children.push(self.parse_expression()?),
            }
        }
    }

    /// `@(` key value ... `)` — keys must reduce to values; a later binding
    /// for an existing key replaces it in place.
    fn parse_map(&mut self) -> Result<Expression> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance_by(2); // @(
        let mut map = Expression::Map(Vec::new());
        loop {
            self.skip_whitespace_and_comments()?;
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::MapMissingEndParen,
                        start_line,
                        start_column,
                        "map is never closed with )",
                    ));
                }
                Some(b')') => {
                    self.advance();
                    return Ok(map);
                }
                Some(_) => {}
            }

            let (key_line, key_column) = (self.line, self.column);
            let key_expr = self.parse_expression()?;
            let key = match key_expr {
                Expression::Value(key) => key,
                other => {
                    return Err(self.error(
                        ErrorCode::MapKeyMustBeAValue,
                        key_line,
                        key_column,
                        format!(
                            "map key must be a value, found {:?}",
                            other.expression_type()
                        ),
                    ));
                }
            };

            self.skip_whitespace_and_comments()?;
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::MapMissingEndParen,
                        start_line,
                        start_column,
                        "map is never closed with )",
                    ));
                }
                Some(b')') => {
                    return Err(self.error(
                        ErrorCode::MapMissingValue,
                        key_line,
                        key_column,
                        format!("map key '{key}' has no value"),
                    ));
                }
                Some(_) => {}
            }
            let value = self.parse_expression()?;
            map.map_set_value_for_key(key, value);
        }
    }

    /// `<` Base64 `>` — whitespace between the brackets is tolerated.
    fn parse_binary_data(&mut self) -> Result<Expression> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance(); // <
        let mut base64_bytes = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::BinaryDataNoEnding,
                        start_line,
                        start_column,
                        "binary data is never closed with >",
                    ));
                }
                Some(b'>') => {
                    self.advance();
                    break;
                }
                Some(b) => {
                    if !is_whitespace(b) {
                        base64_bytes.push(b);
                    }
                    self.advance();
                }
            }
        }
        let data = BASE64.decode(&base64_bytes).map_err(|_| {
            self.error(
                ErrorCode::BinaryDataInvalidBase64,
                start_line,
                start_column,
                "binary data is not valid Base64",
            )
        })?;
        Ok(Expression::BinaryData(data))
    }

    /// `"` ... `"` with `\"` and `\\` escapes; every other byte, including
    /// a backslash before any other character, passes through literally.
    fn parse_quoted_value(&mut self) -> Result<String> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance(); // "
        let mut out = String::new();
        let mut segment_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::StringMissingEndingQuote,
                        start_line,
                        start_column,
                        "quoted value is never closed",
                    ));
                }
                Some(b'"') => {
                    out.push_str(&self.input[segment_start..self.pos]);
                    self.advance();
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.input[segment_start..self.pos]);
                    self.advance();
                    match self.peek() {
                        Some(b'"') => {
                            out.push('"');
                            self.advance();
                        }
                        Some(b'\\') => {
                            out.push('\\');
                            self.advance();
                        }
                        // Unknown escape: keep the backslash; the next byte
                        // is picked up by the following segment.
                        _ => out.push('\\'),
                    }
                    segment_start = self.pos;
                }
                Some(_) => self.advance(),
            }
        }
    }

    /// `[name]` expression — binds a snapshot of the expression that
    /// follows; the declaration itself is stripped from the tree.
    fn parse_reference_declaration(&mut self) -> Result<Expression> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance(); // [
        let name = self.parse_reference_name(start_line, start_column)?;
        self.skip_whitespace_and_comments()?;
        if self.at_end() {
            return Err(self.error(
                ErrorCode::ReferenceMissingExpression,
                start_line,
                start_column,
                format!("reference declaration [{name}] has no expression after it"),
            ));
        }
        let expr = self.parse_expression()?;
        self.references.insert(name, expr.clone());
        Ok(expr)
    }

    /// `*[name]` — replaced by a deep copy of the bound expression.
    fn parse_reference_expansion(&mut self) -> Result<Expression> {
        let (start_line, start_column) = (self.line, self.column);
        self.advance_by(2); // *[
        let name = self.parse_reference_name(start_line, start_column)?;
        match self.references.get(&name) {
            Some(expr) => Ok(expr.clone()),
            None => Err(self.error(
                ErrorCode::ReferenceUnknownReference,
                start_line,
                start_column,
                format!("no reference named '{name}' has been declared"),
            )),
        }
    }

    /// The `name]` part of either reference form, after the opening bracket.
    fn parse_reference_name(&mut self, start_line: usize, start_column: usize) -> Result<String> {
        let name_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::ReferenceMissingEndBracket,
                        start_line,
                        start_column,
                        "reference is never closed with ]",
                    ));
                }
                Some(b']') => {
                    let name = &self.input[name_start..self.pos];
                    if name.is_empty() {
                        return Err(self.error(
                            ErrorCode::ReferenceInvalidName,
                            start_line,
                            start_column,
                            "reference name is empty",
                        ));
                    }
                    self.advance();
                    return Ok(name.to_string());
                }
                Some(b) if is_reference_name_byte(b) => self.advance(),
                Some(b) => {
                    return Err(self.error(
                        ErrorCode::ReferenceInvalidName,
                        start_line,
                        start_column,
                        format!("reference name may not contain '{}'", b as char),
                    ));
                }
            }
        }
    }

    /// An unquoted run of bytes. `nil` and `null` become Null; everything
    /// else is a value with the literal bytes as payload.
    fn parse_word(&mut self) -> Expression {
        let word_start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_structural(b) {
                break;
            }
            self.advance();
        }
        let word = &self.input[word_start..self.pos];
        if word == "nil" || word == "null" {
            Expression::Null
        } else {
            Expression::Value(word.to_string())
        }
    }
}
