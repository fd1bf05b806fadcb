//! SQL lexer for tokenizing dump text.
//!
//! The lexer never rejects a character: anything outside the small token set
//! the `INSERT` parser cares about comes back as [`TokenKind::Symbol`]. The
//! only hard errors are unterminated quoted constructs, after which the lexer
//! is positioned at the end of the input.

use core::ops::Range;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Byte offset where this token starts.
    pub pos: usize,
    /// Byte offset one past the end of this token.
    pub end: usize,
}

impl Token {
    /// Byte range of the token in the input.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.pos..self.end
    }
}

/// The different kinds of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    /// INSERT keyword
    Insert,
    /// INTO keyword
    Into,
    /// VALUES keyword
    Values,

    // Literals
    /// Unsigned integer literal that fits in a `u64`.
    IntegerLiteral(u64),
    /// Any other numeric literal (decimal, exponent, or out of `u64` range).
    NumberLiteral,
    /// String literal in any of the quoting forms (`'..'`, `E'..'`, `X'..'`, `$tag$..$tag$`).
    StringLiteral,

    // Identifiers
    /// A bare identifier, as written.
    Identifier(String),
    /// A double-quoted identifier with `""` unescaped.
    QuotedIdentifier(String),

    // Symbols
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Comma
    Comma,
    /// Semicolon
    Semicolon,
    /// Dot (qualified names)
    Dot,
    /// Minus sign
    Minus,
    /// Any other character.
    Symbol(char),

    // Special
    /// End of input
    Eof,
}

/// SQL lexer that produces tokens from input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is an unterminated quoted construct.
    pub fn peek(&mut self) -> Result<&Token, LexerError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is an unterminated quoted construct.
    pub fn next(&mut self) -> Result<Token, LexerError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.next_token()
    }

    /// Skip whitespace and comments.
    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'-' && bytes.get(self.pos + 1) == Some(&b'-') {
                // Line comment
                self.pos += 2;
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && bytes.get(self.pos + 1) == Some(&b'*') {
                // Block comment, unterminated runs to end of input
                self.pos += 2;
                while self.pos < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes.get(self.pos + 1) == Some(&b'/'))
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start_pos: usize) -> Token {
        Token {
            kind,
            pos: start_pos,
            end: self.pos,
        }
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        let start_pos = self.pos;
        let bytes = self.input.as_bytes();

        let Some(&b) = bytes.get(self.pos) else {
            return Ok(self.token(TokenKind::Eof, start_pos));
        };

        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'-' => TokenKind::Minus,
            b'\'' => return self.read_string(start_pos, false),
            b'"' => return self.read_quoted_identifier(start_pos),
            b'$' => {
                if let Some(token) = self.read_dollar_string(start_pos)? {
                    return Ok(token);
                }
                TokenKind::Symbol('$')
            }
            _ if b.is_ascii_digit() => return Ok(self.read_number(start_pos)),
            _ if is_ident_start(b) => return self.read_identifier(start_pos),
            _ => {
                let c = self.input[self.pos..].chars().next().unwrap_or('\u{fffd}');
                self.pos += c.len_utf8();
                return Ok(self.token(TokenKind::Symbol(c), start_pos));
            }
        };
        self.pos += 1;

        Ok(self.token(kind, start_pos))
    }

    /// Read a single-quoted literal starting at the current quote.
    ///
    /// With `backslash_escapes`, a backslash escapes the following byte, as in
    /// PostgreSQL `E'...'` strings.
    fn read_string(&mut self, start_pos: usize, backslash_escapes: bool) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' if backslash_escapes => self.pos += 2,
                b'\'' => {
                    // Doubled quote is an escaped quote
                    if bytes.get(self.pos + 1) == Some(&b'\'') {
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        return Ok(self.token(TokenKind::StringLiteral, start_pos));
                    }
                }
                _ => self.pos += 1,
            }
        }

        self.pos = bytes.len();
        Err(LexerError::UnterminatedString { pos: start_pos })
    }

    fn read_quoted_identifier(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;

        let mut value = String::new();
        let mut segment_start = self.pos;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'"' {
                value.push_str(&self.input[segment_start..self.pos]);
                if bytes.get(self.pos + 1) == Some(&b'"') {
                    value.push('"');
                    self.pos += 2;
                    segment_start = self.pos;
                } else {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::QuotedIdentifier(value), start_pos));
                }
            } else {
                self.pos += 1;
            }
        }

        self.pos = bytes.len();
        Err(LexerError::UnterminatedIdentifier { pos: start_pos })
    }

    /// Read a `$tag$ ... $tag$` string. Returns `None` (consuming nothing) when
    /// the `$` does not open a dollar quote, e.g. a `$1` parameter.
    fn read_dollar_string(&mut self, start_pos: usize) -> Result<Option<Token>, LexerError> {
        let bytes = self.input.as_bytes();
        let mut tag_end = self.pos + 1;
        while tag_end < bytes.len() && (bytes[tag_end].is_ascii_alphanumeric() || bytes[tag_end] == b'_') {
            tag_end += 1;
        }
        if bytes.get(tag_end) != Some(&b'$') || bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit) {
            return Ok(None);
        }

        let tag = &self.input[self.pos..=tag_end];
        let body_start = tag_end + 1;
        match self.input[body_start..].find(tag) {
            Some(offset) => {
                self.pos = body_start + offset + tag.len();
                Ok(Some(self.token(TokenKind::StringLiteral, start_pos)))
            }
            None => {
                self.pos = bytes.len();
                Err(LexerError::UnterminatedString { pos: start_pos })
            }
        }
    }

    fn read_number(&mut self, start_pos: usize) -> Token {
        let bytes = self.input.as_bytes();
        let num_start = self.pos;

        // Read integer part
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        // Check for decimal point
        let mut is_real = false;
        if bytes.get(self.pos) == Some(&b'.') {
            is_real = true;
            self.pos += 1;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        // Check for exponent
        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            is_real = true;
            self.pos += 1;
            if matches!(bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }

        let num_str = &self.input[num_start..self.pos];
        let kind = match num_str.parse::<u64>() {
            Ok(v) if !is_real => TokenKind::IntegerLiteral(v),
            _ => TokenKind::NumberLiteral,
        };
        self.token(kind, start_pos)
    }

    fn read_identifier(&mut self, start_pos: usize) -> Result<Token, LexerError> {
        let bytes = self.input.as_bytes();
        let ident_start = self.pos;

        while self.pos < bytes.len() && is_ident_cont(bytes[self.pos]) {
            self.pos += 1;
        }

        let ident = &self.input[ident_start..self.pos];

        // String prefixes: E'..' escapes, X'..' / B'..' bit strings, N'..' national
        if bytes.get(self.pos) == Some(&b'\'') && ident.len() == 1 {
            match ident.as_bytes()[0] {
                b'E' | b'e' => return self.read_string(start_pos, true),
                b'X' | b'x' | b'B' | b'b' | b'N' | b'n' => return self.read_string(start_pos, false),
                _ => {}
            }
        }

        let kind = match ident.to_ascii_uppercase().as_str() {
            "INSERT" => TokenKind::Insert,
            "INTO" => TokenKind::Into,
            "VALUES" => TokenKind::Values,
            _ => TokenKind::Identifier(ident.into()),
        };

        Ok(self.token(kind, start_pos))
    }
}

/// Check if a byte can start an identifier.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Check if a byte can continue an identifier.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Errors that can occur during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    /// Unterminated string literal.
    #[error("Unterminated string literal starting at position {pos}")]
    UnterminatedString {
        /// Position where string started.
        pos: usize,
    },
    /// Unterminated quoted identifier.
    #[error("Unterminated quoted identifier starting at position {pos}")]
    UnterminatedIdentifier {
        /// Position where the identifier started.
        pos: usize,
    },
}
