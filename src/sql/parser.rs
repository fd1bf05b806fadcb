//! Tolerant `INSERT` statement parser for dump files.
//!
//! [`Parser`] is an iterator over the `INSERT` statements in a dump. Every
//! other statement, and every `INSERT` it cannot make sense of, is skipped up
//! to the next top-level `;`.

use core::ops::Range;

use tracing::debug;

use super::lexer::{Lexer, LexerError, Token, TokenKind};

/// An identifier as written in the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Name with quoting removed.
    pub name: String,
    /// Whether the identifier was double-quoted.
    pub quoted: bool,
}

impl Identifier {
    /// Compare against an expected name.
    ///
    /// Bare identifiers compare case-insensitively, quoted ones exactly, the
    /// way PostgreSQL folds unquoted names.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        if self.quoted {
            self.name == expected
        } else {
            self.name.eq_ignore_ascii_case(expected)
        }
    }
}

/// Whether a dotted name such as `public.questions` matches `expected`
/// (also dotted), part by part.
#[must_use]
pub fn matches_qualified(name: &[Identifier], expected: &str) -> bool {
    let parts: Vec<&str> = expected.split('.').collect();
    parts.len() == name.len() && name.iter().zip(parts).all(|(ident, part)| ident.matches(part))
}

/// The shape of a value in a `VALUES` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// A bare unsigned integer literal.
    Integer(u64),
    /// `NULL`.
    Null,
    /// A single string literal.
    Text,
    /// Anything else: negative numbers, casts, function calls, arrays.
    Expression,
}

/// A value together with its location in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    /// What the value is.
    pub kind: SqlValue,
    /// Byte range covered by the value's tokens.
    pub span: Range<usize>,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Table name parts (`schema.table` gives two parts).
    pub table: Vec<Identifier>,
    /// Column names (empty if positional insert).
    pub columns: Vec<Identifier>,
    /// One entry per `VALUES` tuple.
    pub rows: Vec<Vec<Value>>,
    /// Position of the `INSERT` keyword.
    pub pos: usize,
}

impl InsertStatement {
    /// Index of the named column in the column list.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.matches(name))
    }
}

/// SQL parser errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Lexer error.
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),
    /// Unexpected token.
    #[error("Unexpected token {found:?} at position {pos}, expected {expected}")]
    UnexpectedToken {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: TokenKind,
        /// Position in input.
        pos: usize,
    },
    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: &'static str,
    },
}

/// SQL parser yielding `INSERT` statements.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Consume tokens through the next `;`, stopping early in front of an
    /// `INSERT` keyword or at end of input.
    fn skip_statement(&mut self) {
        loop {
            match self.lexer.peek() {
                Ok(token) if matches!(token.kind, TokenKind::Eof | TokenKind::Insert) => return,
                Ok(_) => {}
                // The lexer has already moved past the bad construct.
                Err(err) => {
                    debug!(%err, "lexer error while skipping statement");
                    continue;
                }
            }
            if let Ok(Token {
                kind: TokenKind::Semicolon,
                ..
            }) = self.lexer.next()
            {
                return;
            }
        }
    }

    /// Parse an INSERT statement.
    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        let pos = self.expect(&TokenKind::Insert, "INSERT")?.pos;
        self.expect(&TokenKind::Into, "INTO")?;

        let mut table = vec![self.expect_identifier()?];
        while self.lexer.peek()?.kind == TokenKind::Dot {
            self.lexer.next()?;
            table.push(self.expect_identifier()?);
        }

        // Optional column list
        let mut columns = Vec::new();
        if self.lexer.peek()?.kind == TokenKind::LParen {
            self.lexer.next()?;

            loop {
                columns.push(self.expect_identifier()?);
                if self.lexer.peek()?.kind != TokenKind::Comma {
                    break;
                }
                self.lexer.next()?;
            }

            self.expect(&TokenKind::RParen, "')' after column list")?;
        }

        // pg_dump emits this for identity columns
        if self.expect_word(&["overriding"], "OVERRIDING").is_ok() {
            self.expect_word(&["system", "user"], "SYSTEM or USER")?;
            self.expect_word(&["value"], "VALUE")?;
        }

        self.expect(&TokenKind::Values, "VALUES")?;

        let mut rows = Vec::new();
        loop {
            rows.push(self.parse_row()?);
            if self.lexer.peek()?.kind != TokenKind::Comma {
                break;
            }
            self.lexer.next()?;
        }

        Ok(InsertStatement {
            table,
            columns,
            rows,
            pos,
        })
    }

    /// Parse one parenthesised `VALUES` tuple.
    fn parse_row(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect(&TokenKind::LParen, "'(' before values")?;

        let mut values = Vec::new();
        loop {
            values.push(self.parse_value()?);
            if self.lexer.peek()?.kind != TokenKind::Comma {
                break;
            }
            self.lexer.next()?;
        }

        self.expect(&TokenKind::RParen, "')' after values")?;
        Ok(values)
    }

    /// Parse a value: every token up to the next comma or closing parenthesis
    /// at the same nesting depth.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.lexer.peek()?;
            match token.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::Semicolon | TokenKind::Insert => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "value",
                        found: token.kind.clone(),
                        pos: token.pos,
                    });
                }
                TokenKind::Eof => return Err(ParseError::UnexpectedEof { expected: "value" }),
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            tokens.push(self.lexer.next()?);
        }

        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            let token = self.lexer.peek()?;
            return Err(ParseError::UnexpectedToken {
                expected: "value",
                found: token.kind.clone(),
                pos: token.pos,
            });
        };
        let span = first.pos..last.end;

        let kind = match tokens.as_slice() {
            [Token {
                kind: TokenKind::IntegerLiteral(v),
                ..
            }] => SqlValue::Integer(*v),
            [Token {
                kind: TokenKind::StringLiteral,
                ..
            }] => SqlValue::Text,
            [Token {
                kind: TokenKind::Identifier(name),
                ..
            }] if name.eq_ignore_ascii_case("NULL") => SqlValue::Null,
            _ => SqlValue::Expression,
        };

        Ok(Value { kind, span })
    }

    /// Expect a specific token kind, consuming it only on a match.
    fn expect(&mut self, expected: &TokenKind, what: &'static str) -> Result<Token, ParseError> {
        let token = self.lexer.peek()?;
        if core::mem::discriminant(&token.kind) == core::mem::discriminant(expected) {
            Ok(self.lexer.next()?)
        } else if token.kind == TokenKind::Eof {
            Err(ParseError::UnexpectedEof { expected: what })
        } else {
            Err(ParseError::UnexpectedToken {
                expected: what,
                found: token.kind.clone(),
                pos: token.pos,
            })
        }
    }

    /// Expect a bare word matching one of `words` case-insensitively,
    /// consuming it only on a match.
    fn expect_word(&mut self, words: &[&str], what: &'static str) -> Result<(), ParseError> {
        let token = self.lexer.peek()?;
        match &token.kind {
            TokenKind::Identifier(name) if words.iter().any(|w| name.eq_ignore_ascii_case(w)) => {
                self.lexer.next()?;
                Ok(())
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof { expected: what }),
            other => Err(ParseError::UnexpectedToken {
                expected: what,
                found: other.clone(),
                pos: token.pos,
            }),
        }
    }

    /// Expect an identifier, consuming it only on a match.
    fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let token = self.lexer.peek()?;
        let ident = match &token.kind {
            TokenKind::Identifier(name) => Identifier {
                name: name.clone(),
                quoted: false,
            },
            TokenKind::QuotedIdentifier(name) => Identifier {
                name: name.clone(),
                quoted: true,
            },
            // Keywords are valid column names in the list
            TokenKind::Values => Identifier {
                name: "values".into(),
                quoted: false,
            },
            TokenKind::Into => Identifier {
                name: "into".into(),
                quoted: false,
            },
            TokenKind::Eof => return Err(ParseError::UnexpectedEof { expected: "identifier" }),
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "identifier",
                    found: other.clone(),
                    pos: token.pos,
                });
            }
        };
        self.lexer.next()?;
        Ok(ident)
    }
}

impl Iterator for Parser<'_> {
    type Item = InsertStatement;

    fn next(&mut self) -> Option<InsertStatement> {
        loop {
            let kind = match self.lexer.peek() {
                Ok(token) => token.kind.clone(),
                Err(err) => {
                    debug!(%err, "lexer error between statements");
                    continue;
                }
            };
            match kind {
                TokenKind::Eof => return None,
                TokenKind::Insert => match self.parse_insert() {
                    Ok(statement) => {
                        // Swallow trailing clauses such as ON CONFLICT and the `;`
                        self.skip_statement();
                        return Some(statement);
                    }
                    Err(err) => {
                        debug!(%err, "skipping malformed INSERT");
                        self.skip_statement();
                    }
                },
                _ => self.skip_statement(),
            }
        }
    }
}
