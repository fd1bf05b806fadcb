//! Lightweight SQL tokenizer and `INSERT` parser.
//!
//! This is intentionally limited compared to a full SQL parser like `sqlparser`:
//! it only understands `INSERT INTO <name> [(columns)] VALUES (...)[, (...)]`
//! and skips everything else a dump may contain (`SET`, `CREATE`, `SELECT
//! setval(...)`, function bodies) statement by statement.

mod lexer;
mod parser;

pub use lexer::{Lexer, LexerError, Token, TokenKind};
pub use parser::{
    Identifier, InsertStatement, ParseError, Parser, SqlValue, Value, matches_qualified,
};
