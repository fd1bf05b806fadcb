//! Token-level extraction through the `INSERT` parser.

use tracing::debug;

use super::{ChoiceRow, Extractor, QuestionRow, Scan};
use crate::sql::{InsertStatement, Parser, SqlValue, Value, matches_qualified};

/// Finds rows by parsing `INSERT` statements and resolving the `id` and
/// foreign-key columns by name.
///
/// Unlike [`PatternExtractor`](super::PatternExtractor) this accepts
/// statements spread over several lines, multi-row `VALUES` lists, quoted or
/// differently-cased names and columns in any order. Positional inserts
/// (no column list) are skipped, as are rows whose `id` or foreign key is not
/// a plain unsigned integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementExtractor {
    question_table: String,
    choice_table: String,
    foreign_key: String,
}

impl StatementExtractor {
    /// Extractor for the given dotted table names and choice foreign-key column.
    #[must_use]
    pub fn new(question_table: &str, choice_table: &str, foreign_key: &str) -> Self {
        Self {
            question_table: question_table.into(),
            choice_table: choice_table.into(),
            foreign_key: foreign_key.into(),
        }
    }

    fn collect_questions(statement: &InsertStatement, scan: &mut Scan) {
        let Some(id_col) = statement.column_index("id") else {
            debug!(at = statement.pos, "question insert without id column");
            return;
        };
        for row in rows_matching(statement) {
            if let Some((id, span)) = integer_at(row, id_col) {
                scan.questions.push(QuestionRow { id, span });
            } else {
                debug!(at = statement.pos, "skipping question row without integer id");
            }
        }
    }

    fn collect_choices(&self, statement: &InsertStatement, scan: &mut Scan) {
        let (Some(id_col), Some(fk_col)) = (
            statement.column_index("id"),
            statement.column_index(&self.foreign_key),
        ) else {
            debug!(at = statement.pos, "choice insert without id or foreign key column");
            return;
        };
        for row in rows_matching(statement) {
            match (integer_at(row, id_col), integer_at(row, fk_col)) {
                (Some((id, span)), Some((question_id, question_span))) => {
                    scan.choices.push(ChoiceRow {
                        id,
                        question_id,
                        span,
                        question_span,
                    });
                }
                _ => debug!(at = statement.pos, "skipping choice row without integer ids"),
            }
        }
    }
}

/// Rows whose arity matches the column list.
fn rows_matching(statement: &InsertStatement) -> impl Iterator<Item = &Vec<Value>> {
    statement
        .rows
        .iter()
        .filter(|row| row.len() == statement.columns.len())
}

fn integer_at(row: &[Value], index: usize) -> Option<(u64, core::ops::Range<usize>)> {
    match row.get(index) {
        Some(Value {
            kind: SqlValue::Integer(v),
            span,
        }) => Some((*v, span.clone())),
        _ => None,
    }
}

impl Extractor for StatementExtractor {
    fn scan(&self, text: &str) -> Scan {
        let mut scan = Scan::default();
        for statement in Parser::new(text) {
            if matches_qualified(&statement.table, &self.question_table) {
                Self::collect_questions(&statement, &mut scan);
            } else if matches_qualified(&statement.table, &self.choice_table) {
                self.collect_choices(&statement, &mut scan);
            }
        }
        scan
    }
}
