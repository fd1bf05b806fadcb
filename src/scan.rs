//! Extraction of question and choice rows from dump text.
//!
//! An [`Extractor`] turns the raw text into a [`Scan`]: every question and
//! choice row it recognises, together with the byte spans of the ID literals.
//! The remapping and rewrite stages only ever look at a [`Scan`], so the way
//! rows are found can change without touching them.

mod pattern;
mod statement;

use core::ops::Range;
use std::collections::BTreeSet;

use hashbrown::HashMap;

pub use pattern::PatternExtractor;
pub use statement::StatementExtractor;

/// Distinct IDs of one entity type, in ascending order.
pub type IdSet = BTreeSet<u64>;

/// A question row located in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    /// The question ID.
    pub id: u64,
    /// Byte range of the ID literal.
    pub span: Range<usize>,
}

/// A choice row located in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRow {
    /// The choice ID.
    pub id: u64,
    /// The referenced question ID.
    pub question_id: u64,
    /// Byte range of the choice ID literal.
    pub span: Range<usize>,
    /// Byte range of the question ID literal.
    pub question_span: Range<usize>,
}

/// All rows found in one dump, in text order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Question rows.
    pub questions: Vec<QuestionRow>,
    /// Choice rows.
    pub choices: Vec<ChoiceRow>,
}

impl Scan {
    /// Distinct question IDs.
    #[must_use]
    pub fn question_ids(&self) -> IdSet {
        self.questions.iter().map(|row| row.id).collect()
    }

    /// Distinct choice IDs.
    #[must_use]
    pub fn choice_ids(&self) -> IdSet {
        self.choices.iter().map(|row| row.id).collect()
    }

    /// Question referenced by each choice ID. A choice ID that appears more
    /// than once keeps the reference of its last row.
    #[must_use]
    pub fn references(&self) -> HashMap<u64, u64> {
        self.choices
            .iter()
            .map(|row| (row.id, row.question_id))
            .collect()
    }
}

/// Finds question and choice rows in dump text.
///
/// Text that does not have the shape an extractor looks for is skipped
/// without error.
pub trait Extractor {
    /// Scan `text` for rows.
    fn scan(&self, text: &str) -> Scan;
}
