//! Run configuration: which tables to scan and how.

use crate::errors::Error;
use crate::scan::{Extractor, PatternExtractor, StatementExtractor};

/// Default table holding question rows.
pub const DEFAULT_QUESTION_TABLE: &str = "public.questions";
/// Default table holding choice rows.
pub const DEFAULT_CHOICE_TABLE: &str = "public.choices";
/// Default choice column referencing the question.
pub const DEFAULT_FOREIGN_KEY: &str = "question_id";

/// How rows are found in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    /// Single-line regular expressions over the fixed statement shape.
    #[default]
    Pattern,
    /// Token-level `INSERT` parsing with columns resolved by name.
    Statement,
}

/// Settings for one compaction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactConfig {
    /// Dotted name of the questions table.
    pub question_table: String,
    /// Dotted name of the choices table.
    pub choice_table: String,
    /// Choice column holding the question ID. Only the statement extractor
    /// reads it; the pattern extractor takes the second value.
    pub foreign_key: String,
    /// Extraction strategy.
    pub extractor: ExtractorKind,
    /// Compute and report without writing the file.
    pub dry_run: bool,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            question_table: DEFAULT_QUESTION_TABLE.into(),
            choice_table: DEFAULT_CHOICE_TABLE.into(),
            foreign_key: DEFAULT_FOREIGN_KEY.into(),
            extractor: ExtractorKind::default(),
            dry_run: false,
        }
    }
}

impl CompactConfig {
    /// Set the questions table.
    #[must_use]
    pub fn with_question_table(mut self, table: impl Into<String>) -> Self {
        self.question_table = table.into();
        self
    }

    /// Set the choices table.
    #[must_use]
    pub fn with_choice_table(mut self, table: impl Into<String>) -> Self {
        self.choice_table = table.into();
        self
    }

    /// Set the choice foreign-key column.
    #[must_use]
    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = column.into();
        self
    }

    /// Set the extraction strategy.
    #[must_use]
    pub fn with_extractor(mut self, extractor: ExtractorKind) -> Self {
        self.extractor = extractor;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the configured extractor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SharedTable`] if both entities point at the same
    /// table, [`Error::ForeignKeyIsId`] if the foreign key names the `id`
    /// column, or [`Error::Pattern`] if the pattern extractor cannot be built.
    pub fn build_extractor(&self) -> Result<Box<dyn Extractor>, Error> {
        if self.question_table == self.choice_table {
            return Err(Error::SharedTable(self.question_table.clone()));
        }
        if self.foreign_key.eq_ignore_ascii_case("id") {
            return Err(Error::ForeignKeyIsId(self.foreign_key.clone()));
        }
        let extractor: Box<dyn Extractor> = match self.extractor {
            ExtractorKind::Pattern => Box::new(PatternExtractor::new(
                &self.question_table,
                &self.choice_table,
            )?),
            ExtractorKind::Statement => Box::new(StatementExtractor::new(
                &self.question_table,
                &self.choice_table,
                &self.foreign_key,
            )),
        };
        Ok(extractor)
    }
}
