//! Regular-expression extraction over the fixed `INSERT` line shape.

use regex::Regex;
use tracing::debug;

use super::{ChoiceRow, Extractor, QuestionRow, Scan};
use crate::errors::Error;

/// Matches `INSERT INTO <table> (id, ...) VALUES (<id>, ...)` for questions
/// and `INSERT INTO <table> (id, ...) VALUES (<id>, <question_id>, ...)` for
/// choices.
///
/// The statement must sit on one line, the column list must start with
/// `id, ` and the values must be separated by exactly `", "`. The choice
/// foreign key is taken positionally from the second value.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    question: Regex,
    choice: Regex,
}

impl PatternExtractor {
    /// Build the patterns for the given (literal) table names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if a pattern fails to compile.
    pub fn new(question_table: &str, choice_table: &str) -> Result<Self, Error> {
        let question = Regex::new(&format!(
            r"INSERT INTO {} \(id, .+?\) VALUES \((\d+),",
            regex::escape(question_table)
        ))?;
        let choice = Regex::new(&format!(
            r"INSERT INTO {} \(id, .+?\) VALUES \((\d+), (\d+),",
            regex::escape(choice_table)
        ))?;
        Ok(Self { question, choice })
    }
}

impl Extractor for PatternExtractor {
    fn scan(&self, text: &str) -> Scan {
        let mut scan = Scan::default();

        for caps in self.question.captures_iter(text) {
            let Some(id) = caps.get(1) else { continue };
            match id.as_str().parse::<u64>() {
                Ok(value) => scan.questions.push(QuestionRow {
                    id: value,
                    span: id.range(),
                }),
                Err(err) => debug!(%err, at = id.start(), "skipping question with unusable id"),
            }
        }

        for caps in self.choice.captures_iter(text) {
            let (Some(id), Some(question)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            match (id.as_str().parse::<u64>(), question.as_str().parse::<u64>()) {
                (Ok(id_value), Ok(question_value)) => scan.choices.push(ChoiceRow {
                    id: id_value,
                    question_id: question_value,
                    span: id.range(),
                    question_span: question.range(),
                }),
                _ => debug!(at = id.start(), "skipping choice with unusable ids"),
            }
        }

        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PatternExtractor {
        PatternExtractor::new("public.questions", "public.choices").unwrap()
    }

    #[test]
    fn test_scan_questions_and_choices() {
        let text = "\
INSERT INTO public.questions (id, text, mode) VALUES (4, 'Capital of France?', 'quiz');
INSERT INTO public.choices (id, question_id, text, correct) VALUES (9, 4, 'Paris', true);
";
        let scan = extractor().scan(text);
        assert_eq!(scan.questions.len(), 1);
        assert_eq!(scan.questions[0].id, 4);
        assert_eq!(&text[scan.questions[0].span.clone()], "4");

        assert_eq!(scan.choices.len(), 1);
        let choice = &scan.choices[0];
        assert_eq!((choice.id, choice.question_id), (9, 4));
        assert_eq!(&text[choice.span.clone()], "9");
        assert_eq!(&text[choice.question_span.clone()], "4");
    }

    #[test]
    fn test_table_name_is_literal() {
        // The dot must not act as a wildcard.
        let text = "INSERT INTO publicXquestions (id, t) VALUES (1, 'x');";
        assert!(extractor().scan(text).questions.is_empty());
    }

    #[test]
    fn test_non_matching_shapes_are_skipped() {
        let text = "\
INSERT INTO public.questions (id) VALUES (1);
INSERT INTO public.questions (text, id) VALUES ('x', 2);
INSERT INTO public.questions (id, text)
    VALUES (3, 'split line');
INSERT INTO public.choices (id, question_id, t) VALUES (5,6, 'tight');
INSERT INTO public.questions (id, text) VALUES (99999999999999999999, 'huge');
";
        let scan = extractor().scan(text);
        assert!(scan.questions.is_empty());
        assert!(scan.choices.is_empty());
    }

    #[test]
    fn test_other_tables_are_ignored() {
        let text = "INSERT INTO public.users (id, name) VALUES (1, 'a');";
        assert_eq!(extractor().scan(text), Scan::default());
    }
}
