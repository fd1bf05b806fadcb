//! Referential-integrity gate between choices and questions.

use crate::errors::Error;
use crate::scan::{IdSet, Scan};

/// Question IDs referenced by some choice row but not declared, ascending.
#[must_use]
pub fn dangling_references(scan: &Scan) -> IdSet {
    let declared = scan.question_ids();
    scan.choices
        .iter()
        .map(|row| row.question_id)
        .filter(|question_id| !declared.contains(question_id))
        .collect()
}

/// Check that every choice references a declared question.
///
/// # Errors
///
/// Returns [`Error::InvalidReferences`] listing the undeclared question IDs.
pub fn check_references(scan: &Scan) -> Result<(), Error> {
    let dangling = dangling_references(scan);
    if dangling.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidReferences(dangling.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ChoiceRow, QuestionRow};

    fn scan(questions: &[u64], choices: &[(u64, u64)]) -> Scan {
        Scan {
            questions: questions
                .iter()
                .map(|&id| QuestionRow { id, span: 0..0 })
                .collect(),
            choices: choices
                .iter()
                .map(|&(id, question_id)| ChoiceRow {
                    id,
                    question_id,
                    span: 0..0,
                    question_span: 0..0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_all_references_resolve() {
        assert!(check_references(&scan(&[1, 2], &[(1, 1), (2, 2), (3, 2)])).is_ok());
    }

    #[test]
    fn test_no_choices() {
        assert!(check_references(&scan(&[], &[])).is_ok());
    }

    #[test]
    fn test_dangling_reported_sorted() {
        let result = check_references(&scan(&[1, 2], &[(1, 9), (2, 5), (3, 9), (4, 1)]));
        match result {
            Err(Error::InvalidReferences(ids)) => assert_eq!(ids, vec![5, 9]),
            other => panic!("Expected InvalidReferences, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_choice_id_cannot_hide_reference() {
        // The second row for choice 1 would win in `references()`.
        let dangling = dangling_references(&scan(&[1], &[(1, 7), (1, 1)]));
        assert_eq!(dangling.into_iter().collect::<Vec<_>>(), vec![7]);
    }
}
