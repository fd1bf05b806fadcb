//! Textual application of the gap mappings.

use core::fmt;
use core::ops::Range;

use tracing::trace;

use crate::errors::Error;
use crate::mapping::GapMapping;
use crate::scan::Scan;

/// Which ID literal a substitution replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A question's `id`.
    Question,
    /// A choice's `id`.
    Choice,
    /// A choice's foreign key to its question.
    Reference,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Question => "question",
            Self::Choice => "choice",
            Self::Reference => "choice question_id",
        })
    }
}

/// Replace the literal at `span` (currently `old`) with `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// What the literal is.
    pub target: Target,
    /// Byte range of the literal in the scanned text.
    pub span: Range<usize>,
    /// Value currently written.
    pub old: u64,
    /// Value to write.
    pub new: u64,
}

/// The substitutions that bring a scanned text in line with its mappings.
///
/// Question substitutions come first, then choices, each in descending order
/// of old ID. Only literals whose value changes are included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    substitutions: Vec<Substitution>,
}

impl RewritePlan {
    /// Plan the rewrite of `scan` under the question and choice mappings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unmapped`] if a scanned ID is missing from its
    /// mapping, which happens when the mappings were built from another scan
    /// or a choice references an undeclared question, and
    /// [`Error::OverlappingLiterals`] if two substitutions share bytes.
    pub fn build(scan: &Scan, questions: &GapMapping, choices: &GapMapping) -> Result<Self, Error> {
        let lookup = |mapping: &GapMapping, target: Target, id: u64| {
            mapping.get(id).ok_or(Error::Unmapped { target, id })
        };

        let mut substitutions = Vec::new();

        let mut question_rows: Vec<_> = scan.questions.iter().collect();
        question_rows.sort_by(|a, b| b.id.cmp(&a.id));
        for row in question_rows {
            let new = lookup(questions, Target::Question, row.id)?;
            if new != row.id {
                substitutions.push(Substitution {
                    target: Target::Question,
                    span: row.span.clone(),
                    old: row.id,
                    new,
                });
            }
        }

        let mut choice_rows: Vec<_> = scan.choices.iter().collect();
        choice_rows.sort_by(|a, b| b.id.cmp(&a.id));
        for row in choice_rows {
            let new_id = lookup(choices, Target::Choice, row.id)?;
            let new_question = lookup(questions, Target::Reference, row.question_id)?;
            if new_id != row.id {
                substitutions.push(Substitution {
                    target: Target::Choice,
                    span: row.span.clone(),
                    old: row.id,
                    new: new_id,
                });
            }
            if new_question != row.question_id {
                substitutions.push(Substitution {
                    target: Target::Reference,
                    span: row.question_span.clone(),
                    old: row.question_id,
                    new: new_question,
                });
            }
        }

        check_disjoint(&substitutions)?;
        Ok(Self { substitutions })
    }

    /// The planned substitutions in plan order.
    #[must_use]
    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Whether applying the plan leaves the text unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// Number of substitutions of the given kind.
    #[must_use]
    pub fn count(&self, target: Target) -> usize {
        self.substitutions
            .iter()
            .filter(|substitution| substitution.target == target)
            .count()
    }

    /// Apply the plan to the text it was built from.
    ///
    /// Literals are spliced from the end of the buffer backwards, so earlier
    /// spans stay valid and no written value is ever matched again.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is not the text the plan's scan was taken from.
    pub fn apply(&self, buffer: &mut String) {
        let mut ordered: Vec<&Substitution> = self.substitutions.iter().collect();
        ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));
        for substitution in ordered {
            trace!(
                target_kind = %substitution.target,
                old = substitution.old,
                new = substitution.new,
                at = substitution.span.start,
                "substituting"
            );
            buffer.replace_range(substitution.span.clone(), &substitution.new.to_string());
        }
    }
}

/// No two substitutions may touch the same bytes.
fn check_disjoint(substitutions: &[Substitution]) -> Result<(), Error> {
    let mut spans: Vec<&Range<usize>> = substitutions.iter().map(|s| &s.span).collect();
    spans.sort_by_key(|span| span.start);
    match spans.windows(2).find(|pair| pair[1].start < pair[0].end) {
        Some(pair) => Err(Error::OverlappingLiterals { at: pair[1].start }),
        None => Ok(()),
    }
}
