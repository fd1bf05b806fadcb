//! End-to-end compaction of a dump: scan, check, remap, rewrite, write.

use core::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::CompactConfig;
use crate::errors::Error;
use crate::integrity::check_references;
use crate::mapping::GapMapping;
use crate::rewrite::{RewritePlan, Target};
use crate::scan::Extractor;

/// What a compaction did, or would do in dry-run mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Mapping applied to question IDs.
    pub questions: GapMapping,
    /// Mapping applied to choice IDs.
    pub choices: GapMapping,
    /// Number of choice foreign-key literals rewritten.
    pub references_updated: usize,
    /// Whether the text differs from the input.
    pub changed: bool,
    /// Whether the file was written.
    pub written: bool,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Filled {} question ID gaps by moving highest IDs",
            self.questions.gap_count()
        )?;
        writeln!(
            f,
            "Filled {} choice ID gaps by moving highest IDs",
            self.choices.gap_count()
        )?;
        write!(
            f,
            "Updated {} choice question_id references",
            self.references_updated
        )
    }
}

/// Compact the dump held in `buffer`.
///
/// The buffer is only modified once the integrity check has passed.
///
/// # Errors
///
/// Returns [`Error::InvalidReferences`] if a choice references an undeclared
/// question; `buffer` is untouched in that case.
///
/// # Examples
///
/// ```
/// use sql_id_compact::{PatternExtractor, compact_text};
///
/// let mut dump = String::from(
///     "INSERT INTO public.questions (id, text) VALUES (1, 'a');\n\
///      INSERT INTO public.questions (id, text) VALUES (3, 'b');\n\
///      INSERT INTO public.choices (id, question_id, text) VALUES (1, 3, 'c');\n",
/// );
/// let extractor = PatternExtractor::new("public.questions", "public.choices")?;
/// let outcome = compact_text(&mut dump, &extractor)?;
///
/// assert_eq!(outcome.questions.gap_count(), 1);
/// assert!(dump.contains("VALUES (2, 'b')"));
/// assert!(dump.contains("VALUES (1, 2, 'c')"));
/// # Ok::<(), sql_id_compact::Error>(())
/// ```
pub fn compact_text(buffer: &mut String, extractor: &dyn Extractor) -> Result<Outcome, Error> {
    let scan = extractor.scan(buffer);
    info!(
        questions = scan.questions.len(),
        choices = scan.choices.len(),
        "scanned dump"
    );

    if let Err(err) = check_references(&scan) {
        warn!(%err, "aborting before any change");
        return Err(err);
    }

    let questions = GapMapping::build(&scan.question_ids());
    let choices = GapMapping::build(&scan.choice_ids());
    for (old, new) in questions.moves() {
        debug!(old, new, "moving question");
    }
    for (old, new) in choices.moves() {
        debug!(old, new, "moving choice");
    }

    let plan = RewritePlan::build(&scan, &questions, &choices)?;
    plan.apply(buffer);
    info!(substitutions = plan.substitutions().len(), "rewrote dump");

    Ok(Outcome {
        references_updated: plan.count(Target::Reference),
        changed: !plan.is_empty(),
        written: false,
        questions,
        choices,
    })
}

/// Compact the dump at `path` in place.
///
/// The file is read whole, rewritten in memory and replaced atomically. It
/// is left untouched when nothing changes, in dry-run mode, and on every
/// error.
///
/// # Errors
///
/// Returns [`Error::Read`] or [`Error::Write`] on I/O failure, plus any error
/// of [`CompactConfig::build_extractor`] and [`compact_text`].
pub fn compact_file(path: &Path, config: &CompactConfig) -> Result<Outcome, Error> {
    let extractor = config.build_extractor()?;
    let mut buffer = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut outcome = compact_text(&mut buffer, extractor.as_ref())?;

    if outcome.changed && !config.dry_run {
        replace_file(path, &buffer)?;
        outcome.written = true;
        info!(path = %path.display(), "wrote compacted dump");
    } else if outcome.changed {
        info!(path = %path.display(), "dry run, not writing");
    } else {
        info!(path = %path.display(), "already compact, leaving file untouched");
    }

    Ok(outcome)
}

/// Replace `path` with `contents` through a temporary file in the same
/// directory, keeping the original permissions. Symlinks are followed, so the
/// file they point at is replaced and the link stays.
fn replace_file(path: &Path, contents: &str) -> Result<(), Error> {
    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path).map_err(write_error)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(&target).map_err(write_error)?.permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(write_error)?;
    temp.persist(&target).map_err(|err| write_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::PatternExtractor;

    fn extractor() -> PatternExtractor {
        PatternExtractor::new("public.questions", "public.choices").unwrap()
    }

    #[test]
    fn test_invalid_references_leave_buffer_untouched() {
        let original = "\
INSERT INTO public.questions (id, t) VALUES (1, 'a');
INSERT INTO public.questions (id, t) VALUES (3, 'b');
INSERT INTO public.choices (id, question_id, t) VALUES (1, 5, 'c');
";
        let mut buffer = original.to_string();
        let err = compact_text(&mut buffer, &extractor()).unwrap_err();
        assert!(matches!(err, Error::InvalidReferences(ref ids) if ids == &[5]));
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_outcome_summary() {
        let mut buffer = "\
INSERT INTO public.questions (id, t) VALUES (1, 'a');
INSERT INTO public.questions (id, t) VALUES (2, 'b');
INSERT INTO public.questions (id, t) VALUES (4, 'c');
INSERT INTO public.questions (id, t) VALUES (6, 'd');
INSERT INTO public.choices (id, question_id, t) VALUES (2, 6, 'x');
"
        .to_string();
        let outcome = compact_text(&mut buffer, &extractor()).unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.to_string(),
            "Filled 2 question ID gaps by moving highest IDs\n\
             Filled 1 choice ID gaps by moving highest IDs\n\
             Updated 1 choice question_id references"
        );
        assert!(buffer.contains("VALUES (1, 5, 'x')"));
    }

    #[test]
    fn test_empty_dump() {
        let mut buffer = String::from("-- nothing here\n");
        let outcome = compact_text(&mut buffer, &extractor()).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.questions.gap_count(), 0);
        assert_eq!(buffer, "-- nothing here\n");
    }
}
