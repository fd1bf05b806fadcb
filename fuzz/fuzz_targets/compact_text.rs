//! Compaction fuzzer.
//!
//! Feeds arbitrary text through both extractors and the full compaction. A
//! run may fail the integrity check, but must never panic, and a successful
//! run must leave every choice pointing at a declared question.

use honggfuzz::fuzz;
use sql_id_compact::{Extractor, PatternExtractor, StatementExtractor, compact_text};

fn check(text: &str, extractor: &dyn Extractor) {
    let mut buffer = text.to_owned();
    if compact_text(&mut buffer, extractor).is_err() {
        assert_eq!(buffer, text, "failed run modified the buffer");
        return;
    }
    let scan = extractor.scan(&buffer);
    let declared = scan.question_ids();
    for choice in &scan.choices {
        assert!(
            declared.contains(&choice.question_id),
            "dangling reference {} after compaction",
            choice.question_id
        );
    }
}

fn main() {
    let pattern = PatternExtractor::new("public.questions", "public.choices")
        .expect("default patterns compile");
    let statement = StatementExtractor::new("public.questions", "public.choices", "question_id");
    loop {
        fuzz!(|text: String| {
            check(&text, &pattern);
            check(&text, &statement);
        });
    }
}
