#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod compact;
pub mod config;
pub mod errors;
pub mod integrity;
pub mod mapping;
pub mod rewrite;
pub mod scan;
pub mod sql;

// Re-export main types
pub use compact::{Outcome, compact_file, compact_text};
pub use config::{CompactConfig, ExtractorKind};
pub use integrity::{check_references, dangling_references};
pub use mapping::{GapMapping, find_gaps};
pub use rewrite::{RewritePlan, Substitution, Target};
pub use scan::{ChoiceRow, Extractor, IdSet, PatternExtractor, QuestionRow, Scan, StatementExtractor};

// Re-export errors
pub use errors::Error;
