//! `sql-id-compact` command: fill ID gaps in a SQL dump in place.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use sql_id_compact::config::{DEFAULT_CHOICE_TABLE, DEFAULT_FOREIGN_KEY, DEFAULT_QUESTION_TABLE};
use sql_id_compact::{CompactConfig, Error, ExtractorKind, Outcome, compact_file};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sql-id-compact",
    about = "Remove gaps in question/choice ID sequences of a SQL dump and fix references",
    version
)]
struct Cli {
    /// SQL dump to rewrite in place.
    file: PathBuf,
    /// Table holding question rows.
    #[arg(long = "questions-table", default_value = DEFAULT_QUESTION_TABLE)]
    questions_table: String,
    /// Table holding choice rows.
    #[arg(long = "choices-table", default_value = DEFAULT_CHOICE_TABLE)]
    choices_table: String,
    /// Choice column referencing the question.
    #[arg(long = "foreign-key", default_value = DEFAULT_FOREIGN_KEY)]
    foreign_key: String,
    /// How rows are found in the dump.
    #[arg(long, value_enum, default_value_t = ExtractorArg::Pattern)]
    extractor: ExtractorArg,
    /// Report what would change without writing the file.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// More logging on stderr (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ExtractorArg {
    /// One-line regular expressions over `INSERT INTO t (id, ...) VALUES (n, ...)`.
    Pattern,
    /// Parse `INSERT` statements and resolve columns by name.
    Statement,
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Pattern => ExtractorKind::Pattern,
            ExtractorArg::Statement => ExtractorKind::Statement,
        }
    }
}

impl Cli {
    fn config(&self) -> CompactConfig {
        CompactConfig::default()
            .with_question_table(self.questions_table.as_str())
            .with_choice_table(self.choices_table.as_str())
            .with_foreign_key(self.foreign_key.as_str())
            .with_extractor(self.extractor.into())
            .with_dry_run(self.dry_run)
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn print_moves(label: &str, moves: impl Iterator<Item = (u64, u64)>) {
    for (old, new) in moves {
        println!("  {label} {old} -> {new}");
    }
}

fn report(outcome: &Outcome, dry_run: bool) {
    if dry_run {
        println!("Dry run, file not modified");
        print_moves("question", outcome.questions.moves());
        print_moves("choice", outcome.choices.moves());
    }
    println!("{outcome}");
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and are not failures.
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            // Nothing left to report if stdout or stderr is gone.
            let _ = err.print();
            return code;
        }
    };
    init_logging(cli.log_level());

    match compact_file(&cli.file, &cli.config()) {
        Ok(outcome) => {
            report(&outcome, cli.dry_run);
            ExitCode::SUCCESS
        }
        Err(Error::InvalidReferences(ids)) => {
            println!("Found invalid question references: {ids:?}");
            println!("Please fix invalid references first!");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
