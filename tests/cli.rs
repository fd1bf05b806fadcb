//! Tests for the `sql-id-compact` binary: output and exit status.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sql-id-compact"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Temp path is not UTF-8")
}

#[test]
fn test_missing_argument_is_a_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_extra_argument_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let original = "INSERT INTO public.questions (id, text) VALUES (3, 'a');\n";
    let first = dir.path().join("first.sql");
    let second = dir.path().join("second.sql");
    fs::write(&first, original).unwrap();
    fs::write(&second, original).unwrap();

    let output = run(&[path_arg(&first), path_arg(&second)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert_eq!(fs::read_to_string(&first).unwrap(), original);
    assert_eq!(fs::read_to_string(&second).unwrap(), original);
}

#[test]
fn test_help_succeeds() {
    let output = run(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--questions-table"));
}

#[test]
fn test_success_summary() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.sql");
    fs::write(
        &path,
        "\
INSERT INTO public.questions (id, text) VALUES (1, 'a');
INSERT INTO public.questions (id, text) VALUES (3, 'b');
INSERT INTO public.choices (id, question_id, text) VALUES (1, 3, 'x');
",
    )
    .unwrap();

    let output = run(&[path_arg(&path)]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "Filled 1 question ID gaps by moving highest IDs\n\
         Filled 0 choice ID gaps by moving highest IDs\n\
         Updated 1 choice question_id references\n"
    );
    assert!(fs::read_to_string(&path).unwrap().contains("VALUES (1, 2, 'x')"));
}

#[test]
fn test_invalid_reference_exit_status() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.sql");
    let original = "\
INSERT INTO public.questions (id, text) VALUES (1, 'a');
INSERT INTO public.questions (id, text) VALUES (2, 'b');
INSERT INTO public.choices (id, question_id, text) VALUES (1, 5, 'x');
";
    fs::write(&path, original).unwrap();

    let output = run(&[path_arg(&path)]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "Found invalid question references: [5]\nPlease fix invalid references first!\n"
    );
    assert_eq!(fs::read(&path).unwrap(), original.as_bytes());
}

#[test]
fn test_dry_run_lists_moves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.sql");
    let original = "\
INSERT INTO public.questions (id, text) VALUES (1, 'a');
INSERT INTO public.questions (id, text) VALUES (2, 'b');
INSERT INTO public.questions (id, text) VALUES (4, 'c');
INSERT INTO public.questions (id, text) VALUES (6, 'd');
";
    fs::write(&path, original).unwrap();

    let output = run(&["--dry-run", path_arg(&path)]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("  question 4 -> 3\n"));
    assert!(out.contains("  question 6 -> 5\n"));
    assert!(out.contains("Filled 2 question ID gaps"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_unreadable_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&[path_arg(&dir.path().join("absent.sql"))]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
