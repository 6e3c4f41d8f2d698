use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn pcalc() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pcalc"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("pcalc starts");

    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("in.txt");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn stdin_lines_are_evaluated_one_by_one() {
    let out = with_stdin(pcalc(), "+ 3 4\n\n- 10 4\n");

    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert_eq!(text(&out.stdout), "7\n6\n");
}

#[test]
fn stdin_error_names_the_real_line() {
    let out = with_stdin(pcalc(), "+ 1 1\n% 1 2\n* 3 3\n");

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(text(&out.stdout), "2\n");

    let stderr = text(&out.stderr);
    assert!(stderr.contains("unknown operator `%`"), "stderr: {stderr}");
    assert!(stderr.contains("<stdin>:2:1"), "stderr: {stderr}");
}

#[test]
fn three_positional_arguments_is_a_usage_error() {
    let out = pcalc().args(["a", "b", "c"]).output().unwrap();

    assert!(!out.status.success());
    assert_eq!(text(&out.stdout), "");

    let stderr = text(&out.stderr);
    assert!(stderr.contains("Usage:"), "stderr: {stderr}");
}

#[test]
fn input_file_is_read_a_line_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "+ 3 4\n* + 1 1 5\n/ 9 3\n");

    let out = pcalc().arg(&input).output().unwrap();

    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert_eq!(text(&out.stdout), "7\n10\n3\n");
}

#[test]
fn second_argument_receives_the_results() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "+ 3 4\n- 10 4\n");
    let output = dir.path().join("out.txt");

    let out = pcalc().arg(&input).arg(&output).output().unwrap();

    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert_eq!(text(&out.stdout), "");
    assert_eq!(fs::read_to_string(&output).unwrap(), "7\n6\n");
}

#[test]
fn syntax_error_in_file_exits_with_its_location() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "+ 1 2\n- 10 nope\n* 2 2\n");
    let output = dir.path().join("out.txt");

    let out = pcalc().arg(&input).arg(&output).output().unwrap();

    assert_eq!(out.status.code(), Some(1));

    let stderr = text(&out.stderr);
    assert!(stderr.contains("in.txt:2:"), "stderr: {stderr}");
    assert!(stderr.contains("unknown operator `nope`"), "stderr: {stderr}");

    // results before the error are kept
    assert_eq!(fs::read_to_string(&output).unwrap(), "3\n");
}

#[test]
fn missing_input_file_is_named() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere.txt");

    let out = pcalc().arg(&missing).output().unwrap();

    assert_eq!(out.status.code(), Some(1));

    let stderr = text(&out.stderr);
    assert!(stderr.contains("nowhere.txt"), "stderr: {stderr}");
}

#[test]
fn extended_flag_adds_operators() {
    let out = with_stdin(pcalc(), "% 7 4\n");
    assert_eq!(out.status.code(), Some(1));

    let mut cmd = pcalc();
    cmd.arg("--extended");
    let out = with_stdin(cmd, "% 7 4\nsqrt 16\n");

    assert!(out.status.success(), "stderr: {}", text(&out.stderr));
    assert_eq!(text(&out.stdout), "3\n4\n");
}
