//! Integration tests for the ticksim CLI.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ticksim"))
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const PROPERTIES: &str = "\
# counter run
input=program.txt
output=history.txt
writer=writer.json
help=help.txt
welcome=welcome.txt
";

fn setup(program: &str, writer: &str) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    create_temp_file(temp_dir.path(), "run.properties", PROPERTIES);
    create_temp_file(temp_dir.path(), "program.txt", program);
    create_temp_file(temp_dir.path(), "writer.json", writer);
    create_temp_file(temp_dir.path(), "help.txt", "commands: h s sh c e\n");
    create_temp_file(temp_dir.path(), "welcome.txt", "welcome to ticksim\n");
    temp_dir
}

fn run_with_input(config: &Path, input: &str) -> Output {
    let mut child = Command::new(binary_path())
        .arg(config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run ticksim");

    // The child may exit before reading stdin on startup errors.
    let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
    child.wait_with_output().unwrap()
}

const COUNTER: &str = "; count to two\nLOAD r0, 0\nINC r0 ; first\nINC r0\n";

#[test]
fn counter_session_writes_history() {
    let temp_dir = setup(COUNTER, "{}");
    let output = run_with_input(&temp_dir.path().join("run.properties"), "c 2\ns\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("welcome to ticksim\ncommands: h s sh c e\ncommand: "));
    assert!(stdout.contains("<--- clk 2 times\n"));
    assert!(stdout.contains("<--- state\n==== ticksim ====\nclk 2 | pc 2 | line 4\n"));
    assert!(stdout.contains("  registers: r0=1 r1=0"));
    assert!(stdout.ends_with("<--- exit\n"));

    let history = fs::read_to_string(temp_dir.path().join("history.txt")).unwrap();
    assert!(history.starts_with("==== ticksim ====\nclk 0 | pc 0 | line 2\n"));
    assert!(history.contains("clk 1 | pc 1 | line 3 ; first\n"));
    assert!(history.contains("clk 2 | pc 2 | line 4\n"));
    assert!(history.ends_with("==== end ticksim ====\n"));
}

#[test]
fn end_of_input_still_writes_history() {
    let temp_dir = setup(COUNTER, "{}");
    let output = run_with_input(&temp_dir.path().join("run.properties"), "c 5\n");

    assert!(output.status.success());
    let history = fs::read_to_string(temp_dir.path().join("history.txt")).unwrap();
    assert!(history.contains("clk 5 | pc 3 | halted\n"));
    assert_eq!(history.matches("==== end ticksim ====").count(), 1);
}

#[test]
fn json_writer_emits_one_object_per_line() {
    let temp_dir = setup(COUNTER, r#"{"format": "json", "title": "counter"}"#);
    let output = run_with_input(&temp_dir.path().join("run.properties"), "c\ne\n");

    assert!(output.status.success());
    let history = fs::read_to_string(temp_dir.path().join("history.txt")).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], r#"{"begin":"counter"}"#);
    assert!(lines[1].starts_with(r#"{"clk":0,"pc":0,"next_line":2,"#));
    assert!(lines[2].contains(r#""changed":["zero"]"#));
    assert!(lines[2].contains(r#""comment":"first""#));
    assert_eq!(lines[3], r#"{"end":"counter"}"#);
}

#[test]
fn malformed_program_fails_before_the_session() {
    let temp_dir = setup("???\n", "{}");
    let output = run_with_input(&temp_dir.path().join("run.properties"), "exit\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: cannot load program: line 1: unknown mnemonic `???`"));
    assert!(output.stdout.is_empty());
    assert!(!temp_dir.path().join("history.txt").exists());
}

#[test]
fn missing_config_key_is_reported() {
    let temp_dir = setup(COUNTER, "{}");
    let config = create_temp_file(
        temp_dir.path(),
        "partial.properties",
        "input=program.txt\noutput=history.txt\n",
    );
    let output = run_with_input(&config, "");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: configuration is missing the `writer` entry"));
}

#[test]
fn missing_config_file_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_with_input(&temp_dir.path().join("absent.properties"), "");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: cannot read"));
}

#[test]
fn execution_fault_flushes_history_and_fails() {
    let temp_dir = setup("LOAD r1, 0\nDIV r0, r1\n", "{}");
    let output = run_with_input(&temp_dir.path().join("run.properties"), "c 3\nexit\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: execution fault at pc 1 (line 2): division by zero"));

    let history = fs::read_to_string(temp_dir.path().join("history.txt")).unwrap();
    assert!(history.contains("clk 1 | pc 1 | line 2\n"));
    assert!(history.ends_with("==== end ticksim ====\n"));
}

#[test]
fn missing_argument_prints_usage() {
    let output = Command::new(binary_path())
        .stdin(Stdio::null())
        .output()
        .expect("failed to run ticksim");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Usage"));
}
