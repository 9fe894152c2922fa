use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn harness(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jet-golden"))
        .arg("--root")
        .arg(root)
        .arg("--exe")
        .arg("sh")
        .args(args)
        .env_remove("JET_TEST_EXE")
        .env_remove("RUST_LOG")
        .output()
        .expect("spawning jet-golden")
}

fn layout() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let atoms = tmp.path().join("atoms");
    let forms = tmp.path().join("forms");
    fs::create_dir(&atoms).unwrap();
    fs::create_dir(&forms).unwrap();
    fs::write(atoms.join("int.jet"), "echo 7 # ;OUTPUT: 7\n").unwrap();
    fs::write(atoms.join("str.jet"), "echo '\"hi\"' # ;OUTPUT: \"hi\"\n").unwrap();
    fs::write(forms.join("if.jet"), "echo 1 # ;OUTPUT: 2\n").unwrap();
    tmp
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn list_prints_names_in_order() {
    let tmp = layout();
    let out = harness(tmp.path(), &["--suite", "atoms", "--suite", "forms", "list"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "atoms::test_int\natoms::test_str\nforms::test_if\n"
    );
}

#[test]
fn passing_suite_exits_zero() {
    let tmp = layout();
    let out = harness(tmp.path(), &["--suite", "atoms"]);
    let text = stdout(&out);
    assert!(out.status.success(), "{text}");
    assert!(text.contains("[PASS] atoms::test_int"));
    assert!(text.contains("2/2 tests passed."));
}

#[test]
fn failing_test_exits_non_zero() {
    let tmp = layout();
    let out = harness(tmp.path(), &["--suite", "atoms", "--suite", "forms", "run"]);
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[FAIL] forms::test_if"), "{text}");
    assert!(text.contains("2/3 tests passed."));
}

#[test]
fn filter_narrows_the_run() {
    let tmp = layout();
    let out = harness(
        tmp.path(),
        &["--suite", "atoms", "--suite", "forms", "run", "--filter", "atoms::"],
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("(1 filtered out)"));
}

#[test]
fn renamed_suite_points_at_a_directory() {
    let tmp = layout();
    let out = harness(tmp.path(), &["--suite", "basics=atoms", "list"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "basics::test_int\nbasics::test_str\n");
}

#[test]
fn missing_suite_directory_is_reported_before_running() {
    let tmp = layout();
    let out = harness(tmp.path(), &["--suite", "let"]);
    assert!(!out.status.success());
    assert!(stdout(&out).is_empty());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("cannot discover fixtures"), "{err}");
}

#[test]
fn default_suites_require_all_reference_directories() {
    let tmp = layout();
    // `let` and `functions` are missing from the layout.
    let out = harness(tmp.path(), &["list"]);
    assert!(!out.status.success());
}
