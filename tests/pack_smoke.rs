use std::fs;
use std::path::Path;
use std::process::Command;

const SIGIL: &str = "⋮----";

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_codeshear")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn rust_fixture() -> String {
    let mut text = String::from("use std::fmt;\nuse std::io;\n\n");
    text.push_str("fn busy(a: u32, b: u32) -> u32 {\n");
    for i in 0..6 {
        text.push_str(&format!("    if a > {i} {{ return a + {i}; }}\n"));
    }
    text.push_str("    b\n}\n");
    for i in 0..10 {
        text.push_str(&format!("fn trivial_{i}() -> u32 {{\n    {i}\n}}\n"));
    }
    text
}

fn seed_tree(root: &Path) {
    write(root, "src/big.rs", &rust_fixture());
    write(root, "src/small.rs", "fn tiny() -> u32 {\n    1\n}\n");
    write(
        root,
        "tool.py",
        "import os\n\ndef greet(name):\n    return f\"hi {name}\"\n",
    );
}

#[test]
fn tree_mode_without_limit_is_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let out = Command::new(bin())
        .env_remove("CODESHEAR_LINE_LIMIT")
        .arg(dir.path())
        .args(["--style", "plain"])
        .output()
        .expect("spawn codeshear");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("File: src/big.rs"));
    assert!(stdout.contains("File: src/small.rs"));
    assert!(stdout.contains("File: tool.py"));
    assert!(stdout.contains("fn trivial_9"), "all bodies present");
    assert!(!stdout.contains(SIGIL), "nothing elided without a limit");
}

#[test]
fn tree_mode_with_limit_elides_low_value_bodies() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let out = Command::new(bin())
        .env_remove("CODESHEAR_LINE_LIMIT")
        .arg(dir.path())
        .args(["--line-limit", "14", "--style", "plain"])
        .output()
        .expect("spawn codeshear");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("use std::fmt;"), "imports survive");
    assert!(stdout.contains("fn busy"), "complex body survives");
    assert!(stdout.contains(SIGIL), "markers for elided bodies");
    // The small files fit the budget and stay whole.
    assert!(stdout.contains("fn tiny"));
    assert!(stdout.contains("def greet"));
}

#[test]
fn xml_style_wraps_files_with_attributes() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let out = Command::new(bin())
        .env_remove("CODESHEAR_LINE_LIMIT")
        .arg(dir.path())
        .args(["--line-limit", "14"])
        .output()
        .expect("spawn codeshear");
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains("<code_pack>"));
    assert!(stdout.contains(r#"path="src/big.rs""#));
    assert!(stdout.contains(r#"truncated="true""#));
    assert!(stdout.contains(r#"truncated="false""#));
}

#[test]
fn single_file_mode_prints_truncated_source() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let out = Command::new(bin())
        .env_remove("CODESHEAR_LINE_LIMIT")
        .arg(dir.path().join("src/big.rs"))
        .args(["--line-limit", "14"])
        .output()
        .expect("spawn codeshear");
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("use std::fmt;"));
    assert!(stdout.contains(SIGIL));
    let kept = stdout.lines().filter(|l| !l.starts_with(SIGIL)).count();
    assert!(kept <= 14, "kept {kept} lines over the budget");
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());

    let run = || {
        Command::new(bin())
            .env_remove("CODESHEAR_LINE_LIMIT")
            .arg(dir.path())
            .args(["--line-limit", "14", "--style", "markdown"])
            .output()
            .expect("spawn codeshear")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn config_file_supplies_the_default_limit() {
    let dir = tempfile::tempdir().unwrap();
    seed_tree(dir.path());
    write(dir.path(), ".codeshear.json", r#"{ "line_limit": 14 }"#);

    let out = Command::new(bin())
        .env_remove("CODESHEAR_LINE_LIMIT")
        .arg(dir.path())
        .args(["--style", "plain"])
        .output()
        .expect("spawn codeshear");
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains(SIGIL), "config line_limit applied");
}
