// `--list` prints the catalog without touching the terminal, so it runs
// anywhere. HOME and the XDG dirs point at a temp dir so no user config leaks in.

use assert_cmd::Command;
use tempfile::TempDir;

fn voicecoach(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voicecoach").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"));
    cmd
}

#[test]
fn list_prints_whole_catalog() {
    let home = TempDir::new().unwrap();
    let output = voicecoach(&home).arg("--list").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 50);
    assert!(stdout.lines().next().unwrap().contains("Vowel Warm-Up"));
}

#[test]
fn list_applies_filters() {
    let home = TempDir::new().unwrap();
    let output = voicecoach(&home)
        .args(["--list", "--difficulty", "advanced", "--type", "Breathing"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Long Sentence Support"));
    assert!(lines[0].contains("Advanced"));
}

#[test]
fn unknown_difficulty_is_rejected() {
    let home = TempDir::new().unwrap();
    voicecoach(&home)
        .args(["--list", "--difficulty", "expert"])
        .assert()
        .failure();
}

#[test]
fn without_tty_the_tui_refuses_to_start() {
    let home = TempDir::new().unwrap();
    voicecoach(&home)
        .args(["--api-url", "http://127.0.0.1:9"])
        .write_stdin("")
        .assert()
        .failure();
}
