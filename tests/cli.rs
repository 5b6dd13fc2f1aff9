use assert_cmd::Command;
use predicates::prelude::*;

/// Command with config and credential lookup isolated from the host
fn tubescrub(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tubescrub").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn help_describes_the_tool() {
    let home = tempfile::tempdir().unwrap();
    tubescrub(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch YouTube transcripts"));
}

#[test]
fn fetch_rejects_malformed_input_without_touching_the_network() {
    let home = tempfile::tempdir().unwrap();
    tubescrub(&home)
        .args(["fetch", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not extract a video id"));
}

#[test]
fn clean_without_credential_fails_before_any_call() {
    let home = tempfile::tempdir().unwrap();
    tubescrub(&home)
        .args(["clean", "https://www.youtube.com/watch?v=TESTID1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API key"));
}

#[test]
fn config_show_prints_effective_settings() {
    let home = tempfile::tempdir().unwrap();
    tubescrub(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration"));
}
