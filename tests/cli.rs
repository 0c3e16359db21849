use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("afcli")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge-masks"))
        .stdout(predicate::str::contains("remove-overlap"))
        .stdout(predicate::str::contains("wait-job"));
}

#[test]
fn missing_token_is_a_clear_error() {
    Command::cargo_bin("afcli")
        .unwrap()
        .env_remove("AFCLI_TOKEN")
        .args(["list-projects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AFCLI_TOKEN"));
}

#[test]
fn merge_masks_requires_a_task() {
    Command::cargo_bin("afcli")
        .unwrap()
        .args(["merge-masks", "--project", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--task"));
}
