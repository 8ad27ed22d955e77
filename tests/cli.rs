//! `registryd` binary smoke tests, run through `assert_cmd` against the
//! compiled binary itself rather than calling into the library.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_three_subcommands() {
    Command::cargo_bin("registryd")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("worker"));
}

/// `migrate` builds every backend and exits; with no `REGISTRY_*`
/// overrides every backend defaults to its in-process form (memory
/// storage, local-disk object store, in-process cache), so this never
/// touches a network or a real database.
#[test]
fn migrate_succeeds_against_default_in_process_backends() {
    Command::cargo_bin("registryd")
        .unwrap()
        .arg("migrate")
        .assert()
        .success();
}

#[test]
fn unknown_subcommand_is_rejected() {
    Command::cargo_bin("registryd")
        .unwrap()
        .arg("not-a-real-subcommand")
        .assert()
        .failure();
}
