use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("balance-engine"));
    cmd.arg("process").arg("tests/fixtures/mutations.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account,balance"))
        // 100 - 30, overdraft rejected, then +10 +20
        .stdout(predicate::str::contains("u1,100"))
        .stdout(predicate::str::contains("u2,2.5"))
        .stderr(predicate::str::contains("Insufficient funds in account u1"));

    Ok(())
}

#[test]
fn test_balance_of_unknown_account_is_zero() {
    let mut cmd = Command::new(cargo_bin!("balance-engine"));
    cmd.arg("balance").arg("nobody").arg("ghost");

    cmd.assert()
        .success()
        .stdout("account,balance\nnobody,0\nghost,0\n");
}

#[test]
fn test_balance_requires_an_account() {
    let mut cmd = Command::new(cargo_bin!("balance-engine"));
    cmd.arg("balance");

    cmd.assert().failure();
}

#[test]
fn test_missing_input_file_fails() {
    let mut cmd = Command::new(cargo_bin!("balance-engine"));
    cmd.arg("process").arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
