use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("walletgate"));
    cmd.arg("tests/fixtures/script.csv")
        .arg("--min-display-ms")
        .arg("50")
        .arg("--contacts")
        .arg("alice,bob");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "flow,status,transaction_id,amount,currency,error,elapsed_ms",
        ))
        .stdout(predicate::str::contains("topup,success,TXN-1,50.00,SGD,,"))
        .stdout(predicate::str::contains("transfer,success,TXN-2,20.00,SGD,,"))
        // Only 30.00 left after the first transfer
        .stdout(predicate::str::contains(
            "transfer,failed,,500.00,SGD,\"Insufficient funds: available 30.00, requested 500.00\",",
        ))
        // Below the top-up minimum
        .stdout(predicate::str::contains("topup,invalid,,,,"));

    Ok(())
}

#[test]
fn test_min_display_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("walletgate"));
    cmd.env("WALLETGATE_MIN_DISPLAY_MS", "0")
        .arg("tests/fixtures/script.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("topup,success,TXN-1,50.00,SGD,,"));

    Ok(())
}

#[test]
fn test_missing_input_file() {
    let mut cmd = Command::new(cargo_bin!("walletgate"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}

#[test]
fn test_source_column_and_whole_amounts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("funded.csv");
    std::fs::write(
        &path,
        "flow,amount,currency,recipient,note,source\n\
         topup,40,SGD,,,bank_transfer\n\
         topup,2.5,SGD,,,pay_now\n\
         transfer,100,SGD,alice,,\n",
    )?;

    let mut cmd = Command::new(cargo_bin!("walletgate"));
    cmd.arg(&path).arg("--min-display-ms").arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("topup,success,TXN-1,40.00,SGD,,"))
        .stdout(predicate::str::contains("topup,success,TXN-2,2.50,SGD,,"))
        .stdout(predicate::str::contains(
            "transfer,failed,,100.00,SGD,\"Insufficient funds: available 42.50, requested 100.00\",",
        ));

    Ok(())
}
