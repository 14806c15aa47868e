#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;

/// The binary with the environment cleared of user overrides.
pub fn bare() -> Command {
    let mut cmd = Command::new(cargo_bin!("tripledger"));
    cmd.env_remove("TRIPLEDGER_CONFIG")
        .env_remove("TRIPLEDGER_USER")
        .env_remove("TRIPLEDGER_PASSWORD")
        .env("TRIPLEDGER_LOG", "info");
    cmd
}

/// Runs against the JSON document at `data` as `user`.
pub fn as_user(data: &Path, user: &str, password: &str) -> Command {
    let mut cmd = bare();
    cmd.arg("--data")
        .arg(data)
        .arg("--user")
        .arg(user)
        .arg("--password")
        .arg(password);
    cmd
}

pub fn admin(data: &Path) -> Command {
    as_user(data, "admin", "admin")
}

pub fn staff(data: &Path) -> Command {
    as_user(data, "empleado", "empleado123")
}

/// Registers a customer and returns the command's stdout.
pub fn add_customer(data: &Path, name: &str, seats: u32, singles: u32, doubles: u32, triples: u32) -> String {
    let output = admin(data)
        .args(["customer", "add", "--name", name, "--phone", "3312345678"])
        .args(["--seats", &seats.to_string()])
        .args(["--singles", &singles.to_string()])
        .args(["--doubles", &doubles.to_string()])
        .args(["--triples", &triples.to_string()])
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "customer add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn pay(data: &Path, id: &str, amount: &str) {
    let output = admin(data)
        .args(["payment", "add", id, "--amount", amount])
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "payment add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
