use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("BOOKSHELF_TELEMETRY__FILTER", "error");
    cmd
}

#[test]
fn config_prints_json_settings() {
    let output = cli()
        .arg("config")
        .env("BOOKSHELF_SERVER__PORT", "9123")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"port\": 9123"));
}

#[test]
fn migrate_in_memory_succeeds() {
    let output = cli()
        .args(["migrate", "--database-url", "sqlite::memory:"])
        .env("BOOKSHELF_TELEMETRY__FILTER", "info")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["applied 5 migration(s)"]);
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("migrations complete"));
}

#[test]
fn unknown_subcommand_fails() {
    cli().arg("frobnicate").assert().failure();
}
