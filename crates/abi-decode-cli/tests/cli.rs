// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end tests for the `abi-decode` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value as Json;
use tempfile::TempDir;

fn words(values: &[u64]) -> String {
    let mut out = String::from("0x");
    for v in values {
        out.push_str(&format!("{v:064x}"));
    }
    out
}

fn cli(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("abi-decode").expect("binary");
    cmd.env("ABI_DECODE_CONFIG_DIR", config.path())
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Json {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("json on stdout")
}

#[test]
fn decode_prints_named_parameters() {
    let config = tempfile::tempdir().expect("tempdir");
    let data = words(&[6, 0x60, 9, 7, 11, 12, 13, 14, 15, 16, 17]);
    let out = json_stdout(cli(&config).args([
        "decode",
        "--signature",
        "f(uint256 a,uint16[] b,uint256 c)",
        "--data",
        &data,
    ]));
    assert_eq!(out["signature"], "f(uint256,uint16[],uint256)");
    assert_eq!(out["canonical"], true);
    assert_eq!(out["policy"]["mode"], "strict");
    assert_eq!(out["params"][1]["name"], "b");
    assert_eq!(out["params"][1]["value"][6], "17");
    assert_eq!(out["params"][2]["value"], "9");
}

#[test]
fn strict_failure_reports_kind_and_path() {
    let config = tempfile::tempdir().expect("tempdir");
    cli(&config)
        .args(["decode", "-s", "f(enum(2) e)", "--data", &words(&[2])])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enum ordinal 2 out of range"))
        .stderr(predicate::str::contains("$.e"));
}

#[test]
fn legacy_flag_coerces_instead() {
    let config = tempfile::tempdir().expect("tempdir");
    let data = words(&[0xffffff, 0x1ffff, 4]);
    let out = json_stdout(cli(&config).args([
        "decode",
        "-s",
        "f(uint16,int16,bool)",
        "--data",
        &data,
        "--mode",
        "legacy",
    ]));
    assert_eq!(out["params"][0]["value"], "65535");
    assert_eq!(out["params"][1]["value"], "-1");
    assert_eq!(out["params"][2]["value"], true);
    assert_eq!(out["canonical"], false);
}

#[test]
fn stored_prefs_apply_until_overridden() {
    let config = tempfile::tempdir().expect("tempdir");
    let out = json_stdout(cli(&config).args(["config", "set", "--mode", "legacy"]));
    assert_eq!(out["prefs"]["mode"], "legacy");
    assert_eq!(out["policy"]["trailing_bytes"], "allow");
    assert!(config.path().join("prefs.json").exists());

    let shown = json_stdout(cli(&config).args(["config", "show"]));
    assert_eq!(shown, out);

    let data = words(&[4]);
    let decoded = json_stdout(cli(&config).args(["decode", "-s", "f(bool)", "--data", &data]));
    assert_eq!(decoded["params"][0]["value"], true);

    cli(&config)
        .args(["decode", "-s", "f(bool)", "--data", &data, "--mode", "strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bool encoding"));
}

#[test]
fn config_set_without_flags_fails() {
    let config = tempfile::tempdir().expect("tempdir");
    cli(&config)
        .args(["config", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn trailing_bytes_flag_and_data_file() {
    let config = tempfile::tempdir().expect("tempdir");
    let file = config.path().join("call.hex");
    std::fs::write(&file, format!("{}\n{}", words(&[1]), "ff".repeat(32))).expect("write");
    let file = file.to_str().expect("utf-8 path");

    cli(&config)
        .args(["decode", "-s", "f(uint8)", "--data-file", file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trailing bytes: 32 of 64"));

    let out = json_stdout(cli(&config).args([
        "decode",
        "-s",
        "f(uint8)",
        "--data-file",
        file,
        "--trailing-bytes",
        "allow",
    ]));
    assert_eq!(out["params"][0]["value"], "1");
}

#[test]
fn stdin_and_selector() {
    let config = tempfile::tempdir().expect("tempdir");
    let data = format!("0xdeadbeef{}", &words(&[7])[2..]);
    let out = json_stdout(
        cli(&config)
            .args(["decode", "-s", "transfer(uint256 amount)", "--skip-selector"])
            .write_stdin(data),
    );
    assert_eq!(out["params"][0]["name"], "amount");
    assert_eq!(out["params"][0]["value"], "7");
}

#[test]
fn raw_output_is_the_tagged_tree() {
    let config = tempfile::tempdir().expect("tempdir");
    let out = json_stdout(cli(&config).args([
        "decode",
        "-s",
        "(bool,enum(3))",
        "--data",
        &words(&[1, 2]),
        "--raw",
    ]));
    assert_eq!(out["params"]["kind"], "tuple");
    assert_eq!(out["params"]["value"][0], serde_json::json!({ "kind": "bool", "value": true }));
    assert_eq!(out["params"]["value"][1], serde_json::json!({ "kind": "enum", "value": 2 }));
}

#[test]
fn inspect_prints_the_type_tree() {
    let config = tempfile::tempdir().expect("tempdir");
    let out = json_stdout(cli(&config).args([
        "inspect",
        "--signature",
        "function f(uint256 a, uint16[][] b, uint256[][3] c)",
    ]));
    assert_eq!(out["name"], "f");
    assert_eq!(out["signature"], "f(uint256,uint16[][],uint256[][3])");
    assert_eq!(out["params"]["region_words"], 3);
    assert_eq!(out["params"]["fields"][2]["dynamic"], true);
    assert_eq!(out["params"]["fields"][2]["length"], 3);
}

#[test]
fn bad_signature_is_a_parse_error() {
    let config = tempfile::tempdir().expect("tempdir");
    cli(&config)
        .args(["inspect", "-s", "f(uint7)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed type"));
}
