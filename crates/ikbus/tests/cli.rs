#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const STREAM: [u8; 16] = [
    0x50, 0x03, 0xC8, 0x01, 0x9A, // valid
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, // noise
    0xBF, 0x03, 0x80, 0x16, 0x2A, // valid
];

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ikbus-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn ikbus(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ikbus"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("IKBUS_BYTE_TIMEOUT")
        .env_remove("IKBUS_MODULES")
        .output()
        .expect("ikbus should run")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn decode_prints_packet_fields() {
    let output = ikbus(&["--format", "json", "decode", "50 03 C8 01 9A"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["source"], "50");
    assert_eq!(lines[0]["destination"], "C8");
    assert_eq!(lines[0]["payload"], "01");
    assert_eq!(lines[0]["wire"], "50 03 C8 01 9A");
}

#[test]
fn decode_bad_checksum_exits_data_invalid() {
    let output = ikbus(&["decode", "01", "03", "05", "07", "09"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid checksum"), "stderr: {stderr}");
}

#[test]
fn decode_rejects_non_hex() {
    let output = ikbus(&["decode", "50 03 XY"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn encode_prints_wire_form() {
    let output = ikbus(&[
        "--format",
        "pretty",
        "encode",
        "--source",
        "80",
        "--destination",
        "BF",
        "--data",
        "13 02 00 00 00 00 00 38",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("wire=[80 0A BF 13 02 00 00 00 00 00 38 1C]"),
        "stdout: {stdout}"
    );
}

#[test]
fn encode_raw_writes_bytes() {
    let output = ikbus(&[
        "--format", "raw", "encode", "-s", "50", "-d", "C8", "--data", "01",
    ]);
    assert!(output.status.success());
    assert_eq!(output.stdout, [0x50, 0x03, 0xC8, 0x01, 0x9A]);
}

#[test]
fn dump_file_classifies_elements() {
    let dir = unique_temp_dir("dump");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, STREAM).expect("capture should be writable");

    let output = ikbus(&["--format", "json", "dump", capture.to_str().unwrap()]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["valid"], true);
    assert_eq!(lines[0]["source"], "50");
    assert_eq!(lines[1]["valid"], false);
    assert_eq!(lines[1]["data"], "01 02 03 04 05 06");
    assert!(lines[1].get("source").is_none());
    assert_eq!(lines[2]["index"], 2);
    assert_eq!(lines[2]["wire"], "BF 03 80 16 2A");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dump_valid_only_with_count() {
    let dir = unique_temp_dir("dump-filter");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, STREAM).expect("capture should be writable");

    let output = ikbus(&[
        "--format",
        "json",
        "dump",
        capture.to_str().unwrap(),
        "--valid-only",
        "--count",
        "2",
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line["valid"] == true));
    assert_eq!(lines[1]["source"], "BF");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dump_labels_addresses_from_module_table() {
    let dir = unique_temp_dir("dump-modules");
    let capture = dir.join("capture.bin");
    let modules = dir.join("e46.json");
    std::fs::write(&capture, STREAM).expect("capture should be writable");
    std::fs::write(
        &modules,
        r#"[
            { "id": 80, "code": "MFL", "name": "Multi-function steering wheel" },
            { "id": 200, "code": "TEL", "name": "Telephone" }
        ]"#,
    )
    .expect("module table should be writable");

    let output = ikbus(&[
        "--format",
        "json",
        "dump",
        capture.to_str().unwrap(),
        "--modules",
        modules.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(
        lines[0]["description"],
        "MFL -> TEL: Unknown message \"50 03 C8 01 9A\""
    );
    assert!(lines[1].get("description").is_none());
    assert!(lines[2]["description"]
        .as_str()
        .unwrap()
        .starts_with("BF -> 80: "));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dump_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ikbus"))
        .args(["--log-level", "error", "--format", "pretty", "dump", "-"])
        .env_remove("IKBUS_BYTE_TIMEOUT")
        .env_remove("IKBUS_MODULES")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("dump should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&STREAM)
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("dump should finish");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "stdout: {stdout}");
    assert!(lines[0].contains("valid") && lines[0].contains("50 03 C8 01 9A"));
    assert!(lines[1].contains("invalid") && lines[1].contains("01 02 03 04 05 06"));
}

#[test]
fn dump_missing_file_fails() {
    let output = ikbus(&["dump", "/nonexistent/ikbus-capture.bin"]);
    assert_eq!(output.status.code(), Some(51));
}

#[test]
fn dump_rejects_bad_timeout() {
    let output = ikbus(&["dump", "--byte-timeout", "soon", "-"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_name() {
    let output = ikbus(&["version", "--extended"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: ikbus"));
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
}
