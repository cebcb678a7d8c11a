use std::process::Command;

#[test]
fn prints_version() {
    let exe = env!("CARGO_BIN_EXE_daily-hn");
    let output = Command::new(exe)
        .arg("--version")
        .output()
        .expect("run daily-hn --version");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout was: {}",
        stdout.trim()
    );
}

#[test]
fn prints_help() {
    let exe = env!("CARGO_BIN_EXE_daily-hn");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("run daily-hn --help");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    assert!(stdout.contains("Daily Dose of HN"));
    assert!(stdout.contains("--print"));
    assert!(stdout.contains("--version"));
}

#[test]
fn rejects_unknown_arguments() {
    let exe = env!("CARGO_BIN_EXE_daily-hn");
    let output = Command::new(exe)
        .arg("--frobnicate")
        .output()
        .expect("run daily-hn --frobnicate");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr utf8");
    assert!(stderr.contains("--frobnicate"));
}
