use assert_cmd::cargo::cargo_bin_cmd;

fn fixture(path: &str) -> String {
    format!("{}/tests/fixtures/{path}", env!("CARGO_MANIFEST_DIR"))
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

#[test]
fn help_lists_flags() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = stdout_of(out.get_output());

    for flag in [
        "--config",
        "--interval-ms",
        "--log-file",
        "--no-structural-capture",
        "--script",
        "--print-config",
    ] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn print_config_merges_file_and_flags() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--print-config")
        .arg("--config")
        .arg(fixture("configs/fast-playback.toml"))
        .arg("--no-structural-capture");
    let out = cmd.assert().success();
    let stdout = stdout_of(out.get_output());
    assert!(stdout.contains("interval_ms = 50"));
    assert!(stdout.contains("playback_enabled_initially = true"));
    assert!(stdout.contains("structural_watcher = false"));
}

#[test]
fn script_run_prints_playback_lines() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--script").arg(fixture("scripts/three-edits.txt"));
    let out = cmd.assert().success();
    let stdout = stdout_of(out.get_output());
    assert!(stdout.contains("mode=playing event=tick message=abc "));
    assert!(stdout
        .lines()
        .last()
        .is_some_and(|line| line.contains("event=buffer")));
}

#[test]
fn script_run_writes_jsonl_log() {
    let temp = tempfile::tempdir().expect("tempdir");
    let log = temp.path().join("events.jsonl");
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--script")
        .arg(fixture("scripts/three-edits.txt"))
        .arg("--log-file")
        .arg(&log)
        .arg("--interval-ms")
        .arg("10");
    cmd.assert().success();

    let contents = std::fs::read_to_string(&log).expect("log written");
    assert!(contents.contains("\"event_type\":\"playback_started\""));
    assert!(contents.contains("\"interval_ms\":10"));
    assert_eq!(
        contents
            .lines()
            .filter(|line| line.contains("\"event_type\":\"playback_tick\""))
            .count(),
        3
    );
}

#[test]
fn zero_interval_config_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--print-config")
        .arg("--config")
        .arg(fixture("configs/zero-interval.toml"));
    let out = cmd.assert().failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("invalid config: playback.interval_ms"));
}

#[test]
fn unknown_config_key_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--print-config")
        .arg("--config")
        .arg(fixture("configs/unknown-key.toml"));
    let out = cmd.assert().failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("config parse error"));
}

#[test]
fn missing_config_path_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--print-config")
        .arg("--config")
        .arg(fixture("configs/missing.toml"));
    cmd.assert().failure();
}

#[test]
fn bad_script_reports_line_and_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.arg("--script").arg(fixture("scripts/unknown-command.txt"));
    let out = cmd.assert().failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("line 2"));
}

#[test]
fn non_interactive_stdin_without_script_fails() {
    let mut cmd = cargo_bin_cmd!("input-recorder");
    cmd.write_stdin("");
    let out = cmd.assert().failure();
    let stderr = String::from_utf8(out.get_output().stderr.clone()).expect("utf8");
    assert!(stderr.contains("interactive mode requires a terminal"));
}
