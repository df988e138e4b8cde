use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ROOM_LOG: &str = "\
0 ms: Room1_Power -> 0
10 ms: Room1_Power -> 1
20 ms: Room1_Volume -> 3.5k
00:00:00.030: Codec_Status -> READY
40 ms: Room1_Power -> 0
";

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crestron-log-cli"))
        .args(args)
        .output()
        .expect("run crestron-log-cli")
}

fn embedded_json(html: &str) -> serde_json::Value {
    let marker = "application/json\">";
    let start = html.find(marker).expect("data block") + marker.len();
    let end = start + html[start..].find("</script>").expect("end of data block");
    serde_json::from_str(&html[start..end]).expect("valid chart JSON")
}

#[test]
fn writes_default_output_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);

    let output = run_cli(&[log.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let html_path = dir.path().join("room.edges.html");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote:"));
    assert!(stdout.contains("room.edges.html"));

    let html = fs::read_to_string(&html_path).expect("output written");
    let data = embedded_json(&html);
    assert_eq!(
        data["layout"]["yaxis"]["ticktext"],
        serde_json::json!(["Room1_Power", "Room1_Volume", "Codec_Status"])
    );
    assert_eq!(data["traces"].as_array().unwrap().len(), 3);
}

#[test]
fn steps_mode_with_explicit_output() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);
    let out = dir.path().join("chart.html");

    let output = run_cli(&[
        log.to_str().unwrap(),
        "--mode",
        "steps",
        "--out",
        out.to_str().unwrap(),
        "--only",
        "Power",
        "--quiet",
    ]);
    assert!(output.status.success());

    let data = embedded_json(&fs::read_to_string(&out).unwrap());
    let traces = data["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["mode"], "lines");
    assert_eq!(traces[0]["name"], "Room1_Power");
}

#[test]
fn time_window_is_normalized_unless_absolute() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);

    let relative = dir.path().join("relative.html");
    let output = run_cli(&[
        log.to_str().unwrap(),
        "--tmin",
        "10",
        "--out",
        relative.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let data = embedded_json(&fs::read_to_string(&relative).unwrap());
    assert_eq!(data["layout"]["xaxis"]["range"][0], 0.0);
    assert_eq!(data["meta"]["timeOffsetMs"], 10.0);

    let absolute = dir.path().join("absolute.html");
    let output = run_cli(&[
        log.to_str().unwrap(),
        "--tmin",
        "10",
        "--absolute-time",
        "--out",
        absolute.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let data = embedded_json(&fs::read_to_string(&absolute).unwrap());
    assert_eq!(data["layout"]["xaxis"]["range"][0], 10.0);
    assert!(data["meta"]["timeOffsetMs"].is_null());
}

#[test]
fn no_parseable_rows_exits_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "noise.log", "boot banner\n\nnothing useful\n");

    let output = run_cli(&[log.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No parseable rows"));
    assert!(!dir.path().join("noise.edges.html").exists());
}

#[test]
fn no_parseable_rows_takes_precedence_over_bad_regex() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "noise.log", "boot banner\n");

    let output = run_cli(&[log.to_str().unwrap(), "--only", "("]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("noise.edges.html").exists());
}

#[test]
fn empty_after_filtering_exits_with_code_3() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);

    let output = run_cli(&[log.to_str().unwrap(), "--tmin", "1000"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No events after filtering"));
    assert!(!dir.path().join("room.edges.html").exists());
}

#[test]
fn invalid_regex_is_a_general_failure() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);

    let output = run_cli(&[log.to_str().unwrap(), "--only", "("]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("room.edges.html").exists());
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_file(dir.path(), "room.log", ROOM_LOG);
    let out = dir.path().join("from_config.html");
    let config = write_file(
        dir.path(),
        "timeline.toml",
        &format!(
            "[filter]\nexclude = \"Codec\"\nmax_signals = 1\n\n[render]\nmode = \"steps\"\nout = {:?}\n",
            out.to_str().unwrap()
        ),
    );

    let output = run_cli(&[
        log.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--summary",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 signals, 3 events"));

    let data = embedded_json(&fs::read_to_string(&out).unwrap());
    assert_eq!(data["layout"]["yaxis"]["ticktext"], serde_json::json!(["Room1_Power"]));
    assert_eq!(data["traces"][0]["mode"], "lines");
}
