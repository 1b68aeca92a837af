//! Basic CLI E2E tests.
//!
//! Each test runs the built `salat` binary against its own temporary data
//! directory and inspects the JSON it prints.

use std::path::Path;
use std::process::Command;

use chrono::{Days, Utc};
use tempfile::TempDir;

const TIMETABLE: &str = r#"
[default]
fajr = "05:00"
sunrise = "06:30"
dhuhr = "12:30"
asr = "15:45"
maghrib = "18:20"
isha = "19:40"
"#;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_salat"))
        .args(args)
        .env("SALAT_HOME", home)
        .env_remove("SALAT_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success and parse stdout as JSON.
fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

fn home_with_profile() -> TempDir {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("timetable.toml"), TIMETABLE).unwrap();
    run_json(
        home.path(),
        &["location", "set", "--lat", "51.5072", "--lon", "-0.1276", "--tz", "Europe/London", "--city", "London"],
    );
    home
}

#[test]
fn test_config_defaults() {
    let home = TempDir::new().unwrap();
    let config = run_json(home.path(), &["config", "list"]);
    assert_eq!(config["pump"]["interval_secs"], 60);
    assert_eq!(config["pump"]["retention_days"], 7);
    assert_eq!(config["status"]["current_window_min"], 30);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "pump.retention_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "7");
}

#[test]
fn test_config_set_validates() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "status.current_window_min", "45"]);
    assert_eq!(code, 0);
    let config = run_json(home.path(), &["config", "list"]);
    assert_eq!(config["status"]["current_window_min"], 45);

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "pump.interval_secs", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_location_rejects_out_of_range() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["location", "set", "--lat", "91", "--lon", "0", "--tz", "UTC"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["location", "show"]);
    assert_eq!(code, 1, "nothing should have been saved");
}

#[test]
fn test_location_roundtrip() {
    let home = home_with_profile();
    let location = run_json(home.path(), &["location", "show"]);
    assert_eq!(location["timezone"], "Europe/London");
    assert_eq!(location["city"], "London");
    assert_eq!(location["longitude"], -0.1276);
}

#[test]
fn test_settings_update() {
    let home = TempDir::new().unwrap();
    let settings = run_json(
        home.path(),
        &["settings", "set", "--method", "umm_al_qura", "--madhab", "hanafi", "--adjust", "fajr=2", "--adjust", "isha=-3"],
    );
    assert_eq!(settings["method"], "umm_al_qura");
    assert_eq!(settings["madhab"], "hanafi");
    assert_eq!(settings["adjustments"]["fajr"], 2);
    assert_eq!(settings["adjustments"]["isha"], -3);

    let (_, _, code) = run_cli(home.path(), &["settings", "set", "--adjust", "fajr=500"]);
    assert_eq!(code, 1);
    let settings = run_json(home.path(), &["settings", "show"]);
    assert_eq!(settings["adjustments"]["fajr"], 2);
}

#[test]
fn test_times_from_timetable() {
    let home = home_with_profile();
    let times = run_json(home.path(), &["times", "--date", "2024-03-01"]);
    assert_eq!(times["timezone"], "Europe/London");

    let entries = times["times"].as_array().unwrap();
    assert_eq!(entries.len(), 8);
    let time_of = |name: &str| {
        entries
            .iter()
            .find(|e| e["name"] == name)
            .map(|e| e["time"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(time_of("fajr"), "05:00");
    // The default method adds a minute to dhuhr.
    assert_eq!(time_of("dhuhr"), "12:31");
    assert_eq!(time_of("middle_of_night"), "23:40");
}

#[test]
fn test_times_without_timetable_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["times"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_status_lists_five_prayers() {
    let home = home_with_profile();
    let status = run_json(home.path(), &["status", "--date", "2024-03-01"]);
    assert_eq!(status["location"], "London");
    assert_eq!(status["sunrise"], "06:30");
    let prayers = status["prayers"].as_array().unwrap();
    assert_eq!(prayers.len(), 5);
    assert_eq!(prayers[0]["prayer"], "fajr");
    assert_eq!(prayers[0]["local_time"], "05:00");
    // 2024-03-01 is in the past.
    assert_eq!(prayers[4]["is_upcoming"], false);
}

#[test]
fn test_log_updates_streaks() {
    let home = TempDir::new().unwrap();
    let outcome = run_json(home.path(), &["log", "fajr"]);
    assert_eq!(outcome["record"]["fajr"]["logged"], true);
    assert_eq!(outcome["record"]["fajr"]["on_time"], true);
    assert_eq!(outcome["streaks"]["fajr_only"]["current_streak"], 1);
    assert_eq!(outcome["streaks"]["all_prayers"]["current_streak"], 0);
    assert_eq!(outcome["events"][0]["type"], "PrayerLogged");

    let outcome = run_json(home.path(), &["log", "dhuhr", "--late"]);
    assert_eq!(outcome["record"]["dhuhr"]["on_time"], false);

    let history = run_json(home.path(), &["history"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn test_log_rejects_future_date() {
    let home = TempDir::new().unwrap();
    let future = Utc::now().date_naive() + Days::new(2);
    let (_, stderr, code) = run_cli(home.path(), &["log", "isha", "--date", &future.to_string()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("future"));

    let (_, _, code) = run_cli(home.path(), &["log", "tahajjud"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_on_empty_history() {
    let home = TempDir::new().unwrap();
    let stats = run_json(home.path(), &["stats"]);
    assert_eq!(stats["weekly"]["total_logged"], 0);
    assert_eq!(stats["weekly"]["percentage"], 0);
    assert_eq!(stats["monthly"]["percentage"], 0);
    assert!(stats["last_missed_prayer"].is_null());

    let streaks = run_json(home.path(), &["streaks"]);
    assert_eq!(streaks["on_time_all"]["best_streak"], 0);
}

#[test]
fn test_notify_schedule_is_idempotent() {
    let home = home_with_profile();
    let first = run_json(home.path(), &["notify", "schedule", "--date", "2099-01-01"]);
    assert_eq!(first["created"].as_array().unwrap().len(), 5);
    assert_eq!(first["created"][1], "2099-01-01-dhuhr-at");

    let second = run_json(home.path(), &["notify", "schedule", "--date", "2099-01-01"]);
    assert!(second["created"].as_array().unwrap().is_empty());
    assert_eq!(second["skipped_existing"], 5);

    let pending = run_json(home.path(), &["notify", "list", "--pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 5);
}

#[test]
fn test_notify_schedule_keeps_past_reminders_due() {
    let home = home_with_profile();
    let report = run_json(home.path(), &["notify", "schedule", "--date", "2024-03-01"]);
    assert_eq!(report["created"].as_array().unwrap().len(), 5);

    let pending = run_json(home.path(), &["notify", "list", "--pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 5);
}

#[test]
fn test_notify_prefs_and_cancel() {
    let home = home_with_profile();
    let prefs = run_json(
        home.path(),
        &["notify", "prefs", "--prayer", "asr", "--enabled", "false"],
    );
    let asr = prefs
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["prayer"] == "asr")
        .unwrap();
    assert_eq!(asr["enabled"], false);

    run_json(home.path(), &["notify", "prefs", "--prayer", "fajr", "--timing", "before15"]);
    let report = run_json(home.path(), &["notify", "schedule", "--date", "2099-01-01"]);
    let created = report["created"].as_array().unwrap();
    assert_eq!(created.len(), 4);
    assert_eq!(created[0], "2099-01-01-fajr-before15");

    let (stdout, _, code) = run_cli(home.path(), &["notify", "cancel", "2099-01-01-isha-at"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("ReminderCancelled"));

    let (stdout, _, code) = run_cli(home.path(), &["notify", "cancel", "--date", "2099-01-01"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 3);

    let pending = run_json(home.path(), &["notify", "list", "--pending"]);
    assert!(pending.as_array().unwrap().is_empty());
    let all = run_json(home.path(), &["notify", "list"]);
    assert_eq!(all.as_array().unwrap().len(), 4);
}

#[test]
fn test_notify_watch_once() {
    let home = home_with_profile();
    let (stdout, stderr, code) = run_cli(home.path(), &["notify", "watch", "--once"]);
    assert_eq!(code, 0, "{stderr}");
    let types: Vec<String> = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert!(types.contains(&"PumpStarted".to_string()));
    assert_eq!(types.last().map(String::as_str), Some("PumpStopped"));
}
