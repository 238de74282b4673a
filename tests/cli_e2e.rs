use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn upkeep(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("upkeep").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("UPKEEP_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

#[test]
fn add_and_list_objects() {
    let dir = tempfile::tempdir().unwrap();

    upkeep(dir.path())
        .args(["objects", "add", "Vehicles", "Truck 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Object created: VEH-0001"));

    upkeep(dir.path())
        .args(["objects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VEH-0001"))
        .stdout(predicate::str::contains("Truck 1"))
        .stdout(predicate::str::contains("Vehicle"));

    assert!(dir.path().join("objects.csv").exists());
}

#[test]
fn json_output_carries_canonical_type() {
    let dir = tempfile::tempdir().unwrap();
    upkeep(dir.path())
        .args(["objects", "add", "facilities", "Depot"])
        .assert()
        .success();

    let out = upkeep(dir.path())
        .args(["objects", "list", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows[0]["object_id"], "FAC-0001");
    assert_eq!(rows[0]["object_type"], "Facility");
    assert_eq!(rows[0]["name"], "Depot");
}

#[test]
fn service_for_unknown_object_needs_type() {
    let dir = tempfile::tempdir().unwrap();

    upkeep(dir.path())
        .args(["services", "add", "VEH-0099", "Oil change", "--interval", "90"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("VEH-0099"));

    upkeep(dir.path())
        .args([
            "services", "add", "VEH-0099", "Oil change", "--interval", "90", "--type", "veh",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SVC-00001"));
}

#[test]
fn zero_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    upkeep(dir.path())
        .args(["objects", "add", "Vehicle", "Van"])
        .assert()
        .success();

    upkeep(dir.path())
        .args(["services", "add", "VEH-0001", "Tyres", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    assert!(!dir.path().join("services.csv").exists());
}

#[test]
fn deleting_missing_object_warns() {
    let dir = tempfile::tempdir().unwrap();
    upkeep(dir.path())
        .args(["objects", "delete", "VEH-0042"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn meter_units_default_then_add() {
    let dir = tempfile::tempdir().unwrap();

    upkeep(dir.path())
        .args(["units", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("km"))
        .stdout(predicate::str::contains("hours"));

    upkeep(dir.path())
        .args(["units", "add", "liters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Meter unit added: liters"));

    upkeep(dir.path())
        .args(["units", "add", "KM"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already registered"));

    upkeep(dir.path())
        .args(["units", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("liters"))
        .stdout(predicate::str::contains("miles"));
}

#[test]
fn config_set_persists() {
    let dir = tempfile::tempdir().unwrap();

    upkeep(dir.path())
        .args(["config", "id_policy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("next-after-max"));

    upkeep(dir.path())
        .args(["config", "id_policy", "row-count"])
        .assert()
        .success();

    upkeep(dir.path())
        .args(["config", "id_policy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("row-count"));
    assert!(dir.path().join("config.json").exists());

    upkeep(dir.path())
        .args(["config", "no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn dashboard_reports_overdue_service() {
    let dir = tempfile::tempdir().unwrap();
    upkeep(dir.path())
        .args(["objects", "add", "Vehicle", "Truck"])
        .assert()
        .success();
    upkeep(dir.path())
        .args([
            "services", "add", "VEH-0001", "Brakes", "--interval", "30", "--due", "2024-01-01",
        ])
        .assert()
        .success();

    upkeep(dir.path())
        .args(["dashboard", "--today", "2024-01-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 objects"))
        .stdout(predicate::str::contains("1 overdue services"))
        .stdout(predicate::str::contains("SVC-00001"));
}

#[test]
fn export_writes_archive() {
    let dir = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    upkeep(dir.path())
        .args(["objects", "add", "Other", "Generator"])
        .assert()
        .success();

    upkeep(dir.path())
        .args(["export", "--dest"])
        .arg(dest.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let archives: Vec<_> = std::fs::read_dir(dest.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tar.gz"))
        .collect();
    assert_eq!(archives.len(), 1);
}
