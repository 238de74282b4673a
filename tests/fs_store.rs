use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use upkeep::api::UpkeepApi;
use upkeep::error::UpkeepError;
use upkeep::ids::IdPolicy;
use upkeep::model::*;
use upkeep::store::fs_backend::FsBackend;
use upkeep::store::lock::TableLock;
use upkeep::store::{atomic, codec, Record};

fn open(dir: &Path) -> UpkeepApi<FsBackend> {
    UpkeepApi::open(dir).unwrap()
}

fn stamp() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn object_rows(n: usize) -> Vec<ObjectRecord> {
    (1..=n)
        .map(|i| ObjectRecord {
            object_id: format!("VEH-{:04}", i),
            object_type: "Vehicle".to_string(),
            name: format!("Truck, number \"{}\"", i),
            description: "multi\nline".to_string(),
            status: ObjectStatus::Active,
            created_date: stamp(),
            last_updated: stamp(),
        })
        .collect()
}

#[test]
fn vehicle_scenario_normalizes_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());

    let id = api
        .add_object(NewObject::new("Vehicles", "Truck-001").with_status(ObjectStatus::Active))
        .unwrap();
    assert_eq!(id, "VEH-0001");

    let rows = api.get_objects(&ObjectFilter::by_type("Vehicle")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].object_type, "Vehicle");

    let on_disk = fs::read_to_string(dir.path().join("objects.csv")).unwrap();
    assert!(on_disk.starts_with(
        "object_id,object_type,name,description,status,created_date,last_updated\n"
    ));
    assert!(on_disk.contains("VEH-0001,Vehicle,Truck-001,,Active,"));
}

#[test]
fn service_interval_survives_status_update() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());

    let id = api
        .add_service(NewService::new("VEH-0001", "Vehicle", "Oil change", 30))
        .unwrap();
    assert!(api
        .update_service(&id, ServicePatch::status(ServiceStatus::Completed))
        .unwrap());

    let rows = api.get_services(&ServiceFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ServiceStatus::Completed);
    assert_eq!(rows[0].interval_days, 30);
}

#[test]
fn round_trip_keeps_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());

    let mut new = NewReport::new("FAC-0001", "Facility", ReportType::Repair, "Boiler, \"again\"");
    new.description = "line one\nline two".into();
    new.notes = "ok".into();
    new.actual_meter_reading = Some(4200);
    new.meter_unit = "hours".into();
    new.completion_date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9);
    let id = api.add_report(new).unwrap();

    let row = api.get_report(&id).unwrap().unwrap();
    assert_eq!(row.report_id, "REP-00001");
    assert_eq!(row.title, "Boiler, \"again\"");
    assert_eq!(row.description, "line one\nline two");
    assert_eq!(row.actual_meter_reading, Some(4200));
    assert_eq!(row.meter_unit, "hours");
    assert_eq!(row.completion_date.to_string(), "2024-03-09");
    assert_eq!(row.report_type, ReportType::Repair);
}

#[test]
fn delete_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());

    let id = api.add_object(NewObject::new("Facility", "Depot")).unwrap();
    assert!(api.delete_object(&id).unwrap());
    assert!(api
        .get_objects(&ObjectFilter::default())
        .unwrap()
        .iter()
        .all(|o| o.object_id != id));
    assert!(!api.delete_object(&id).unwrap());
}

#[test]
fn status_update_leaves_other_columns_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());
    let id = api
        .add_object(NewObject::new("Vehicle", "Van").with_description("white, \"long\" wheelbase"))
        .unwrap();

    let before = fs::read_to_string(dir.path().join("objects.csv")).unwrap();
    api.update_object(&id, ObjectPatch::status(ObjectStatus::Inactive))
        .unwrap();
    let after = fs::read_to_string(dir.path().join("objects.csv")).unwrap();

    let cols = |text: &str| -> Vec<String> {
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let rec = rdr.records().next().unwrap().unwrap();
        rec.iter().map(str::to_string).collect()
    };
    let (b, a) = (cols(&before), cols(&after));
    // object_id, object_type, name, description, created_date
    for i in [0, 1, 2, 3, 5] {
        assert_eq!(a[i], b[i]);
    }
    assert_eq!(a[4], "Inactive");
}

#[test]
fn legacy_services_file_is_read_and_upgraded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("services.csv"),
        "service_id,object_id,object_type,service_name,description,interval_days,last_service_date,next_service_date,status,notes,created_date\n\
         SVC-00001,VEH-0001,Vehicles,Oil,,30.0,nan,2024-02-01 00:00:00,Scheduled,,2024-01-01 10:00:00\n",
    )
    .unwrap();
    let api = open(dir.path());

    let rows = api.get_services(&ServiceFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    let svc = &rows[0];
    assert_eq!(svc.object_type, "Vehicle");
    assert_eq!(svc.interval_days, 30);
    assert_eq!(svc.last_service_date, None);
    assert_eq!(svc.next_service_date.to_string(), "2024-02-01");
    assert_eq!(svc.expected_meter_reading, None);

    // Reading alone does not rewrite the file.
    let raw = fs::read_to_string(dir.path().join("services.csv")).unwrap();
    assert!(raw.contains("Vehicles"));

    api.update_service("SVC-00001", ServicePatch::status(ServiceStatus::Pending))
        .unwrap();
    let raw = fs::read_to_string(dir.path().join("services.csv")).unwrap();
    let header = raw.lines().next().unwrap();
    assert_eq!(header, ServiceRecord::COLUMNS.join(","));
    assert!(raw.contains("SVC-00001,VEH-0001,Vehicle,Oil,,30,,2024-02-01,Pending"));
}

#[test]
fn concurrent_creates_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());
    for name in ["A", "B", "C"] {
        api.add_object(NewObject::new("Vehicle", name)).unwrap();
    }

    let handles: Vec<_> = ["D", "E"]
        .into_iter()
        .map(|name| {
            let path = dir.path().to_path_buf();
            thread::spawn(move || open(&path).add_object(NewObject::new("Vehicle", name)).unwrap())
        })
        .collect();
    let new_ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_ne!(new_ids[0], new_ids[1]);
    let rows = api.get_objects(&ObjectFilter::default()).unwrap();
    assert_eq!(rows.len(), 5);
    let ids: HashSet<&str> = rows.iter().map(|o| o.object_id.as_str()).collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn many_writers_across_tables() {
    let dir = tempfile::tempdir().unwrap();
    let handles: Vec<_> = (0..6)
        .map(|t| {
            let path = dir.path().to_path_buf();
            thread::spawn(move || {
                let api = open(&path);
                for i in 0..5 {
                    if t % 2 == 0 {
                        api.add_object(NewObject::new("Facility", format!("site {}-{}", t, i)))
                            .unwrap();
                    } else {
                        api.add_service(NewService::new("FAC-0001", "Facility", "Sweep", 7))
                            .unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let api = open(dir.path());
    let objects = api.get_objects(&ObjectFilter::default()).unwrap();
    let services = api.get_services(&ServiceFilter::default()).unwrap();
    assert_eq!(objects.len(), 15);
    assert_eq!(services.len(), 15);
    let ids: HashSet<&str> = services.iter().map(|s| s.service_id.as_str()).collect();
    assert_eq!(ids.len(), 15);
}

#[test]
fn unlocked_reader_only_sees_whole_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("objects.csv");
    let small = object_rows(3);
    let large = object_rows(40);
    atomic::write_snapshot(&path, &small, false).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut reads = 0;
            while !done.load(Ordering::SeqCst) {
                let bytes = fs::read(&path).unwrap();
                let rows: Vec<ObjectRecord> = codec::decode(bytes.as_slice()).unwrap();
                assert!(
                    rows.len() == 3 || rows.len() == 40,
                    "reader saw {} rows",
                    rows.len()
                );
                reads += 1;
            }
            reads
        })
    };

    for i in 0..200 {
        let rows = if i % 2 == 0 { &large } else { &small };
        atomic::write_snapshot(&path, rows, false).unwrap();
    }
    done.store(true, Ordering::SeqCst);
    assert!(reader.join().unwrap() > 0);

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| atomic::is_temp_file(&e.file_name().to_string_lossy()))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn held_lock_times_out_with_distinct_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FsBackend::new(dir.path()).with_lock_timeout(Some(Duration::from_millis(50)));
    let api = UpkeepApi::new(backend.clone(), upkeep::config::UpkeepConfig::default());

    let _held = TableLock::acquire(&backend.table_path::<ObjectRecord>(), None).unwrap();
    let err = api.add_object(NewObject::new("Vehicle", "Blocked")).unwrap_err();
    assert!(matches!(err, UpkeepError::LockTimeout { .. }));

    // Other tables are unaffected.
    api.add_service(NewService::new("VEH-0001", "Vehicle", "Wash", 14))
        .unwrap();
}

#[test]
fn row_count_policy_from_config_reproduces_collision() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = upkeep::config::UpkeepConfig::default();
    config.id_policy = IdPolicy::RowCount;
    config.save(dir.path()).unwrap();

    let api = open(dir.path());
    for name in ["A", "B", "C"] {
        api.add_object(NewObject::new("Vehicle", name)).unwrap();
    }
    api.delete_object("VEH-0001").unwrap();
    let id = api.add_object(NewObject::new("Vehicle", "D")).unwrap();
    assert_eq!(id, "VEH-0003");
}

#[test]
fn photos_land_in_photo_dir() {
    let dir = tempfile::tempdir().unwrap();
    let api = open(dir.path());

    let path = api.save_photo("../../escape.jpg", b"jpeg-bytes").unwrap();
    assert!(path.starts_with(dir.path().join("fault_photos")));
    assert!(path.to_string_lossy().ends_with("_escape.jpg"));
    assert_eq!(fs::read(&path).unwrap(), b"jpeg-bytes");

    let id = api
        .add_fault_report(
            NewFaultReport::new("VEH-0001", "Vehicle")
                .with_photos(vec![path.to_string_lossy().to_string()]),
        )
        .unwrap();
    let fault = api.get_fault_report(&id).unwrap().unwrap();
    assert_eq!(fault.photo_paths, vec![path.to_string_lossy().to_string()]);
}

#[test]
fn migrate_and_export_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("objects.csv"),
        "object_id,object_type,name,description,status,created_date,last_updated\n\
         FAC-0001,facilities,Depot,,Active,2024-01-01 00:00:00,2024-01-01 00:00:00\n",
    )
    .unwrap();
    let api = open(dir.path());

    let report = api.migrate_object_types().unwrap();
    assert!(report.changed());
    assert!(report.tables[0].backup.exists());
    let raw = fs::read_to_string(dir.path().join("objects.csv")).unwrap();
    assert!(raw.contains("FAC-0001,Facility,Depot"));

    let out = tempfile::tempdir().unwrap();
    let archive = api.export(out.path()).unwrap();
    assert!(archive.exists());
    assert!(archive
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("upkeep-"));
}
