use reportd::orchestration::error::OrchestratorError;
use reportd::orchestration::report_store::{ReportRecord, ReportStatus, ReportStore};
use reportd::runtime::StatePaths;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn record(slug: &str) -> ReportRecord {
    ReportRecord::processing(slug, format!("{slug} title"), "intro", false)
}

#[test]
fn report_store_module_registers_processing_records() {
    let dir = tempdir().expect("tempdir");
    let store = ReportStore::open(&StatePaths::new(dir.path()));

    store.register(record("survey")).expect("register");

    let listed = store.list(false);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slug, "survey");
    assert_eq!(listed[0].status, ReportStatus::Processing);
    assert!(listed[0].is_public);

    let raw = fs::read_to_string(store.path()).expect("read registry");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("registry json");
    assert_eq!(value["survey"]["status"], "processing");
    assert_eq!(value["survey"]["title"], "survey title");
}

#[test]
fn report_store_module_rejects_duplicate_slugs() {
    let dir = tempdir().expect("tempdir");
    let store = ReportStore::open(&StatePaths::new(dir.path()));
    store.register(record("survey")).expect("register");

    let err = store.register(record("survey")).expect_err("duplicate");
    assert!(matches!(err, OrchestratorError::DuplicateKey { ref slug } if slug == "survey"));
    assert!(err.is_client_error());
}

#[test]
fn report_store_module_soft_delete_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let store = ReportStore::open(&StatePaths::new(dir.path()));
    store.register(record("survey")).expect("register");

    store
        .set_status("survey", ReportStatus::Deleted)
        .expect("first delete");
    store
        .set_status("survey", ReportStatus::Deleted)
        .expect("second delete");

    assert!(store.list(false).is_empty());
    let all = store.list(true);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, ReportStatus::Deleted);
}

#[test]
fn report_store_module_unknown_slug_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let store = ReportStore::open(&StatePaths::new(dir.path()));

    let err = store
        .set_status("missing", ReportStatus::Ready)
        .expect_err("missing slug");
    assert!(matches!(err, OrchestratorError::NotFound { .. }));
    assert!(store.toggle_visibility("missing").is_err());
    assert!(store.get("missing").is_none());
}

#[test]
fn report_store_module_toggle_visibility_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = ReportStore::open(&StatePaths::new(dir.path()));
    store.register(record("survey")).expect("register");

    assert!(!store.toggle_visibility("survey").expect("first toggle"));
    assert!(store.toggle_visibility("survey").expect("second toggle"));
    assert!(store.get("survey").expect("record").is_public);
}

#[test]
fn report_store_module_sees_writes_from_another_handle() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    let first = ReportStore::open(&paths);
    let second = ReportStore::open(&paths);

    first.register(record("a")).expect("register a");
    second.register(record("b")).expect("register b");
    first
        .set_status("b", ReportStatus::Ready)
        .expect("status via first");

    let reopened = ReportStore::open(&paths);
    let slugs = reopened
        .list(false)
        .into_iter()
        .map(|r| (r.slug, r.status))
        .collect::<Vec<_>>();
    assert_eq!(
        slugs,
        vec![
            ("a".to_string(), ReportStatus::Processing),
            ("b".to_string(), ReportStatus::Ready)
        ]
    );
}

#[test]
fn report_store_module_concurrent_writers_do_not_lose_updates() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    let store = Arc::new(ReportStore::open(&paths));
    for i in 0..16 {
        store.register(record(&format!("report-{i}"))).expect("register");
    }

    let workers = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let slug = format!("report-{i}");
                let status = if i % 2 == 0 {
                    ReportStatus::Ready
                } else {
                    ReportStatus::Error
                };
                store.set_status(&slug, status).expect("set status");
                store.toggle_visibility(&slug).expect("toggle");
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().expect("worker");
    }

    let reopened = ReportStore::open(&paths);
    let records = reopened.list(true);
    assert_eq!(records.len(), 16);
    for record in records {
        let index: usize = record
            .slug
            .trim_start_matches("report-")
            .parse()
            .expect("index");
        let expected = if index % 2 == 0 {
            ReportStatus::Ready
        } else {
            ReportStatus::Error
        };
        assert_eq!(record.status, expected, "{}", record.slug);
        assert!(!record.is_public, "{}", record.slug);
    }
}

#[test]
fn report_store_module_corrupt_registry_reads_as_empty_and_is_preserved() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    fs::write(paths.report_status_path(), "{\"survey\": {").expect("write corrupt");

    let store = ReportStore::open(&paths);
    assert!(store.list(true).is_empty());

    let preserved = dir.path().join("report_status.json.corrupt");
    assert_eq!(
        fs::read_to_string(preserved).expect("preserved copy"),
        "{\"survey\": {"
    );

    store.register(record("fresh")).expect("register after corruption");
    assert_eq!(store.list(false).len(), 1);
}

#[test]
fn report_store_module_unreadable_registry_fails_mutations_without_overwriting() {
    let dir = tempdir().expect("tempdir");
    let paths = StatePaths::new(dir.path());
    fs::create_dir_all(paths.report_status_path()).expect("registry path as directory");
    let store = ReportStore::open(&paths);

    let err = store.register(record("survey")).expect_err("unreadable registry");
    assert!(matches!(err, OrchestratorError::Io { .. }));
    assert!(!err.is_client_error());
    let err = store
        .set_status("survey", ReportStatus::Ready)
        .expect_err("unreadable registry");
    assert!(matches!(err, OrchestratorError::Io { .. }));
    assert!(matches!(
        store.toggle_visibility("survey"),
        Err(OrchestratorError::Io { .. })
    ));
    assert!(matches!(store.flush(), Err(OrchestratorError::Io { .. })));

    assert!(store.list(true).is_empty());
    assert!(store.get("survey").is_none());
    assert!(paths.report_status_path().is_dir());
    let leftovers = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".tmp"))
        .collect::<Vec<_>>();
    assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");

    let log = fs::read_to_string(paths.runtime_log_path()).expect("runtime log");
    assert!(log.contains("report_store.read_failed"));
}
