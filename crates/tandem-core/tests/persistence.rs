use chrono::Utc;
use tandem_core::item::Context;
use tandem_core::storage::Storage;
use tandem_core::store::{CONTEXT_KEY, ITEMS_KEY, ToDoStore};
use tempfile::tempdir;

fn open_store(path: &std::path::Path) -> ToDoStore {
    let storage = Storage::open(path).expect("open storage");
    ToDoStore::load(storage)
}

#[test]
fn missing_keys_load_as_empty_work_list() {
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());

    assert!(store.is_empty());
    assert_eq!(store.context(), Context::Work);
}

#[test]
fn reload_round_trips_items_and_context() {
    let temp = tempdir().expect("tempdir");

    let mut store = open_store(temp.path());
    let report = store
        .add_item("write report", Context::Work, Utc::now())
        .expect("created");
    let passport = store
        .add_item("renew passport", Context::Travel, Utc::now())
        .expect("created");
    store.toggle_done(passport);
    store.set_context(Context::Travel);
    drop(store);

    let reloaded = open_store(temp.path());
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.context(), Context::Travel);

    let report_item = reloaded.get(report).expect("report present");
    assert_eq!(report_item.text, "write report");
    assert_eq!(report_item.context, Context::Work);
    assert!(!report_item.done);

    let passport_item = reloaded.get(passport).expect("passport present");
    assert_eq!(passport_item.text, "renew passport");
    assert_eq!(passport_item.context, Context::Travel);
    assert!(passport_item.done);
}

#[test]
fn context_flag_is_persisted_as_bare_boolean() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    let mut store = ToDoStore::load(storage.clone());
    store.set_context(Context::Travel);

    let raw = storage
        .read(CONTEXT_KEY)
        .expect("read context")
        .expect("context written");
    assert_eq!(raw, "false");
}

#[test]
fn legacy_bare_map_payload_still_loads() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(
            ITEMS_KEY,
            r#"{"1696099200000":{"text":"pack socks","working":false,"done":false}}"#,
        )
        .expect("seed legacy payload");

    let store = ToDoStore::load(storage);
    assert_eq!(store.len(), 1);

    let (_, item) = store
        .items_in(Context::Travel)
        .next()
        .expect("travel item present");
    assert_eq!(item.text, "pack socks");
}

#[test]
fn legacy_edit_text_field_is_recovered() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(
            ITEMS_KEY,
            r#"{"1696099200000":{"editText":"call the bank","working":true,"done":true}}"#,
        )
        .expect("seed legacy payload");

    let store = ToDoStore::load(storage);
    let (_, item) = store
        .items_in(Context::Work)
        .next()
        .expect("work item present");
    assert_eq!(item.text, "call the bank");
    assert!(item.done);
}

#[test]
fn writes_carry_the_versioned_envelope() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(
            ITEMS_KEY,
            r#"{"1696099200000":{"text":"pack socks","working":false,"done":false}}"#,
        )
        .expect("seed legacy payload");

    let mut store = ToDoStore::load(storage.clone());
    store
        .add_item("buy adapter", Context::Travel, Utc::now())
        .expect("created");

    let raw = storage
        .read(ITEMS_KEY)
        .expect("read items")
        .expect("items written");
    assert!(raw.contains("\"version\":1"));
    assert!(raw.contains("pack socks"));
    assert!(raw.contains("buy adapter"));
}

#[test]
fn malformed_items_payload_loads_as_empty_and_store_stays_usable() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(ITEMS_KEY, "definitely not json")
        .expect("seed bad payload");

    let mut store = ToDoStore::load(storage.clone());
    assert!(store.is_empty());

    store
        .add_item("start over", Context::Work, Utc::now())
        .expect("created");

    let reloaded = ToDoStore::load(storage);
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn unsupported_schema_version_loads_as_empty() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(ITEMS_KEY, r#"{"version":9,"items":{}}"#)
        .expect("seed future payload");

    let store = ToDoStore::load(storage);
    assert!(store.is_empty());
}

#[test]
fn malformed_context_payload_defaults_to_work() {
    let temp = tempdir().expect("tempdir");
    let storage = Storage::open(temp.path()).expect("open storage");

    storage
        .write(CONTEXT_KEY, "maybe")
        .expect("seed bad payload");

    let store = ToDoStore::load(storage);
    assert_eq!(store.context(), Context::Work);
}
