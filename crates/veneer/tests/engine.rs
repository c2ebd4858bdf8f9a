//! End-to-end behavior of the schema / view / sync pipeline

use pretty_assertions::assert_eq;
use std::sync::Arc;
use veneer::capability::Capability;
use veneer::document;
use veneer::document::Value;
use veneer::host::{self, MemoryHost};
use veneer::schema::Schema;
use veneer::sync::sync;
use veneer::view::{View, ViewError};

fn song_schema() -> Schema {
    Schema::compose(|root| {
        root.scalar("title");
        root.nested("band", |band| {
            band.scalar("name");
            band.nested("label", |label| {
                label.scalar("location");
            });
        });
    })
    .expect("schema must compose")
}

#[test]
fn an_absent_source_reads_null_at_every_depth() {
    let view = song_schema().materialize(None);

    assert_eq!(view.value("title").unwrap(), &Value::Null);

    let band = view.nested("band").unwrap();
    assert_eq!(band.value("name").unwrap(), &Value::Null);
    assert_eq!(
        band.nested("label").unwrap().value("location").unwrap(),
        &Value::Null
    );
}

#[test]
fn declared_keys_read_their_stored_values() {
    let stored = document! {
        "title" => "Corduroy",
        "band" => document! { "name" => "Pearl Jam" },
    };

    let view = song_schema().materialize(Some(&stored));

    assert_eq!(
        view.value("title").unwrap(),
        &Value::String("Corduroy".into())
    );
    assert_eq!(
        view.nested("band").unwrap().value("name").unwrap(),
        &Value::String("Pearl Jam".into())
    );
    // declared but absent keys still read as null
    let label = view.nested("band").unwrap().nested("label").unwrap();
    assert_eq!(label.value("location").unwrap(), &Value::Null);
}

#[test]
fn undeclared_keys_are_not_part_of_the_view() {
    let stored = document! { "artist" => document! {} };
    let view = song_schema().materialize(Some(&stored));

    assert!(matches!(
        view.get("artist").unwrap_err(),
        ViewError::UnknownProperty { .. }
    ));
}

#[test]
fn materialization_leaves_the_source_untouched() {
    let stored = document! { "title" => "Corduroy" };
    let before = stored.clone();

    let mut view = song_schema().materialize(Some(&stored));
    view.set("title", "Ten").unwrap();
    view.set_at(&["band", "name"], "Pearl Jam").unwrap();

    assert_eq!(stored, before);
}

#[test]
fn repeated_nested_reads_hand_out_the_same_view() {
    let view = song_schema().materialize(None);

    assert!(std::ptr::eq(
        view.nested("band").unwrap(),
        view.nested("band").unwrap()
    ));
}

#[test]
fn the_merged_document_contains_exactly_the_populated_paths() {
    let stored = document! { "artist" => document! {} };

    let mut view = song_schema().materialize(Some(&stored));
    view.set_at(&["band", "label", "location"], "San Francisco")
        .unwrap();

    let merged = sync(&view, Some(&stored));

    assert_eq!(
        merged,
        document! {
            "artist" => document! {},
            "band" => document! {
                "label" => document! { "location" => "San Francisco" },
            },
        }
    );
}

#[test]
fn null_slots_do_not_erase_stored_values() {
    let stored = document! {
        "title" => "Corduroy",
        "band" => document! { "name" => "Pearl Jam" },
    };

    // nothing is set; every slot the store populated stays as stored,
    // every null slot writes nothing
    let view = song_schema().materialize(Some(&stored));
    let merged = sync(&view, Some(&stored));

    assert_eq!(merged, stored);
}

#[test]
fn sync_does_not_mutate_its_inputs() {
    let stored = document! { "title" => "Old" };

    let mut view = song_schema().materialize(Some(&stored));
    view.set("title", "New").unwrap();

    let before = stored.clone();
    let _ = sync(&view, Some(&stored));

    assert_eq!(stored, before);
    assert_eq!(view.value("title").unwrap(), &Value::String("New".into()));
}

#[test]
fn syncing_twice_is_idempotent() {
    let mut view = song_schema().materialize(None);
    view.set("title", "Corduroy").unwrap();
    view.set_at(&["band", "name"], "Pearl Jam").unwrap();

    let once = sync(&view, None);
    let twice = sync(&view, Some(&once));

    assert_eq!(once, twice);
}

#[test]
fn round_trip_through_a_host() {
    let schema = song_schema();
    let mut host = MemoryHost::new();

    let mut view = host::load(&schema, &host, "content").unwrap();
    view.set_at(&["band", "label", "location"], "San Francisco")
        .unwrap();
    let merged = host::store(&view, &mut host, "content").unwrap();

    assert_eq!(
        merged,
        document! {
            "band" => document! {
                "label" => document! { "location" => "San Francisco" },
            },
        }
    );

    // a fresh view over the stored attribute reads the value back
    let reread = host::load(&schema, &host, "content").unwrap();
    assert_eq!(
        reread
            .nested("band")
            .unwrap()
            .nested("label")
            .unwrap()
            .value("location")
            .unwrap(),
        &Value::String("San Francisco".into())
    );
}

#[test]
fn loading_leaves_the_host_attribute_untouched() {
    let schema = song_schema();
    let mut host = MemoryHost::new();
    host.seed("content", document! { "title" => "Corduroy" });

    let mut view = host::load(&schema, &host, "content").unwrap();
    assert_eq!(
        view.value("title").unwrap(),
        &Value::String("Corduroy".into())
    );
    view.set("title", "Ten").unwrap();

    // the view is a copy; the attribute only changes on store
    assert_eq!(
        host.attribute("content"),
        Some(&Value::Document(document! { "title" => "Corduroy" }))
    );
}

#[test]
fn store_rereads_so_late_host_writes_survive() {
    let schema = song_schema();
    let mut host = MemoryHost::new();
    host.seed("content", document! { "title" => "Old" });

    let mut view = host::load(&schema, &host, "content").unwrap();
    view.set_at(&["band", "name"], "Pearl Jam").unwrap();

    // another writer updates the attribute while the view is held
    host.seed(
        "content",
        document! { "title" => "Old", "plays" => 7 },
    );

    let merged = host::store(&view, &mut host, "content").unwrap();

    assert_eq!(merged.get("plays"), Some(&Value::Integer(7)));
    assert_eq!(merged.get("title"), Some(&Value::String("Old".into())));
}

struct Stamp;

impl Capability for Stamp {
    fn name(&self) -> &str {
        "stamp"
    }

    fn invoke(&self, operation: &str, _view: &View) -> Option<Value> {
        (operation == "stamp").then(|| Value::String("1224".into()))
    }
}

struct OverrideStamp;

impl Capability for OverrideStamp {
    fn name(&self) -> &str {
        "override-stamp"
    }

    fn invoke(&self, operation: &str, _view: &View) -> Option<Value> {
        (operation == "stamp").then(|| Value::String("4221".into()))
    }
}

#[test]
fn features_reach_every_nested_view() {
    let schema = Schema::compose(|root| {
        root.feature(Arc::new(Stamp));
        root.scalar("title");
        root.nested("band", |band| {
            band.scalar("name");
            band.nested("label", |label| {
                label.scalar("location");
            });
        });
    })
    .unwrap();

    let view = schema.materialize(None);
    let label = view.nested("band").unwrap().nested("label").unwrap();

    assert_eq!(view.invoke("stamp").unwrap(), Value::String("1224".into()));
    assert_eq!(label.invoke("stamp").unwrap(), Value::String("1224".into()));
    assert_eq!(label.capability_names(), vec!["stamp"]);
}

#[test]
fn locally_declared_features_win_on_operation_clashes() {
    let schema = Schema::compose(|root| {
        root.feature(Arc::new(Stamp));
        root.nested("band", |band| {
            band.feature(Arc::new(OverrideStamp));
            band.scalar("name");
        });
    })
    .unwrap();

    let view = schema.materialize(None);

    assert_eq!(view.invoke("stamp").unwrap(), Value::String("1224".into()));
    assert_eq!(
        view.nested("band").unwrap().invoke("stamp").unwrap(),
        Value::String("4221".into())
    );
    // the inherited bundle is layered underneath, not evicted
    assert_eq!(
        view.nested("band").unwrap().capability_names(),
        vec!["override-stamp", "stamp"]
    );
}

#[test]
fn embedded_schemas_pick_up_site_features_per_attachment() {
    let label = Schema::compose(|root| root.scalar("location")).unwrap();

    let stamped = Schema::compose(|root| {
        root.feature(Arc::new(Stamp));
        root.embed("label", &label);
    })
    .unwrap();

    let plain = Schema::compose(|root| {
        root.embed("label", &label);
    })
    .unwrap();

    let stamped_view = stamped.materialize(None);
    assert_eq!(
        stamped_view.nested("label").unwrap().invoke("stamp").unwrap(),
        Value::String("1224".into())
    );

    // the shared source schema and its other sites stay untouched
    let plain_view = plain.materialize(None);
    assert_eq!(
        plain_view.nested("label").unwrap().invoke("stamp").unwrap_err(),
        ViewError::UnknownOperation {
            name: "stamp".to_owned(),
        }
    );
    assert!(label.materialize(None).invoke("stamp").is_err());
}

#[test]
fn one_schema_serves_many_threads() {
    let schema = song_schema();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let schema = schema.clone();
            std::thread::spawn(move || {
                let mut view = schema.materialize(None);
                view.set_at(&["band", "name"], "Pearl Jam").unwrap();
                sync(&view, None)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            document! { "band" => document! { "name" => "Pearl Jam" } }
        );
    }
}
