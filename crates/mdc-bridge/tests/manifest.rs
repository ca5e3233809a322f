//! Adapters built from a TOML manifest.

mod common;

use std::fs;

use mdc_bridge::{Bindings, Manifest, Props};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

use common::{
    constructor, handler_recorder, host, mount_recorder, update_recorder, Call, FakeNode,
    FakeWidget, Journal,
};

const WIDGETS: &str = r#"
[[widget]]
name = "menu"
constructor = "MDCMenu"
on_mount = "mounted"
on_update = "sync"

[widget.events]
"MDCMenu:selected" = "selected"
"MDCMenu:cancel" = "cancelled"

[widget.defaults]
open = false
"#;

fn bindings(journal: &Journal) -> Bindings<FakeWidget> {
    Bindings::new()
        .constructor("MDCMenu", constructor(journal))
        .handler("selected", handler_recorder(journal, "selected"))
        .handler("cancelled", handler_recorder(journal, "cancelled"))
        .mount_hook("mounted", mount_recorder(journal))
        .update_hook("sync", update_recorder(journal))
}

#[test]
fn manifest_adapter_drives_full_lifecycle() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("widgets.toml");
    fs::write(&path, WIDGETS).unwrap();

    let journal = Journal::new();
    let manifest = Manifest::load(&path).unwrap();
    let adapter = manifest.adapter("menu", &bindings(&journal)).unwrap();

    let mut instance = adapter
        .wrap(|_: &Props<FakeWidget>| ())
        .instantiate(Props::new(), host(Some(FakeNode(9))));
    instance.on_mount().unwrap();

    assert_eq!(instance.listener_count(), 2);
    assert_eq!(instance.props().value("open"), Some(&json!(false)));
    assert_eq!(
        journal.calls().last(),
        Some(&Call::Update {
            previous: None,
            next: json!({ "open": false }),
            widget: Some(1),
        })
    );

    journal.clear();
    instance
        .widget()
        .unwrap()
        .emit("MDCMenu:selected", json!({ "index": 2 }))
        .unwrap();
    assert_eq!(
        journal.calls(),
        vec![Call::Handled {
            event: "selected".to_string(),
            props: json!({ "open": false }),
            widget: Some(1),
        }]
    );

    journal.clear();
    instance.on_unmount();
    assert_eq!(journal.count(|c| matches!(c, Call::Unlisten { .. })), 2);
    assert_eq!(journal.calls().last(), Some(&Call::Destroy(1)));
}
