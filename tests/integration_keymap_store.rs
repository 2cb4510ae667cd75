use std::sync::Arc;
use std::time::Instant;

use assert_matches::assert_matches;
use layertype::{
    api::KeymapApi,
    auth::Identity,
    editor::{KeymapEditorSession, Notice},
    error::{ApiError, Error},
    keymap::{KeyPosition, Keymaps, Layer},
    store::{KeymapStore, LocalKeymapApi},
};
use tempfile::tempdir;

fn identity(subject: &str, email: &str) -> Identity {
    Identity {
        subject: subject.into(),
        email: email.into(),
        name: Some("Tester".into()),
    }
}

#[test]
fn keymaps_survive_reopening_the_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("keymaps.db");

    {
        let store = KeymapStore::open(&path).unwrap();
        let user = store
            .find_or_create_user(&identity("g-1", "a@example.com"))
            .unwrap();
        let mut keymaps = Keymaps::new();
        keymaps.assign(Layer::new(2).unwrap(), KeyPosition::new("r0c1"), "あ");
        keymaps.assign(Layer::BASE, KeyPosition::new("r1c1"), "λ");
        assert_eq!(store.bulk_upsert(user, &keymaps).unwrap(), 2);
    }

    let store = KeymapStore::open(&path).unwrap();
    let user = store
        .find_or_create_user(&identity("g-1", "a@example.com"))
        .unwrap();
    let loaded = store.load_keymaps(user).unwrap();
    assert_eq!(loaded.get(Layer::new(2).unwrap(), "r0c1"), Some("あ"));
    assert_eq!(loaded.get(Layer::BASE, "r1c1"), Some("λ"));
    assert_eq!(loaded.len(), 2);
}

#[test]
fn invalid_entry_rolls_back_the_whole_save() {
    let dir = tempdir().unwrap();
    let store = KeymapStore::open(dir.path().join("keymaps.db")).unwrap();
    let user = store
        .find_or_create_user(&identity("g-1", "a@example.com"))
        .unwrap();

    let mut first = Keymaps::new();
    first.assign(Layer::BASE, KeyPosition::new("r0c1"), "q");
    store.bulk_upsert(user, &first).unwrap();

    let mut bad = Keymaps::new();
    bad.assign(Layer::BASE, KeyPosition::new("r0c1"), "Q");
    bad.assign(Layer::new(5).unwrap(), KeyPosition::new("r0c2"), "x".repeat(21));

    assert_matches!(
        store.bulk_upsert(user, &bad),
        Err(Error::CharacterTooLong { len: 21 })
    );
    let loaded = store.load_keymaps(user).unwrap();
    assert_eq!(loaded.get(Layer::BASE, "r0c1"), Some("q"));
    assert!(loaded.layer(Layer::new(5).unwrap()).is_empty());
}

#[test]
fn upsert_overwrites_and_skips_blank() {
    let store = KeymapStore::open_in_memory().unwrap();
    let user = store
        .find_or_create_user(&identity("g-1", "a@example.com"))
        .unwrap();

    let mut keymaps = Keymaps::new();
    keymaps.assign(Layer::new(1).unwrap(), KeyPosition::new("r0c1"), "1");
    store.bulk_upsert(user, &keymaps).unwrap();

    keymaps.assign(Layer::new(1).unwrap(), KeyPosition::new("r0c1"), "!");
    keymaps.assign(Layer::new(1).unwrap(), KeyPosition::new("r0c2"), "   ");
    assert_eq!(store.bulk_upsert(user, &keymaps).unwrap(), 1);

    let layer = store.for_user_layer(user, Layer::new(1).unwrap()).unwrap();
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.get("r0c1").map(String::as_str), Some("!"));
}

#[test]
fn users_do_not_see_each_other() {
    let store = Arc::new(KeymapStore::open_in_memory().unwrap());
    let alice = store
        .find_or_create_user(&identity("g-a", "alice@example.com"))
        .unwrap();
    let bob = store
        .find_or_create_user(&identity("g-b", "bob@example.com"))
        .unwrap();
    assert_ne!(alice, bob);

    let alice_api = LocalKeymapApi::new(store.clone(), alice);
    let bob_api = LocalKeymapApi::new(store.clone(), bob);

    let mut keymaps = Keymaps::new();
    keymaps.assign(Layer::BASE, KeyPosition::new("r0c1"), "a");
    alice_api.save(&keymaps).unwrap();

    assert_eq!(alice_api.load().unwrap().len(), 1);
    assert!(bob_api.load().unwrap().is_empty());
}

#[test]
fn editor_round_trip_through_local_store() {
    let store = Arc::new(KeymapStore::open_in_memory().unwrap());
    let user = store
        .find_or_create_user(&identity("g-1", "a@example.com"))
        .unwrap();
    let api = LocalKeymapApi::new(store, user);

    let mut editor = KeymapEditorSession::new(api.load().unwrap());
    editor.switch_layer_index(3).unwrap();
    editor.select_key(KeyPosition::new("r2c3"));
    editor.assign_character("→").unwrap();
    assert!(editor.save_all(&api, Instant::now()));
    assert_eq!(
        editor.notice(),
        Some(&Notice::Saved("Saved 1 key assignments".into()))
    );

    let reloaded = KeymapEditorSession::new(api.load().unwrap());
    assert_eq!(
        reloaded.keymaps().get(Layer::new(3).unwrap(), "r2c3"),
        Some("→")
    );
}

#[test]
fn validation_failure_reads_as_unprocessable() {
    let store = Arc::new(KeymapStore::open_in_memory().unwrap());
    let user = store
        .find_or_create_user(&identity("g-1", "a@example.com"))
        .unwrap();
    let api = LocalKeymapApi::new(store, user);

    let mut keymaps = Keymaps::new();
    keymaps.assign(Layer::BASE, KeyPosition::new("r0c1"), "y".repeat(25));

    assert_matches!(
        api.save(&keymaps),
        Err(ApiError::Rejected { status: 422, .. })
    );
}
