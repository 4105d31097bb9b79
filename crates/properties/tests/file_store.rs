use interceptor::{
    ConfigurationProvider, PropertyStore, Settings, StoreError, KEY_TOKEN, KEY_URL,
};
use properties::{FilePropertyStore, PROPERTIES_FILE_NAME};

#[test]
fn missing_file_is_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilePropertyStore::open(dir.path()).unwrap();

    assert_eq!(store.get_property(KEY_URL).unwrap(), None);
    assert!(!store.path().exists());
}

#[test]
fn written_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FilePropertyStore::open(dir.path()).unwrap();
        store.set_property(KEY_URL, "http://hooks.example.com/in").unwrap();
    }

    let reopened = FilePropertyStore::open(dir.path()).unwrap();
    assert_eq!(
        reopened.get_property(KEY_URL).unwrap().as_deref(),
        Some("http://hooks.example.com/in")
    );
}

#[test]
fn generated_token_is_stable_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    let first = {
        let store = FilePropertyStore::open(dir.path()).unwrap();
        Settings::load(&ConfigurationProvider::new(&store))
    };
    let second = {
        let store = FilePropertyStore::open(dir.path()).unwrap();
        Settings::load(&ConfigurationProvider::new(&store))
    };

    assert_eq!(first.token, second.token);
    assert_eq!(first, second);

    let text = std::fs::read_to_string(dir.path().join(PROPERTIES_FILE_NAME)).unwrap();
    assert!(text.contains(KEY_TOKEN));
}

#[test]
fn hand_edited_file_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(PROPERTIES_FILE_NAME),
        "debug = true\nsend_body = false\nurl = \"http://edited\"\ntoken = \"t\"\n",
    )
    .unwrap();

    let store = FilePropertyStore::open(dir.path()).unwrap();
    let settings = Settings::load(&ConfigurationProvider::new(&store));

    assert!(settings.debug);
    assert!(!settings.send_body);
    assert_eq!(settings.url, "http://edited");
    assert_eq!(settings.token, "t");
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(PROPERTIES_FILE_NAME), "url = [").unwrap();

    let err = FilePropertyStore::open(dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}
