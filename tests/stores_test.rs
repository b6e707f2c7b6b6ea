use deep_research::client::ApiClient;
use deep_research::stores::{
    AuthStore, FileCookieJar, FileStorage, SettingStore, Settings, SettingsPatch,
};
use tempfile::TempDir;

#[test]
fn credential_survives_a_restart() {
    let tmp = TempDir::new().unwrap();

    let mut client = ApiClient::new("http://127.0.0.1:8787", "");
    let mut store = AuthStore::new(FileCookieJar::in_dir(tmp.path()));
    store.set_credential("abc123", &mut client).unwrap();

    // a new process starts unauthenticated until it checks the cookie
    let mut client = ApiClient::new("http://127.0.0.1:8787", "");
    let mut store = AuthStore::new(FileCookieJar::in_dir(tmp.path()));
    assert!(!store.is_authenticated());
    assert!(store.check_auth(&mut client));
    assert_eq!(client.api_key(), "abc123");

    store.logout().unwrap();
    let mut store = AuthStore::new(FileCookieJar::in_dir(tmp.path()));
    assert!(!store.check_auth(&mut client));
}

#[test]
fn settings_survive_a_restart() {
    let tmp = TempDir::new().unwrap();

    let mut store = SettingStore::load(FileStorage::new(tmp.path()));
    store
        .update(SettingsPatch {
            core_model: Some("gemini-1.5-pro".into()),
            wide: Some(10),
            ..Default::default()
        })
        .unwrap();
    assert!(tmp.path().join("setting.json").exists());

    let store = SettingStore::load(FileStorage::new(tmp.path()));
    assert_eq!(store.settings().core_model, "gemini-1.5-pro");
    assert_eq!(store.settings().wide, 10);
    assert_eq!(store.settings().depth, Settings::default().depth);
}

#[test]
fn stored_document_uses_camel_case_keys() {
    let tmp = TempDir::new().unwrap();
    let mut store = SettingStore::load(FileStorage::new(tmp.path()));
    store.reset().unwrap();

    let raw = std::fs::read_to_string(tmp.path().join("setting.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["coreModel"], "gemini-2.5-pro");
    assert_eq!(doc["thinkingBudget"], 2048);
    assert_eq!(doc["minWords"], 6000);
    assert_eq!(doc["modelList"].as_array().unwrap().len(), 5);
}
