use std::fs;

use subpanel::interfaces::{NodeRepository, SiteConfig, UserRepository};
use subpanel::models::AppState;
use subpanel::settings::{Settings, SettingsError};
use subpanel::store::FileStore;
use tempfile::tempdir;

#[test]
fn test_missing_settings_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let settings = Settings::load_from_file(dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.update_interval_hours(), 24);
}

#[test]
fn test_settings_from_toml_and_yaml_files() {
    let dir = tempdir().unwrap();

    let toml_path = dir.path().join("subpanel.toml");
    fs::write(
        &toml_path,
        "site_name = \"Edge\"\nsite_url = \"https://edge.example.com\"\nupdate_interval_hours = 12\n",
    )
    .unwrap();
    let settings = Settings::load_from_file(&toml_path).unwrap();
    assert_eq!(settings.site_name(), "Edge");
    assert_eq!(settings.site_url(), Some("https://edge.example.com"));
    assert_eq!(settings.update_interval_hours(), 12);

    let yaml_path = dir.path().join("subpanel.yml");
    fs::write(&yaml_path, "listen_port: 9000\ndata_path: /srv/data.json\n").unwrap();
    let settings = Settings::load_from_file(&yaml_path).unwrap();
    assert_eq!(settings.listen_port, 9000);
    assert_eq!(settings.data_path, "/srv/data.json");
}

#[test]
fn test_broken_settings_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("subpanel.toml");
    fs::write(&path, "listen_port = \"not a number\"\n").unwrap();
    assert!(matches!(
        Settings::load_from_file(&path),
        Err(SettingsError::Toml(_))
    ));
}

#[test]
fn test_store_file_feeds_app_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    fs::write(
        &path,
        r#"{
            "users": [{"id": 7, "token": "tok", "passwd": "pw", "transfer_enable": 5}],
            "nodes": [
                {"id": 1, "name": "HK-1", "type": "trojan", "server": "hk.example.com"},
                {"id": 2, "name": "SG-1", "type": "ss", "server": "sg.example.com",
                 "raw_config": "{\"config\": {\"cipher\": \"aes-128-gcm\"}}"}
            ],
            "access": {"7": [2]}
        }"#,
    )
    .unwrap();

    let store = FileStore::load(&path).unwrap();
    assert_eq!(store.data().nodes.len(), 2);
    let state = AppState::new(Settings::default(), store);
    let ctx = state.context();
    let user = ctx.users.find_by_token("tok").unwrap().unwrap();
    assert_eq!(user.transfer_enable, 5);
    let nodes = ctx.nodes.accessible_nodes(user.id).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "SG-1");
}

#[test]
fn test_missing_store_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(FileStore::load(dir.path().join("data.yaml")).is_err());
}
