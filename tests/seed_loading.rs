mod common;

use common::*;
use treasurehunt::config::Config;
use treasurehunt::hunt::{canonical_hunt_seed, CodeSource, HuntError, LocationStatus, View};

fn config_with_seed(path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.seed.locations_file = Some(path.to_str().unwrap().to_string());
    config
}

#[tokio::test(start_paused = true)]
async fn custom_seed_file_replaces_builtin_locations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locations.json");
    let mut custom = canonical_hunt_seed();
    custom.truncate(2);
    custom[0].qr_code = "LOBBY-01".to_string();
    std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

    let (mut session, _clock) = session_with_config(config_with_seed(&path));
    fill_registration(&mut session).unwrap();

    let state = session.state();
    assert_eq!(state.locations.len(), 2);
    assert_eq!(state.locations[0].status, LocationStatus::Available);

    session.open_location("food-court").unwrap();
    assert!(session
        .submit_code("food-court", "FOODCOURT001", CodeSource::Manual)
        .is_ok());
    assert_eq!(session.view(), &View::Scanner("food-court".to_string()));
    session
        .submit_code("food-court", "lobby-01", CodeSource::Manual)
        .unwrap();
    assert_eq!(session.view(), &View::Photo("food-court".to_string()));
}

#[tokio::test(start_paused = true)]
async fn invalid_seed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locations.json");
    let mut custom = canonical_hunt_seed();
    custom[1].id = custom[0].id.clone();
    std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

    let (mut session, _clock) = session_with_config(config_with_seed(&path));
    assert!(matches!(
        fill_registration(&mut session),
        Err(HuntError::InvalidSeed(_))
    ));
    let state = session.state();
    assert!(state.player.is_some());
    assert!(state.locations.is_empty());
    assert!(!state.is_loading);

    session.navigate("/dashboard");
    assert!(toast_messages(&session)
        .iter()
        .any(|m| m == "Could not load the hunt locations"));
}

#[tokio::test(start_paused = true)]
async fn missing_seed_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("none.json");
    let (mut session, _clock) = session_with_config(config_with_seed(&missing));
    assert!(matches!(
        fill_registration(&mut session),
        Err(HuntError::Io(_))
    ));
}
