
use aura_core::SettingsStore;
use aura_storage::{settings, Database};
use test_helpers::TestDb;

#[tokio::test]
async fn test_set_and_get_setting() {
    let db = Database::in_memory().await.unwrap();

    let value = serde_json::json!({ "enabled": true });
    settings::set_setting(db.pool(), "effects.spatial", &value)
        .await
        .unwrap();

    let result = settings::get_setting(db.pool(), "effects.spatial").await.unwrap();
    assert_eq!(result, Some(value));
}

#[tokio::test]
async fn test_get_non_existent_setting() {
    let db = Database::in_memory().await.unwrap();

    let result = settings::get_setting(db.pool(), "non_existent_key").await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_bass_strength_defaults_to_none() {
    let db = Database::in_memory().await.unwrap();
    assert_eq!(db.bass_strength().await.unwrap(), None);
}

#[tokio::test]
async fn test_bass_strength_round_trip_and_overwrite() {
    let db = Database::in_memory().await.unwrap();

    db.set_bass_strength(400).await.unwrap();
    assert_eq!(db.bass_strength().await.unwrap(), Some(400));

    db.set_bass_strength(1000).await.unwrap();
    assert_eq!(db.bass_strength().await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_bass_strength_rejects_out_of_range() {
    let db = Database::in_memory().await.unwrap();

    let result = settings::set_bass_strength(db.pool(), 1001).await;
    assert!(result.is_err());
    assert_eq!(db.bass_strength().await.unwrap(), None);
}

#[tokio::test]
async fn test_corrupt_bass_strength_is_ignored() {
    let db = Database::in_memory().await.unwrap();

    settings::set_setting(db.pool(), settings::SETTING_BASS_STRENGTH, &serde_json::json!("loud"))
        .await
        .unwrap();
    assert_eq!(db.bass_strength().await.unwrap(), None);

    settings::set_setting(db.pool(), settings::SETTING_BASS_STRENGTH, &serde_json::json!(5000))
        .await
        .unwrap();
    assert_eq!(db.bass_strength().await.unwrap(), None);
}

#[tokio::test]
async fn test_bass_strength_survives_restart() {
    let test_db = TestDb::new().await;
    test_db.db.set_bass_strength(400).await.unwrap();

    let reopened = test_db.reopen().await;
    assert_eq!(reopened.bass_strength().await.unwrap(), Some(400));
}
