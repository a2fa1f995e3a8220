
use aura_core::SettingsStore;
use test_helpers::TestDb;

async fn applied_versions(db: &aura_storage::Database) -> Vec<i64> {
    sqlx::query_scalar("SELECT version FROM _sqlx_migrations ORDER BY version")
        .fetch_all(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_migrations_are_tracked() {
    let test_db = TestDb::new().await;

    let versions = applied_versions(&test_db.db).await;
    assert_eq!(versions, vec![20250301000001, 20250301000002]);
}

#[tokio::test]
async fn test_reopen_applies_nothing_twice() {
    let test_db = TestDb::new().await;
    test_db.db.set_bass_strength(250).await.unwrap();

    let reopened = test_db.reopen().await;
    let again = test_db.reopen().await;

    assert_eq!(applied_versions(&again).await.len(), 2);
    assert_eq!(reopened.bass_strength().await.unwrap(), Some(250));
}
