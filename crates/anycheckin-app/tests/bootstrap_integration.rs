use anycheckin_infrastructure::config::AppConfig;
use anycheckin_lib::presentation::bootstrap::build_app_state;

#[tokio::test]
async fn test_build_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("anycheckin.db");
    let config_path = dir.path().join("anycheckin.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\npath = {:?}\n\n[security]\nsecret = \"a passphrase\"\n\n[scheduler]\nutc_offset = \"+08:00\"\n",
            db_path.to_string_lossy()
        ),
    )
    .unwrap();

    let config = AppConfig::load(&config_path).unwrap();
    let state = build_app_state(&config).await.unwrap();

    assert!(db_path.exists());
    assert!(state.services.account.list().await.unwrap().is_empty());
    assert!(state.services.task.list().await.unwrap().is_empty());
    assert_eq!(state.services.scheduler.start().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_secret_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.database.path = dir.path().join("anycheckin.db");

    assert!(build_app_state(&config).await.is_err());
}
