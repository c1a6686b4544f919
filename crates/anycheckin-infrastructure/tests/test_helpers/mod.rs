#![allow(dead_code)]

use sqlx::SqlitePool;
use std::sync::Arc;

use anycheckin_domain::session::{encode_session, SessionInfo};
use anycheckin_infrastructure::persistence::Database;
use anycheckin_infrastructure::security::EncryptionService;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Migrated in-memory database plus the encryption service repositories use.
pub async fn setup_in_memory_db() -> (SqlitePool, Arc<EncryptionService>) {
    let db = Database::in_memory()
        .await
        .expect("In-memory database should open");
    db.run_migrations()
        .await
        .expect("Migrations should succeed");

    let encryption =
        Arc::new(EncryptionService::from_secret(TEST_SECRET).expect("Encryption key is valid"));

    (db.pool().clone(), encryption)
}

/// A well-formed session cookie value for `user_id`.
pub fn session_for(user_id: i64, username: &str) -> String {
    let info = SessionInfo {
        user_id,
        username: username.to_string(),
        role: 1,
        status: 1,
        group: "default".to_string(),
    };
    encode_session(&info, 1_700_000_000)
}

pub fn session_info(user_id: i64, username: &str) -> SessionInfo {
    SessionInfo {
        user_id,
        username: username.to_string(),
        role: 1,
        status: 1,
        group: "default".to_string(),
    }
}
