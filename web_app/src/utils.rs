//! Helper functions could be used in api/, front/, ...

use crate::config;
use anyhow::anyhow;
use argon2::Argon2;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;
use uuid::Uuid;

pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    let app_config = &*config::APP_CONFIG;
    if encrypted {
        return Ok(SqlitePool::connect_with(
            SqliteConnectOptions::from_str(&app_config.db_host)?
                .pragma("key", app_config.db_pass_encrypt.clone())
                .pragma("cipher_page_size", "1024")
                .pragma("kdf_iter", "64000")
                .pragma("cipher_hmac_algorithm", "HMAC_SHA1")
                .pragma("cipher_kdf_algorithm", "PBKDF2_HMAC_SHA1")
                .pragma("foreign_keys", "ON")
                .journal_mode(SqliteJournalMode::Delete),
        )
        .await?);
    }

    Ok(SqlitePool::connect_with(
        SqliteConnectOptions::from_str(&app_config.db_host)?.pragma("foreign_keys", "ON"),
    )
    .await?)
}

/// Derives a 32 bytes key from two uuids with Argon2
pub fn build_csrf_key(pwd: &str, salt: &str) -> anyhow::Result<[u8; 32]> {
    let mut csrf_key = [0u8; 32];
    Argon2::default()
        .hash_password_into(
            Uuid::from_str(pwd)?.as_bytes(),
            Uuid::from_str(salt)?.as_bytes(),
            &mut csrf_key,
        )
        .map_err(|err| anyhow!("csrf_key couldn't be created: {}", err))?;

    Ok(csrf_key)
}

pub fn build_random_csrf_key() -> anyhow::Result<[u8; 32]> {
    build_csrf_key(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_csrf_key_is_deterministic() {
        let pwd = "6f1c1b0e-3b1a-4c55-9a43-2f0f7f3c9b10";
        let salt = "0d7b7f5e-8e0c-4a3b-b0a4-5b8d1b9c2e11";

        let key = build_csrf_key(pwd, salt).unwrap();

        assert_eq!(key, build_csrf_key(pwd, salt).unwrap());
        assert_ne!(key, build_csrf_key(salt, pwd).unwrap());
        assert!(build_csrf_key("not-a-uuid", salt).is_err());
    }

    #[test]
    fn test_random_keys_differ() {
        assert_ne!(
            build_random_csrf_key().unwrap(),
            build_random_csrf_key().unwrap()
        );
    }
}
