use crate::config;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::{path::Path, str::FromStr};

pub async fn run_migrations(db_pool: &sqlx::SqlitePool, file_name: &str) -> anyhow::Result<()> {
    let mut tera = tera::Tera::new("../migrations/**/*.sql")?;
    tera.autoescape_on(vec![".sql"]);

    let create_tables_query = tera.render(file_name, &tera::Context::new())?;

    sqlx::query(&create_tables_query).execute(db_pool).await?;
    Ok(())
}

/// `base_url` joined with the file name of `image`, ignoring its folders.
pub fn image_url_for(base_url: &str, image: &str) -> Option<String> {
    let file_name = Path::new(image).file_name()?.to_str()?;
    Some(format!("{base_url}{file_name}"))
}

/// Sets `image_url` on every product that has an image but no url yet.
/// Returns how many products were updated.
pub async fn update_image_urls(db_pool: &SqlitePool, base_url: &str) -> anyhow::Result<u64> {
    let products = sqlx::query(
        "SELECT id,name,image FROM product WHERE image IS NOT NULL AND image != '' AND (image_url IS NULL OR image_url = '');",
    )
    .fetch_all(db_pool)
    .await?;

    let mut updated = 0;
    for row in products {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let image: String = row.try_get("image")?;

        let Some(image_url) = image_url_for(base_url, &image) else {
            eprintln!("Skipped {name}: no file name in {image}");
            continue;
        };

        sqlx::query("UPDATE product SET image_url=$1 WHERE id=$2;")
            .bind(&image_url)
            .bind(id)
            .execute(db_pool)
            .await?;

        println!("Updated {name}: {image_url}");
        updated += 1;
    }

    Ok(updated)
}

pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    if encrypted {
        return Ok(SqlitePool::connect_with(
            SqliteConnectOptions::from_str(&config::APP_CONFIG.db_host)?
                .pragma("key", &config::APP_CONFIG.db_pass_encrypt)
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
        SqliteConnectOptions::from_str(&config::APP_CONFIG.db_host)?.pragma("foreign_keys", "ON"),
    )
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_for_uses_basename() {
        assert_eq!(
            image_url_for("https://cdn.example.com/v1/", "media/products/red-shirt.jpg"),
            Some("https://cdn.example.com/v1/red-shirt.jpg".to_string())
        );
        assert_eq!(
            image_url_for("https://cdn.example.com/", "plain.png"),
            Some("https://cdn.example.com/plain.png".to_string())
        );
        assert_eq!(image_url_for("https://cdn.example.com/", ""), None);
    }
}
