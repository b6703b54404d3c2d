mod catalog_repo;
mod category_repo;
mod collection_repo;
mod error;
mod page_repo;
pub mod reconcile;
mod user_repo;

pub use catalog_repo::CatalogRepository;
pub use category_repo::{CategoryRepository, SubcategoryPolicy};
pub use collection_repo::CollectionRepository;
pub use error::StoreError;
pub use page_repo::PageRepository;
pub use reconcile::ReconcileReport;
pub use user_repo::{UserRecord, UserRepository};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(parent.to_path_buf(), e))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Serializes a nested payload for a JSON text column.
pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!("Failed to serialize JSON column, storing []: {}", e);
        "[]".to_string()
    })
}

/// Reads a JSON text column back, falling back to the empty value.
pub(crate) fn from_json<T: DeserializeOwned + Default>(text: &str) -> T {
    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::warn!("Unreadable JSON column {:?}, using empty value: {}", text, e);
        T::default()
    })
}

pub(crate) fn parse_timestamp(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let pool = init_db(&db_path).await.unwrap();

        // Verify tables exist
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for expected in [
            "about_page",
            "auth_users",
            "bathroom_sections",
            "catalog_banner",
            "catalog_filters",
            "catalog_products",
            "categories",
            "collection_previews",
            "collection_sections",
            "collections",
            "image_slides",
            "kitchen_sections",
            "main_sections",
            "sub_categories",
        ] {
            assert!(table_names.contains(&expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_init_db_is_reopenable() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = init_db(&db_path).await.unwrap();
        pool.close().await;

        assert!(init_db(&db_path).await.is_ok());
    }

    #[test]
    fn test_from_json_falls_back_to_default() {
        let images: Vec<String> = from_json("not json");
        assert!(images.is_empty());

        let images: Vec<String> = from_json(&to_json(&vec!["a.jpg".to_string()]));
        assert_eq!(images, vec!["a.jpg"]);
    }

    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_from_json_fallback_is_logged() {
        let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogBuffer(writer.clone()))
            .with_ansi(false)
            .finish();

        let images: Vec<String> =
            tracing::subscriber::with_default(subscriber, || from_json("[\"a.jpg\""));

        assert!(images.is_empty());
        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Unreadable JSON column"));
    }
}
