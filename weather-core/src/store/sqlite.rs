use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{
    FromRow,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tracing::info;

use super::{RecordStore, StoreError};
use crate::model::{StoredObservation, WeatherObservation};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weather_observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    location VARCHAR(100) NOT NULL,
    country VARCHAR(100) NOT NULL,
    temperature_c TEXT NOT NULL,
    temperature_f TEXT NOT NULL,
    description VARCHAR(200) NOT NULL,
    icon VARCHAR(100) NOT NULL
)
"#;

/// SQLite-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct ObservationRow {
    id: i64,
    location: String,
    country: String,
    temperature_c: String,
    temperature_f: String,
    description: String,
    icon: String,
}

impl TryFrom<ObservationRow> for StoredObservation {
    type Error = StoreError;

    fn try_from(row: ObservationRow) -> Result<Self, Self::Error> {
        let decimal = |raw: &str| {
            Decimal::from_str(raw).map_err(|err| StoreError::Corrupt {
                id: row.id,
                detail: format!("invalid decimal '{raw}': {err}"),
            })
        };

        let temperature_celsius = decimal(&row.temperature_c)?;
        let temperature_fahrenheit = decimal(&row.temperature_f)?;

        Ok(StoredObservation {
            id: row.id,
            observation: WeatherObservation {
                location: row.location,
                country: row.country,
                temperature_celsius,
                temperature_fahrenheit,
                description: row.description,
                icon_url: row.icon,
            },
        })
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Each connection to an in-memory database gets its own empty database,
        // so keep exactly one alive for the lifetime of the pool.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
        };

        let store = Self { pool };
        store.ensure_schema().await?;
        info!(url, "connected to observation store");
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, observation: WeatherObservation) -> Result<StoredObservation, StoreError> {
        let id = sqlx::query(
            "INSERT INTO weather_observations \
             (location, country, temperature_c, temperature_f, description, icon) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&observation.location)
        .bind(&observation.country)
        .bind(observation.temperature_celsius.to_string())
        .bind(observation.temperature_fahrenheit.to_string())
        .bind(&observation.description)
        .bind(&observation.icon_url)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(StoredObservation { id, observation })
    }

    async fn get(&self, id: i64) -> Result<Option<StoredObservation>, StoreError> {
        let row = sqlx::query_as::<_, ObservationRow>(
            "SELECT id, location, country, temperature_c, temperature_f, description, icon \
             FROM weather_observations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredObservation::try_from).transpose()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weather_observations")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(location: &str, celsius: &str) -> WeatherObservation {
        WeatherObservation {
            location: location.to_string(),
            country: "France".to_string(),
            temperature_celsius: Decimal::from_str(celsius).unwrap(),
            temperature_fahrenheit: Decimal::from_str("65.30").unwrap(),
            description: "Clear".to_string(),
            icon_url: "//icon.url/1.png".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        let first = store.insert(observation("Paris", "18.50")).await.unwrap();
        let second = store.insert(observation("Paris", "18.50")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn get_round_trips_stored_fields() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        let stored = store.insert(observation("Lyon", "-4.05")).await.unwrap();
        let fetched = store.get(stored.id).await.unwrap().expect("row must exist");

        assert_eq!(fetched, stored);
        assert_eq!(fetched.observation.temperature_celsius.to_string(), "-4.05");
        assert_eq!(fetched.observation.temperature_fahrenheit.to_string(), "65.30");
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        assert!(store.get(42).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_decimal_is_reported() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            "INSERT INTO weather_observations \
             (location, country, temperature_c, temperature_f, description, icon) \
             VALUES ('x', 'y', 'warm', '1.00', 'z', 'i')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.get(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { id: 1, .. }));
    }
}
