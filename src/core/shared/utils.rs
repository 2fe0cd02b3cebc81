use chrono::{NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "postgres")]
use diesel::{
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};

#[cfg(feature = "postgres")]
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

#[cfg(feature = "postgres")]
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

#[cfg(feature = "postgres")]
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS).map_err(
        |e| -> Box<dyn std::error::Error + Send + Sync> {
            Box::new(std::io::Error::other(format!("Migration error: {e}")))
        },
    )?;
    Ok(())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Deserializes blank form and query values as `None`.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}
