use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info, instrument};

const MAX_CONNECTIONS: u32 = 5;

/// Opens a pool for `database_url`. An in-memory database lives inside a
/// single connection, so such pools are pinned to one connection that is
/// never recycled.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    let pool = options.connect(database_url).await?;
    info!(database_url = %database_url, "Database pool created");
    Ok(pool)
}

/// Creates the tables if they do not exist yet. Username uniqueness is a
/// table constraint so concurrent registrations cannot both land.
#[instrument(skip(pool))]
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            owner_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_owner_id ON notes (owner_id, id)")
        .execute(pool)
        .await?;

    debug!("Schema ready");
    Ok(())
}
