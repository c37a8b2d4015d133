use sqlx::PgPool;

/// Name of the media table for a table prefix.
pub fn media_table(prefix: &str) -> String {
    format!("{prefix}media")
}

/// Create the media table and its indexes if they do not already exist.
pub async fn run_migrations(pool: &PgPool, prefix: &str) -> Result<(), sqlx::Error> {
    let table = media_table(prefix);

    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id            TEXT PRIMARY KEY,
            filename      TEXT NOT NULL UNIQUE,
            original_name TEXT NOT NULL,
            mimetype      TEXT NOT NULL,
            size          BIGINT NOT NULL,
            storage       JSONB NOT NULL,
            uploader      TEXT NOT NULL DEFAULT 'Guest',
            message       TEXT NOT NULL DEFAULT '',
            uploaded_at   TIMESTAMPTZ NOT NULL
        )
        "
    );
    sqlx::query(&create_table).execute(pool).await?;

    let index = format!(
        "CREATE INDEX IF NOT EXISTS idx_{prefix}media_uploaded_at ON {table} (uploaded_at DESC, id DESC)"
    );
    sqlx::query(&index).execute(pool).await?;

    Ok(())
}
