use sqlx::{FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;

/// Deterministic name of a user's mailbox table.
pub fn table_name(owner_id: i64) -> String {
    format!("messages_user_{owner_id}")
}

/// One note inside a mailbox table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub memo_id: i64,
    pub content: String,
    pub writer_id: i64,
    pub choice_type: String,
    pub created_at: OffsetDateTime,
}

/// Create the owner's mailbox table if it does not exist yet.
///
/// IF NOT EXISTS makes this idempotent, so two concurrent first-writers racing
/// on the same owner both succeed instead of one of them failing on DDL.
/// Generic over the executor so registration can run it inside the same
/// transaction as the user insert.
pub async fn ensure_mailbox<'e, E>(executor: E, owner_id: i64) -> anyhow::Result<()>
where
    E: PgExecutor<'e>,
{
    // The identifier is derived from a numeric ID, so interpolation is safe.
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            memo_id BIGSERIAL PRIMARY KEY,
            content TEXT NOT NULL,
            writer_id BIGINT NOT NULL REFERENCES users(id),
            choice_type VARCHAR(50) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        table_name(owner_id)
    );
    sqlx::query(&ddl).execute(executor).await?;
    Ok(())
}

/// Check whether the owner's mailbox table has been provisioned.
pub async fn mailbox_exists(db: &PgPool, owner_id: i64) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = $1
        )
        "#,
    )
    .bind(table_name(owner_id))
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Insert one note into the owner's mailbox, returning the new memo ID.
/// The single INSERT is atomic; a storage fault leaves nothing behind.
pub async fn insert_message(
    db: &PgPool,
    owner_id: i64,
    content: &str,
    writer_id: i64,
    choice_type: &str,
) -> anyhow::Result<i64> {
    let sql = format!(
        "INSERT INTO {} (content, writer_id, choice_type) VALUES ($1, $2, $3) RETURNING memo_id",
        table_name(owner_id)
    );
    let memo_id = sqlx::query_scalar::<_, i64>(&sql)
        .bind(content)
        .bind(writer_id)
        .bind(choice_type)
        .fetch_one(db)
        .await?;
    Ok(memo_id)
}

/// Fetch one note by memo ID from the owner's mailbox.
pub async fn fetch_message(
    db: &PgPool,
    owner_id: i64,
    memo_id: i64,
) -> anyhow::Result<Option<MessageRow>> {
    let sql = format!(
        "SELECT memo_id, content, writer_id, choice_type, created_at FROM {} WHERE memo_id = $1",
        table_name(owner_id)
    );
    let row = sqlx::query_as::<_, MessageRow>(&sql)
        .bind(memo_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}
