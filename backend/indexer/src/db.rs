//! Database layer — migrations, projection writes, and lookup reads.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::records::BountyRecord;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Projection writes
// ─────────────────────────────────────────────────────────

/// Insert a freshly admitted record.  A row that already exists for the
/// same `(txid, vout)` is silently ignored so redelivered `output added`
/// events stay idempotent.  Returns whether a row was actually written.
pub async fn insert_record(pool: &SqlitePool, record: &BountyRecord) -> Result<bool> {
    let rows_affected = sqlx::query(
        r#"
        INSERT OR IGNORE INTO bounties
            (txid, vout, creator_addr, repo_owner_addr, contributor_addr,
             issue_id, pr_id, approvers, deadline, identity_key,
             value, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&record.txid)
    .bind(record.vout)
    .bind(&record.creator_addr)
    .bind(&record.repo_owner_addr)
    .bind(&record.contributor_addr)
    .bind(&record.issue_id)
    .bind(&record.pr_id)
    .bind(&record.approvers)
    .bind(record.deadline)
    .bind(&record.identity_key)
    .bind(record.value)
    .bind(&record.status)
    .bind(record.created_at)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Delete the record for a reference.  Deleting a row that does not exist
/// is a no-op, returning `false`.
pub async fn delete_record(pool: &SqlitePool, txid: &str, vout: i64) -> Result<bool> {
    let rows_affected = sqlx::query("DELETE FROM bounties WHERE txid = ?1 AND vout = ?2")
        .bind(txid)
        .bind(vout)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

// ─────────────────────────────────────────────────────────
// Lookup reads
// ─────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str = r#"
    txid, vout, creator_addr, repo_owner_addr, contributor_addr,
    issue_id, pr_id, approvers, deadline, identity_key,
    value, status, created_at
"#;

/// Fetch the full record for one reference.
pub async fn get_record(
    pool: &SqlitePool,
    txid: &str,
    vout: i64,
) -> Result<Option<BountyRecord>> {
    let row = sqlx::query_as::<_, BountyRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM bounties WHERE txid = ?1 AND vout = ?2"
    ))
    .bind(txid)
    .bind(vout)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// References of all records matching `status`, oldest first.
pub async fn refs_by_status(pool: &SqlitePool, status: &str) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as(
        r#"
        SELECT txid, vout
        FROM   bounties
        WHERE  status = ?1
        ORDER  BY created_at ASC, txid ASC, vout ASC
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// References matching one indexed text column.  `column` is restricted to
/// a fixed set by the caller; it is never user input.
async fn refs_by_column(
    pool: &SqlitePool,
    column: &'static str,
    needle: &str,
) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as(&format!(
        r#"
        SELECT txid, vout
        FROM   bounties
        WHERE  {column} = ?1
        ORDER  BY created_at ASC, txid ASC, vout ASC
        "#
    ))
    .bind(needle)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn refs_by_issue(pool: &SqlitePool, issue_id: &str) -> Result<Vec<(String, i64)>> {
    refs_by_column(pool, "issue_id", issue_id).await
}

pub async fn refs_by_pr(pool: &SqlitePool, pr_id: &str) -> Result<Vec<(String, i64)>> {
    refs_by_column(pool, "pr_id", pr_id).await
}

pub async fn refs_by_identity(pool: &SqlitePool, key: &str) -> Result<Vec<(String, i64)>> {
    refs_by_column(pool, "identity_key", key).await
}

pub async fn refs_by_repo_owner(pool: &SqlitePool, addr: &str) -> Result<Vec<(String, i64)>> {
    refs_by_column(pool, "repo_owner_addr", addr).await
}

pub async fn refs_by_contributor(pool: &SqlitePool, addr: &str) -> Result<Vec<(String, i64)>> {
    refs_by_column(pool, "contributor_addr", addr).await
}

/// References whose deadline is at or before the supplied cursor (block
/// height or timestamp — the caller supplies the unit space it queries in).
pub async fn refs_expiring_by(pool: &SqlitePool, cursor: i64) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as(
        r#"
        SELECT txid, vout
        FROM   bounties
        WHERE  deadline <= ?1
        ORDER  BY deadline ASC, txid ASC, vout ASC
        "#,
    )
    .bind(cursor)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
