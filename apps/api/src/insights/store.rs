//! Insight row operations. Plain CRUD — no versioning, no soft deletes.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::insight::Insight;

/// Inserts a new insight and returns the stored row.
pub async fn create_insight(
    pool: &SqlitePool,
    brand: i64,
    text: &str,
) -> Result<Insight, sqlx::Error> {
    let result = sqlx::query("INSERT INTO insights (brand, created_at, text) VALUES (?, ?, ?)")
        .bind(brand)
        .bind(Utc::now())
        .bind(text)
        .execute(pool)
        .await?;

    // Fetch the just-inserted row rather than reassembling it, so the caller
    // sees exactly what the database stored.
    sqlx::query_as("SELECT * FROM insights WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

/// Returns all insights, oldest first.
pub async fn list_insights(pool: &SqlitePool) -> Result<Vec<Insight>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM insights ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Looks up a single insight by id.
pub async fn lookup_insight(pool: &SqlitePool, id: i64) -> Result<Option<Insight>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM insights WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Deletes an insight by id. Idempotent: deleting a missing row is not an error.
pub async fn delete_insight(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM insights WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_returns_the_stored_row() {
        let pool = test_pool().await;

        let insight = create_insight(&pool, 7, "solid packaging").await.unwrap();

        assert_eq!(insight.id, 1);
        assert_eq!(insight.brand, 7);
        assert_eq!(insight.text, "solid packaging");
    }

    #[tokio::test]
    async fn test_list_returns_rows_in_insertion_order() {
        let pool = test_pool().await;

        create_insight(&pool, 1, "first").await.unwrap();
        create_insight(&pool, 2, "second").await.unwrap();

        let all = list_insights(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
    }

    #[tokio::test]
    async fn test_lookup_hits_and_misses() {
        let pool = test_pool().await;

        let created = create_insight(&pool, 3, "findable").await.unwrap();

        let found = lookup_insight(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.text, "findable");
        assert_eq!(found.created_at, created.created_at);

        assert!(lookup_insight(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_the_row_and_is_idempotent() {
        let pool = test_pool().await;

        let created = create_insight(&pool, 4, "short-lived").await.unwrap();

        delete_insight(&pool, created.id).await.unwrap();
        assert!(lookup_insight(&pool, created.id).await.unwrap().is_none());

        // Second delete of the same id succeeds quietly.
        delete_insight(&pool, created.id).await.unwrap();
    }
}
