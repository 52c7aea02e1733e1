use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::SmallGroup, utils::sql};

pub async fn list_small_groups(pool: &PgPool) -> Result<Vec<SmallGroup>, sqlx::Error> {
    let groups = sqlx::query_as::<_, SmallGroup>(&sql(r#"
            SELECT
                id,
                name,
                created_at,
                updated_at
            FROM
                small_groups
            ORDER BY
                name
        "#))
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

pub async fn find_small_group_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<SmallGroup>, sqlx::Error> {
    let group = sqlx::query_as::<_, SmallGroup>(&sql(r#"
            SELECT
                id,
                name,
                created_at,
                updated_at
            FROM
                small_groups
            WHERE
                id = ?
        "#))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(group)
}

pub async fn small_group_exists(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(&sql(r#"
            SELECT EXISTS (SELECT 1 FROM small_groups WHERE id = ?)
        "#))
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

pub async fn create_small_group(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<SmallGroup, sqlx::Error> {
    let now = Utc::now();
    let group = sqlx::query_as::<_, SmallGroup>(&sql(r#"
            INSERT INTO
                small_groups (name, created_at, updated_at)
            VALUES
                (?, ?, ?)
            RETURNING
                id,
                name,
                created_at,
                updated_at
        "#))
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(group)
}

pub async fn rename_small_group(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    name: &str,
) -> Result<Option<SmallGroup>, sqlx::Error> {
    let group = sqlx::query_as::<_, SmallGroup>(&sql(r#"
            UPDATE
                small_groups
            SET
                name = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                name,
                created_at,
                updated_at
        "#))
    .bind(name)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(group)
}

/// Deletes the group; its members and their prayer requests go with it.
pub async fn delete_small_group(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql("DELETE FROM small_groups WHERE id = ?"))
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}
