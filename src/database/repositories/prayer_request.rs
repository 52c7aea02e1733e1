use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{PrayerRequest, sort_for_display},
    repositories::member::touch_member,
    utils::sql,
};

/// Every request newest first, or one member's requests oldest first (the
/// same order they are nested in under the member).
pub async fn list_prayer_requests(
    pool: &PgPool,
    member_id: Option<Uuid>,
) -> Result<Vec<PrayerRequest>, sqlx::Error> {
    let mut requests = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            SELECT
                id,
                member_id,
                content,
                created_at,
                updated_at
            FROM
                prayer_requests
            WHERE
                (?::uuid IS NULL OR member_id = ?)
            ORDER BY
                created_at DESC
        "#))
    .bind(member_id)
    .bind(member_id)
    .fetch_all(pool)
    .await?;

    if member_id.is_some() {
        sort_for_display(&mut requests);
    }

    Ok(requests)
}

pub async fn list_prayer_requests_for_members(
    pool: &PgPool,
    member_ids: &[Uuid],
) -> Result<Vec<PrayerRequest>, sqlx::Error> {
    if member_ids.is_empty() {
        return Ok(Vec::new());
    }

    let requests = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            SELECT
                id,
                member_id,
                content,
                created_at,
                updated_at
            FROM
                prayer_requests
            WHERE
                member_id = ANY(?)
            ORDER BY
                created_at ASC
        "#))
    .bind(member_ids)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

pub async fn find_prayer_request_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PrayerRequest>, sqlx::Error> {
    let request = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            SELECT
                id,
                member_id,
                content,
                created_at,
                updated_at
            FROM
                prayer_requests
            WHERE
                id = ?
        "#))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

/// Adds a request and marks the member as updated.
pub async fn create_prayer_request(
    tx: &mut Transaction<'_, Postgres>,
    member_id: Uuid,
    content: &str,
) -> Result<PrayerRequest, sqlx::Error> {
    let now = Utc::now();
    let request = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            INSERT INTO
                prayer_requests (member_id, content, created_at, updated_at)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                member_id,
                content,
                created_at,
                updated_at
        "#))
    .bind(member_id)
    .bind(content)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    touch_member(tx, member_id).await?;

    Ok(request)
}

pub async fn update_prayer_request(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    content: &str,
) -> Result<Option<PrayerRequest>, sqlx::Error> {
    let request = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            UPDATE
                prayer_requests
            SET
                content = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                member_id,
                content,
                created_at,
                updated_at
        "#))
    .bind(content)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(request) = &request {
        touch_member(tx, request.member_id).await?;
    }

    Ok(request)
}

pub async fn delete_prayer_request(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<PrayerRequest>, sqlx::Error> {
    let request = sqlx::query_as::<_, PrayerRequest>(&sql(r#"
            DELETE FROM
                prayer_requests
            WHERE
                id = ?
            RETURNING
                id,
                member_id,
                content,
                created_at,
                updated_at
        "#))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(request) = &request {
        touch_member(tx, request.member_id).await?;
    }

    Ok(request)
}
