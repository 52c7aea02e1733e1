use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction, types::Json};
use uuid::Uuid;

use crate::database::{
    models::{Member, MemberInput, MemberRow, PrayerRequest, SmallGroup},
    repositories::{
        prayer_request::{list_prayer_requests, list_prayer_requests_for_members},
        small_group::list_small_groups,
    },
    utils::sql,
};
use crate::photo::PhotoPosition;

const MEMBER_COLUMNS: &str = r#"
    id,
    small_group_id,
    name,
    role,
    photo_url,
    photo_position,
    created_at,
    updated_at
"#;

/// Attach each member's group and its prayer requests (oldest first).
fn assemble(rows: Vec<MemberRow>, groups: &[SmallGroup], requests: Vec<PrayerRequest>) -> Vec<Member> {
    let groups_by_id: HashMap<Uuid, &SmallGroup> = groups.iter().map(|g| (g.id, g)).collect();

    let mut requests_by_member: HashMap<Uuid, Vec<PrayerRequest>> = HashMap::new();
    for request in requests {
        requests_by_member
            .entry(request.member_id)
            .or_default()
            .push(request);
    }

    rows.into_iter()
        .map(|row| {
            let mut member = Member::from(row);
            member.small_group = groups_by_id.get(&member.small_group_id).map(|g| (*g).clone());
            let mut requests = requests_by_member.remove(&member.id).unwrap_or_default();
            crate::database::models::sort_for_display(&mut requests);
            member.prayer_requests = Some(requests);
            member
        })
        .collect()
}

async fn with_relations(pool: &PgPool, rows: Vec<MemberRow>) -> Result<Vec<Member>, sqlx::Error> {
    let member_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let (groups, requests) = tokio::try_join!(
        list_small_groups(pool),
        list_prayer_requests_for_members(pool, &member_ids),
    )?;
    Ok(assemble(rows, &groups, requests))
}

async fn member_rows(pool: &PgPool) -> Result<Vec<MemberRow>, sqlx::Error> {
    sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            SELECT {MEMBER_COLUMNS}
            FROM
                members
            ORDER BY
                updated_at DESC
        "#
    )))
    .fetch_all(pool)
    .await
}

/// All members with their group and prayer requests, most recently updated first.
pub async fn list_members(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
    let groups = list_small_groups(pool).await?;
    list_members_with_groups(pool, &groups).await
}

/// Like [`list_members`], nesting groups the caller has already loaded.
pub async fn list_members_with_groups(
    pool: &PgPool,
    groups: &[SmallGroup],
) -> Result<Vec<Member>, sqlx::Error> {
    let (rows, requests) = tokio::try_join!(member_rows(pool), list_prayer_requests(pool, None))?;
    Ok(assemble(rows, groups, requests))
}

pub async fn list_members_updated_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<Member>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            SELECT {MEMBER_COLUMNS}
            FROM
                members
            WHERE
                updated_at >= ?
            ORDER BY
                updated_at DESC
        "#
    )))
    .bind(since)
    .fetch_all(pool)
    .await?;

    with_relations(pool, rows).await
}

pub async fn find_member_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Member>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            SELECT {MEMBER_COLUMNS}
            FROM
                members
            WHERE
                id = ?
        "#
    )))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(with_relations(pool, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

pub async fn create_member(
    tx: &mut Transaction<'_, Postgres>,
    input: &MemberInput,
) -> Result<Member, sqlx::Error> {
    let now = Utc::now();
    let position = input.photo_position.unwrap_or_default();
    let row = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            INSERT INTO
                members (
                    small_group_id,
                    name,
                    role,
                    photo_position,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING {MEMBER_COLUMNS}
        "#
    )))
    .bind(input.small_group_id)
    .bind(&input.name)
    .bind(input.role)
    .bind(Json(position))
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.into())
}

pub async fn update_member(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    input: &MemberInput,
) -> Result<Option<Member>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            UPDATE
                members
            SET
                small_group_id = ?,
                name = ?,
                role = ?,
                photo_position = COALESCE(?, photo_position),
                updated_at = ?
            WHERE
                id = ?
            RETURNING {MEMBER_COLUMNS}
        "#
    )))
    .bind(input.small_group_id)
    .bind(&input.name)
    .bind(input.role)
    .bind(input.photo_position.map(Json))
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Member::from))
}

/// Replace (or clear) the stored photo path and reset its position.
pub async fn update_member_photo(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    photo_url: Option<&str>,
    position: PhotoPosition,
) -> Result<Option<Member>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            UPDATE
                members
            SET
                photo_url = ?,
                photo_position = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING {MEMBER_COLUMNS}
        "#
    )))
    .bind(photo_url)
    .bind(Json(position))
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Member::from))
}

/// Existence check that also holds the row against deletion until the
/// surrounding transaction ends.
pub async fn member_exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let found: Option<Uuid> = sqlx::query_scalar(&sql(r#"
            SELECT
                id
            FROM
                members
            WHERE
                id = ?
            FOR KEY SHARE
        "#))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(found.is_some())
}

/// Bump `updated_at` after a change to one of the member's prayer requests.
pub async fn touch_member(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql("UPDATE members SET updated_at = ? WHERE id = ?"))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Stored photo paths of a group's members, read before the group is deleted.
pub async fn photo_paths_for_group(
    tx: &mut Transaction<'_, Postgres>,
    small_group_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    let paths: Vec<String> = sqlx::query_scalar(&sql(r#"
            SELECT
                photo_url
            FROM
                members
            WHERE
                small_group_id = ?
                AND photo_url IS NOT NULL
        "#))
    .bind(small_group_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(paths)
}

/// Delete a member (and, by cascade, their prayer requests). Returns the deleted row.
pub async fn delete_member(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Member>, sqlx::Error> {
    let row = sqlx::query_as::<_, MemberRow>(&sql(&format!(
        r#"
            DELETE FROM
                members
            WHERE
                id = ?
            RETURNING {MEMBER_COLUMNS}
        "#
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Member::from))
}
