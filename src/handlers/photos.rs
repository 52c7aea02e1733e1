use actix_web::{
    HttpResponse, Result,
    http::header::{CacheControl, CacheDirective, ContentType},
    web,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    database::{repositories::member as member_repo, transaction::DatabaseTransaction},
    error::AppError,
    handlers::{members::{MemberResponse, load_member}, shared::ApiResponse, small_groups::discard_photo},
    photo::{PhotoPosition, storage::MAX_IMAGE_EDGE},
    services::SessionContext,
};

/// Largest accepted upload body, before resizing.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MIN_PREVIEW_EDGE: u32 = 64;
const DEFAULT_PREVIEW_EDGE: u32 = 256;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoTokenQuery {
    pub token: String,
}

/// Store a new photo for the member and reset its position. The replaced photo is deleted.
pub async fn upload_member_photo(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let member_id = path.into_inner();
    if body.is_empty() {
        return Err(AppError::BadRequest("Photo upload is empty".to_string()).into());
    }
    let previous = load_member(&state, member_id).await?.photo_url;

    let stored_path = state.photo_store.save(member_id, body.to_vec()).await?;

    let new_path = stored_path.clone();
    let updated = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            member_repo::update_member_photo(tx, member_id, Some(new_path.as_str()), PhotoPosition::centered())
                .await?
                .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
        })
    })
    .await;

    if let Err(e) = updated {
        discard_photo(&state, &stored_path).await;
        return Err(e.into());
    }

    if let Some(old) = previous.filter(|old| *old != stored_path) {
        discard_photo(&state, &old).await;
    }

    log::info!("Photo updated for member {}", member_id);
    let member = load_member(&state, member_id).await?;
    Ok(ApiResponse::success(MemberResponse::build(&state, member).await))
}

pub async fn remove_member_photo(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let member_id = path.into_inner();
    let previous = load_member(&state, member_id).await?.photo_url;

    DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            member_repo::update_member_photo(tx, member_id, None, PhotoPosition::centered())
                .await?
                .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
        })
    })
    .await?;

    if let Some(old) = previous {
        discard_photo(&state, &old).await;
    }

    let member = load_member(&state, member_id).await?;
    Ok(ApiResponse::success(MemberResponse::build(&state, member).await))
}

/// Square JPEG of the member's photo, cropped at the saved position.
pub async fn preview_member_photo(
    _ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse> {
    let member = load_member(&state, path.into_inner()).await?;
    let photo_path = member
        .photo_url
        .as_deref()
        .filter(|p| !crate::photo::is_external(p))
        .ok_or_else(|| AppError::NotFound("Member has no stored photo".to_string()))?;

    let edge = query
        .size
        .unwrap_or(DEFAULT_PREVIEW_EDGE)
        .clamp(MIN_PREVIEW_EDGE, MAX_IMAGE_EDGE);
    let jpeg = state
        .photo_store
        .render_crop(photo_path, member.photo_position, edge)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::jpeg())
        .insert_header(CacheControl(vec![CacheDirective::Private, CacheDirective::NoCache]))
        .body(jpeg))
}

/// Serve a stored photo to holders of a valid signed URL.
pub async fn serve_photo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PhotoTokenQuery>,
) -> Result<HttpResponse> {
    let photo_path = path.into_inner();
    if !state.photo_store.verify(&photo_path, &query.token) {
        return Err(AppError::Unauthorized.into());
    }

    let bytes = state.photo_store.read(&photo_path).await?;
    let max_age = state.photo_store.url_ttl().as_secs() as u32;

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::jpeg())
        .insert_header(CacheControl(vec![
            CacheDirective::Private,
            CacheDirective::MaxAge(max_age),
        ]))
        .body(bytes))
}
