use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::{
    AppState,
    database::{
        models::PrayerRequestInput,
        repositories::{member as member_repo, prayer_request as prayer_request_repo},
        transaction::DatabaseTransaction,
    },
    error::AppError,
    handlers::shared::ApiResponse,
    services::SessionContext,
};

fn content_of(input: &PrayerRequestInput) -> Result<String, AppError> {
    input
        .normalized_content()
        .ok_or_else(|| AppError::BadRequest("Prayer request must not be empty".to_string()))
}

pub async fn list_member_prayer_requests(
    _ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let member_id = path.into_inner();
    if !member_repo::member_exists(&state.pool, member_id)
        .await
        .map_err(AppError::from)?
    {
        return Err(AppError::NotFound("Member not found".to_string()).into());
    }

    let requests = prayer_request_repo::list_prayer_requests(&state.pool, Some(member_id))
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(requests))
}

pub async fn create_prayer_request(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<PrayerRequestInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let member_id = path.into_inner();
    let content = content_of(&input)?;

    let request = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            if !member_repo::member_exists(&mut **tx, member_id).await? {
                return Err(AppError::NotFound("Member not found".to_string()));
            }
            Ok(prayer_request_repo::create_prayer_request(tx, member_id, &content).await?)
        })
    })
    .await?;

    Ok(ApiResponse::created(request))
}

pub async fn get_prayer_request(
    _ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let request = prayer_request_repo::find_prayer_request_by_id(&state.pool, path.into_inner())
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Prayer request not found".to_string()))?;

    Ok(ApiResponse::success(request))
}

pub async fn update_prayer_request(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<PrayerRequestInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    let content = content_of(&input)?;

    let request = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            prayer_request_repo::update_prayer_request(tx, id, &content)
                .await?
                .ok_or_else(|| AppError::NotFound("Prayer request not found".to_string()))
        })
    })
    .await?;

    Ok(ApiResponse::success(request))
}

pub async fn delete_prayer_request(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            prayer_request_repo::delete_prayer_request(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Prayer request not found".to_string()))
        })
    })
    .await?;

    Ok(ApiResponse::message("Prayer request deleted"))
}
