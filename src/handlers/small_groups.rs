use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use crate::{
    AppState,
    database::{
        models::SmallGroupInput,
        repositories::{member as member_repo, small_group as small_group_repo},
        transaction::DatabaseTransaction,
    },
    error::AppError,
    handlers::shared::ApiResponse,
    services::SessionContext,
};

pub async fn list_small_groups(
    _ctx: SessionContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let groups = small_group_repo::list_small_groups(&state.pool)
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(groups))
}

pub async fn get_small_group(
    _ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let group = small_group_repo::find_small_group_by_id(&state.pool, path.into_inner())
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Small group not found".to_string()))?;

    Ok(ApiResponse::success(group))
}

pub async fn create_small_group(
    ctx: SessionContext,
    state: web::Data<AppState>,
    input: web::Json<SmallGroupInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let name = input
        .normalized_name()
        .ok_or_else(|| AppError::BadRequest("Group name must not be empty".to_string()))?;

    let group = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move { Ok(small_group_repo::create_small_group(tx, &name).await?) })
    })
    .await?;

    log::info!("Small group '{}' created", group.name);
    Ok(ApiResponse::created(group))
}

pub async fn update_small_group(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<SmallGroupInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    let name = input
        .normalized_name()
        .ok_or_else(|| AppError::BadRequest("Group name must not be empty".to_string()))?;

    let group = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            small_group_repo::rename_small_group(tx, id, &name)
                .await?
                .ok_or_else(|| AppError::NotFound("Small group not found".to_string()))
        })
    })
    .await?;

    Ok(ApiResponse::success(group))
}

/// Deleting a group removes its members too, so their stored photos are cleaned up afterwards.
pub async fn delete_small_group(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    let photo_paths = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            let paths = member_repo::photo_paths_for_group(tx, id).await?;
            if !small_group_repo::delete_small_group(tx, id).await? {
                return Err(AppError::NotFound("Small group not found".to_string()));
            }
            Ok(paths)
        })
    })
    .await?;

    for path in photo_paths {
        discard_photo(&state, &path).await;
    }

    log::info!("Small group {} deleted", id);
    Ok(ApiResponse::message("Small group deleted"))
}

/// Best-effort removal of a stored photo that is no longer referenced.
pub(crate) async fn discard_photo(state: &AppState, path: &str) {
    state.photo_urls.invalidate(path).await;
    if let Err(e) = state.photo_store.delete(path).await {
        log::warn!("Failed to delete photo {}: {}", path, e);
    }
}
