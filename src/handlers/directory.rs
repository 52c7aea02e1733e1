use actix_web::{HttpResponse, Result, web};
use chrono::Utc;

use crate::{
    AppState,
    database::repositories::{member as member_repo, small_group as small_group_repo},
    directory::{NameCollator, build_directory},
    error::AppError,
    handlers::shared::ApiResponse,
    services::SessionContext,
};

/// Home screen data: recently updated members and every group's roster.
pub async fn get_directory(_ctx: SessionContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let groups = small_group_repo::list_small_groups(&state.pool)
        .await
        .map_err(AppError::from)?;
    let members = member_repo::list_members_with_groups(&state.pool, &groups)
        .await
        .map_err(AppError::from)?;

    let photo_urls = state.photo_display_urls(&members).await;
    let view = build_directory(
        &members,
        &groups,
        Utc::now(),
        &NameCollator::korean(),
        &photo_urls,
    );

    Ok(ApiResponse::success(view))
}
