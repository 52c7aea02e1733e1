use actix_web::{HttpResponse, Result, web};

use crate::{
    AppState,
    handlers::shared::ApiResponse,
    services::auth::{PasswordInput, SessionContext},
};

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<PasswordInput>,
) -> Result<HttpResponse> {
    let response = state.auth_service.login(&input.password)?;
    Ok(ApiResponse::success(response))
}

pub async fn session(ctx: SessionContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.auth_service.current(&ctx)?;
    Ok(ApiResponse::success(session))
}

pub async fn enter_admin(
    ctx: SessionContext,
    state: web::Data<AppState>,
    input: web::Json<PasswordInput>,
) -> Result<HttpResponse> {
    let session = state.auth_service.enter_admin(&ctx, &input.password)?;
    Ok(ApiResponse::success(session))
}

pub async fn leave_admin(ctx: SessionContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let session = state.auth_service.leave_admin(&ctx)?;
    Ok(ApiResponse::success(session))
}

pub async fn logout(ctx: SessionContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    state.auth_service.logout(&ctx);
    Ok(ApiResponse::message("Logged out"))
}
