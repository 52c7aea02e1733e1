use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    database::{
        models::{CreateMemberInput, Member, UpdateMemberInput},
        repositories::{member as member_repo, small_group as small_group_repo},
        transaction::DatabaseTransaction,
    },
    directory::recent_cutoff,
    error::AppError,
    handlers::{shared::ApiResponse, small_groups::discard_photo},
    services::SessionContext,
};

/// A member as returned by the API, with display helpers resolved.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    #[serde(flatten)]
    pub member: Member,
    pub role_label: &'static str,
    pub photo_display_url: Option<String>,
    pub photo_style: Option<String>,
}

impl MemberResponse {
    pub async fn build(state: &AppState, member: Member) -> Self {
        let photo_display_url = state.photo_display_url(&member).await;
        let photo_style = photo_display_url
            .as_ref()
            .map(|_| member.photo_position.background_style().to_css());
        Self {
            role_label: member.role.label(),
            photo_display_url,
            photo_style,
            member,
        }
    }

    pub async fn build_all(state: &AppState, members: Vec<Member>) -> Vec<Self> {
        let urls = state.photo_display_urls(&members).await;
        members
            .into_iter()
            .map(|member| {
                let photo_display_url = urls.get(&member.id).cloned();
                let photo_style = photo_display_url
                    .as_ref()
                    .map(|_| member.photo_position.background_style().to_css());
                Self {
                    role_label: member.role.label(),
                    photo_display_url,
                    photo_style,
                    member,
                }
            })
            .collect()
    }
}

pub(crate) async fn load_member(state: &AppState, id: Uuid) -> Result<Member, AppError> {
    member_repo::find_member_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
}

pub async fn list_members(_ctx: SessionContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let members = member_repo::list_members(&state.pool)
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(MemberResponse::build_all(&state, members).await))
}

/// Members updated within the recent window, newest first.
pub async fn list_recent_members(
    _ctx: SessionContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let members = member_repo::list_members_updated_since(&state.pool, recent_cutoff(Utc::now()))
        .await
        .map_err(AppError::from)?;

    Ok(ApiResponse::success(MemberResponse::build_all(&state, members).await))
}

pub async fn get_member(
    _ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let member = load_member(&state, path.into_inner()).await?;
    Ok(ApiResponse::success(MemberResponse::build(&state, member).await))
}

pub async fn create_member(
    ctx: SessionContext,
    state: web::Data<AppState>,
    input: web::Json<CreateMemberInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let input = input.into_inner().validate().map_err(AppError::BadRequest)?;

    let created = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            if !small_group_repo::small_group_exists(tx, input.small_group_id).await? {
                return Err(AppError::BadRequest("Small group not found".to_string()));
            }
            Ok(member_repo::create_member(tx, &input).await?)
        })
    })
    .await?;

    log::info!("Member {} created", created.id);
    let member = load_member(&state, created.id).await?;
    Ok(ApiResponse::created(MemberResponse::build(&state, member).await))
}

pub async fn update_member(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateMemberInput>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    let input = input.into_inner().validate().map_err(AppError::BadRequest)?;

    DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            if !small_group_repo::small_group_exists(tx, input.small_group_id).await? {
                return Err(AppError::BadRequest("Small group not found".to_string()));
            }
            member_repo::update_member(tx, id, &input)
                .await?
                .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
        })
    })
    .await?;

    let member = load_member(&state, id).await?;
    Ok(ApiResponse::success(MemberResponse::build(&state, member).await))
}

pub async fn delete_member(
    ctx: SessionContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ctx.requires_admin()?;

    let id = path.into_inner();
    let deleted = DatabaseTransaction::run(&state.pool, |tx| {
        Box::pin(async move {
            member_repo::delete_member(tx, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
        })
    })
    .await?;

    if let Some(path) = &deleted.photo_url {
        discard_photo(&state, path).await;
    }

    log::info!("Member {} deleted", id);
    Ok(ApiResponse::message("Member deleted"))
}
