use std::collections::HashMap;

use futures_util::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;

pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod photo;
pub mod routes;
pub mod services;

pub use config::Config;
pub use services::AuthService;

use database::models::Member;
use photo::{PhotoStore, SignedUrlCache};

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub photo_store: PhotoStore,
    pub photo_urls: SignedUrlCache,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        Self {
            auth_service: AuthService::new(config.clone()),
            photo_store: PhotoStore::from_config(&config),
            photo_urls: SignedUrlCache::for_url_ttl(config.photo_url_ttl()),
            config,
            pool,
        }
    }

    /// Display URL for a member's photo, through the signed URL cache.
    pub async fn photo_display_url(&self, member: &Member) -> Option<String> {
        let path = member.photo_url.as_deref()?;
        self.photo_urls.resolve(path, &self.photo_store).await
    }

    pub async fn photo_display_urls(&self, members: &[Member]) -> HashMap<Uuid, String> {
        let resolved = join_all(members.iter().map(|member| async move {
            (member.id, self.photo_display_url(member).await)
        }))
        .await;

        resolved
            .into_iter()
            .filter_map(|(id, url)| url.map(|url| (id, url)))
            .collect()
    }
}
