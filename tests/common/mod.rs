#![allow(dead_code, unused_imports, unused_macros)]

use std::env;

use actix_web::{body::BoxBody, dev::ServiceResponse, test, web};
use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tempfile::TempDir;
use uuid::Uuid;

use darakbang::database::init_database;
use darakbang::database::models::{Member, MemberRole, PrayerRequest, SmallGroup};
use darakbang::handlers::shared::ApiResponse;
use darakbang::photo::PhotoPosition;
use darakbang::{AppState, Config};

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Application state over a lazily-connected pool and a scratch photo directory.
///
/// Nothing here opens a database connection, so only routes that fail before
/// touching the database (authentication, authorization, input validation) or
/// that only touch the photo store are exercised against it.
pub struct TestApp {
    pub state: web::Data<AppState>,
    pub config: Config,
    _photo_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy(&Config::test_config().database_url)
            .expect("Test database URL should parse");
        Self::with_pool(pool)
    }

    pub fn with_pool(pool: PgPool) -> Self {
        setup_test_env();

        let photo_dir = TempDir::new().expect("Failed to create photo dir");
        let mut config = Config::test_config();
        config.photo_dir = photo_dir.path().to_string_lossy().into_owned();

        let state = web::Data::new(AppState::new(config.clone(), pool));

        TestApp {
            state,
            config,
            _photo_dir: photo_dir,
        }
    }

    /// Token for a fresh non-admin session.
    pub fn viewer_token(&self) -> String {
        self.state
            .auth_service
            .login(&self.config.site_password)
            .expect("Site login should succeed")
            .token
    }

    /// Token for a fresh session already in admin mode.
    pub fn admin_token(&self) -> String {
        let token = self.viewer_token();
        let ctx = self
            .state
            .auth_service
            .authenticate(&token)
            .expect("Fresh token should authenticate");
        self.state
            .auth_service
            .enter_admin(&ctx, &self.config.admin_password)
            .expect("Admin login should succeed");
        token
    }
}

/// A migrated Postgres database, taken from `DATABASE_URL`.
///
/// `new` returns `None` when `DATABASE_URL` is unset so database-backed tests
/// skip instead of failing on machines without Postgres. Rows are never
/// truncated; each test works on groups and members it created itself.
pub struct TestContext {
    pub pool: PgPool,
    pub app: TestApp,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        setup_test_env();

        let Ok(database_url) = env::var("DATABASE_URL") else {
            log::warn!("DATABASE_URL not set, skipping database test");
            return None;
        };

        let pool = init_database(&database_url)
            .await
            .expect("Failed to initialize test database");
        let app = TestApp::with_pool(pool.clone());

        Some(TestContext { pool, app })
    }
}

/// Build the full route table over a [`TestApp`]'s state.
macro_rules! init_app {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($app.state.clone())
                .configure(darakbang::routes::configure),
        )
        .await
    };
}
pub(crate) use init_app;

pub struct AuthHelper;

impl AuthHelper {
    pub fn auth_header(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn group(name: &str) -> SmallGroup {
        let now = Utc::now();
        SmallGroup {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(group: &SmallGroup, role: MemberRole, updated_at: DateTime<Utc>) -> Member {
        let name: String = Name().fake();
        Member {
            id: Uuid::new_v4(),
            small_group_id: group.id,
            name,
            role,
            photo_url: None,
            photo_position: PhotoPosition::default(),
            created_at: updated_at - Duration::days(90),
            updated_at,
            small_group: Some(group.clone()),
            prayer_requests: Some(Vec::new()),
        }
    }

    pub fn random_member(group: &SmallGroup, now: DateTime<Utc>) -> Member {
        let role = MemberRole::ALL[(0..MemberRole::ALL.len()).fake::<usize>()];
        let age_hours: i64 = (0..24 * 60).fake();
        Self::member(group, role, now - Duration::hours(age_hours))
    }

    pub fn prayer_request(member: &Member, content: &str, created_at: DateTime<Utc>) -> PrayerRequest {
        PrayerRequest {
            id: Uuid::new_v4(),
            member_id: member.id,
            content: content.to_string(),
            created_at,
            updated_at: created_at,
        }
    }
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    pub async fn success_data<T>(resp: ServiceResponse<BoxBody>) -> T
    where
        T: DeserializeOwned,
    {
        let body: ApiResponse<T> = test::read_body_json(resp).await;
        assert!(
            body.success,
            "Expected successful response but got error: {:?}",
            body.message
        );
        body.data.expect("Expected data in successful response")
    }

    pub async fn error_message(resp: ServiceResponse<BoxBody>) -> String {
        let body: ApiResponse<serde_json::Value> = test::read_body_json(resp).await;
        assert!(!body.success, "Expected an error response");
        body.message.unwrap_or_default()
    }
}

/// Restore the listed environment variables when dropped.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    pub fn new(keys: &[&'static str]) -> Self {
        Self {
            saved: keys.iter().map(|key| (*key, env::var(key).ok())).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
