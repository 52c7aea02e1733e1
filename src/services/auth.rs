use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::AppState;
use crate::config::Config;
use crate::error::AppError;
use crate::services::session::{SessionState, SessionStore};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // session id
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct PasswordInput {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionState,
}

/// The caller's session, resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: SessionState,
}

impl SessionContext {
    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    pub fn is_admin(&self) -> bool {
        self.session.admin
    }

    pub fn requires_admin(&self) -> Result<(), AppError> {
        if self.session.admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin mode required".to_string()))
        }
    }
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<Data<AppState>>() else {
            log::error!("AppState missing from app data");
            return ready(Err(AppError::internal_server_error()));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) => ready(state.auth_service.authenticate(token)),
            None => ready(Err(AppError::Unauthorized)),
        }
    }
}

/// Shared-password gate: one password to view, a second to enter admin mode.
#[derive(Clone)]
pub struct AuthService {
    config: Config,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(config: Config) -> Self {
        let sessions = SessionStore::new(config.session_ttl());
        Self { config, sessions }
    }

    pub fn login(&self, password: &str) -> Result<LoginResponse, AppError> {
        if !passwords_match(password, &self.config.site_password) {
            log::warn!("Rejected site login attempt");
            return Err(AppError::Unauthorized);
        }

        let session = self.sessions.create();
        let token = self.generate_token(session.id)?;
        log::info!("Session {} started", session.id);

        Ok(LoginResponse { token, session })
    }

    pub fn enter_admin(&self, context: &SessionContext, password: &str) -> Result<SessionState, AppError> {
        if !passwords_match(password, &self.config.admin_password) {
            log::warn!("Rejected admin password for session {}", context.session_id());
            return Err(AppError::Unauthorized);
        }

        let session = self
            .sessions
            .set_admin(&context.session_id(), true)
            .ok_or(AppError::Unauthorized)?;
        log::info!("Session {} entered admin mode", session.id);
        Ok(session)
    }

    pub fn leave_admin(&self, context: &SessionContext) -> Result<SessionState, AppError> {
        self.sessions
            .set_admin(&context.session_id(), false)
            .ok_or(AppError::Unauthorized)
    }

    pub fn logout(&self, context: &SessionContext) {
        if self.sessions.remove(&context.session_id()) {
            log::info!("Session {} ended", context.session_id());
        }
    }

    pub fn current(&self, context: &SessionContext) -> Result<SessionState, AppError> {
        self.sessions
            .get(&context.session_id())
            .ok_or(AppError::Unauthorized)
    }

    /// Resolve a bearer token to its live session.
    pub fn authenticate(&self, token: &str) -> Result<SessionContext, AppError> {
        let claims = self.verify_token(token)?;
        let session = self
            .sessions
            .get(&claims.sub)
            .filter(|session| session.authenticated)
            .ok_or(AppError::Unauthorized)?;
        Ok(SessionContext { session })
    }

    fn generate_token(&self, session_id: Uuid) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(self.config.session_ttl_hours as i64))
            .ok_or_else(|| AppError::internal_server_error_message("Session expiry out of range"))?;

        let claims = Claims {
            sub: session_id,
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.session_secret.as_ref()),
        )
        .map_err(|e| AppError::internal_server_error_message(format!("Failed to issue token: {}", e)))
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.session_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("Invalid session token: {}", e);
            AppError::Unauthorized
        })
    }
}

/// Length-independent comparison; an unset password never matches.
fn passwords_match(given: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    let mut diff = given.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        diff |= usize::from(byte ^ given.get(i).copied().unwrap_or(0));
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(Config::test_config())
    }

    #[test]
    fn wrong_site_password_is_rejected() {
        let err = service().login("nope").err();
        assert!(matches!(err, Some(AppError::Unauthorized)));
    }

    #[test]
    fn login_issues_a_token_for_a_live_session() {
        let auth = service();
        let response = auth.login("site-password").unwrap();

        let context = auth.authenticate(&response.token).unwrap();
        assert_eq!(context.session_id(), response.session.id);
        assert!(!context.is_admin());
        assert!(context.requires_admin().is_err());
    }

    #[test]
    fn admin_mode_needs_the_admin_password() {
        let auth = service();
        let token = auth.login("site-password").unwrap().token;
        let context = auth.authenticate(&token).unwrap();

        assert!(auth.enter_admin(&context, "site-password").is_err());
        assert!(auth.enter_admin(&context, "admin-password").unwrap().admin);

        let elevated = auth.authenticate(&token).unwrap();
        assert!(elevated.requires_admin().is_ok());

        assert!(!auth.leave_admin(&elevated).unwrap().admin);
        assert!(!auth.authenticate(&token).unwrap().is_admin());
    }

    #[test]
    fn logout_revokes_the_token() {
        let auth = service();
        let token = auth.login("site-password").unwrap().token;
        let context = auth.authenticate(&token).unwrap();

        auth.logout(&context);
        assert!(matches!(auth.authenticate(&token), Err(AppError::Unauthorized)));
        assert!(auth.current(&context).is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let auth = service();
        let mut other_config = Config::test_config();
        other_config.session_secret = "a-completely-different-secret".to_string();
        let other = AuthService::new(other_config);

        let token = other.login("site-password").unwrap().token;
        assert!(auth.authenticate(&token).is_err());
        assert!(auth.authenticate("garbage").is_err());
    }

    #[test]
    fn password_comparison() {
        assert!(passwords_match("secret", "secret"));
        assert!(!passwords_match("secret!", "secret"));
        assert!(!passwords_match("secre", "secret"));
        assert!(!passwords_match("", ""));
    }
}
