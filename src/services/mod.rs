pub mod auth;
pub mod session;

pub use auth::{AuthService, SessionContext};
pub use session::{SessionState, SessionStore};
