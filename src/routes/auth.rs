use crate::handlers::auth;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/session", web::get().to(auth::session))
            .route("/admin", web::post().to(auth::enter_admin))
            .route("/admin", web::delete().to(auth::leave_admin))
            .route("/logout", web::post().to(auth::logout)),
    );
}
