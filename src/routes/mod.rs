use actix_web::web;

pub mod auth;
pub mod directory;
pub mod members;
pub mod photos;
pub mod prayer_requests;
pub mod small_groups;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(directory::configure)
            .configure(small_groups::configure)
            .configure(members::configure)
            .configure(prayer_requests::configure)
            .configure(photos::configure),
    );
}
