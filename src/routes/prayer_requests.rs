use crate::handlers::prayer_requests;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prayer-requests")
            .route("/{id}", web::get().to(prayer_requests::get_prayer_request))
            .route("/{id}", web::put().to(prayer_requests::update_prayer_request))
            .route("/{id}", web::delete().to(prayer_requests::delete_prayer_request)),
    );
}
