use crate::handlers::{members, photos, prayer_requests};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/members")
            .route("", web::get().to(members::list_members))
            .route("", web::post().to(members::create_member))
            .route("/recent", web::get().to(members::list_recent_members))
            .route("/{id}", web::get().to(members::get_member))
            .route("/{id}", web::put().to(members::update_member))
            .route("/{id}", web::delete().to(members::delete_member))
            .service(
                web::resource("/{id}/photo")
                    .app_data(web::PayloadConfig::new(photos::MAX_UPLOAD_BYTES))
                    .route(web::put().to(photos::upload_member_photo))
                    .route(web::delete().to(photos::remove_member_photo)),
            )
            .route(
                "/{id}/photo/preview",
                web::get().to(photos::preview_member_photo),
            )
            .route(
                "/{id}/prayer-requests",
                web::get().to(prayer_requests::list_member_prayer_requests),
            )
            .route(
                "/{id}/prayer-requests",
                web::post().to(prayer_requests::create_prayer_request),
            ),
    );
}
