use crate::handlers::small_groups;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/small-groups")
            .route("", web::get().to(small_groups::list_small_groups))
            .route("", web::post().to(small_groups::create_small_group))
            .route("/{id}", web::get().to(small_groups::get_small_group))
            .route("/{id}", web::put().to(small_groups::update_small_group))
            .route("/{id}", web::delete().to(small_groups::delete_small_group)),
    );
}
