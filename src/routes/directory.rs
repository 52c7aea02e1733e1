use crate::handlers::directory;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/directory", web::get().to(directory::get_directory));
}
