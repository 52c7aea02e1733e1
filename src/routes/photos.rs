use crate::handlers::photos;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/photos/{path:.*}", web::get().to(photos::serve_photo));
}
