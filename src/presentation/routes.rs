use crate::presentation::auth::{login, register};
use crate::presentation::handlers::{
    create_note, form_error_handler, health_check, json_error_handler, list_notes,
    query_error_handler,
};
use actix_web::web;

pub const ROUTES: &str = "GET /health, POST /users/, POST /token, POST /notes/, GET /notes/";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/health", web::get().to(health_check))
        .route("/users/", web::post().to(register))
        .route("/token", web::post().to(login))
        .route("/notes/", web::post().to(create_note))
        .route("/notes/", web::get().to(list_notes));
}
