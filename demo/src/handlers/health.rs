use actix_web::{get, web, HttpResponse};
use kit_http::JsonWriter;
use serde::Serialize;

use crate::store::UserStore;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub users: usize,
    pub active_sessions: usize,
}

#[get("/health")]
pub async fn health_check(writer: web::Data<JsonWriter>, store: web::Data<UserStore>) -> HttpResponse {
    writer.ok(&HealthCheckResponse {
        status: "ok",
        users: store.user_count(),
        active_sessions: store.session_count(),
    })
}
