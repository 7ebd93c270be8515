use axum::{http::header, response::IntoResponse};

/// `GET /health`: liveness only; does not touch the holiday API.
pub async fn health() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], "ok")
}
