use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET liveness probe for load balancers and uptime checks.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
