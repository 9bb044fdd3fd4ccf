use axum::response::IntoResponse;

/// Greet the client. Handy as a liveness check.
pub async fn get_hello() -> impl IntoResponse {
    "Hello World"
}
