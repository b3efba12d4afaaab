//! Health check handler.

/// Body returned by the health endpoint.
pub const HEALTH_MESSAGE: &str = "App is in good shape!";

/// Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/api/Health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = String, example = json!("App is in good shape!"))
    )
)]
pub async fn health_check() -> &'static str {
    HEALTH_MESSAGE
}
