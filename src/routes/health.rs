use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::ApiResponse;

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub service: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    };

    Json(ApiResponse::ok("Health check", data))
}
