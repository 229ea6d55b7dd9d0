use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: String,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
}

fn envelope<T>(status: StatusCode, label: &str, data: Option<T>, message: Option<String>) -> (StatusCode, Json<ApiResponse<T>>) {
    let meta = ResponseMeta {
        status: label.to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
    };

    (status, Json(ApiResponse { data, meta }))
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    envelope(StatusCode::OK, "success", Some(data), None)
}

/// The webhook has not answered yet; clients should poll again.
pub fn loading<T>() -> (StatusCode, Json<ApiResponse<T>>) {
    envelope(
        StatusCode::ACCEPTED,
        "loading",
        None,
        Some("The webhook response is still loading".to_string()),
    )
}

pub fn accepted<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    envelope(StatusCode::ACCEPTED, "accepted", Some(data), None)
}

pub fn error<T>(status: StatusCode, message: String) -> (StatusCode, Json<ApiResponse<T>>) {
    envelope(status, "error", None, Some(message))
}
