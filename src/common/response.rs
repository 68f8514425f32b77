use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper
///
/// Provides a consistent response format for JSON endpoints.
///
/// # Example
/// ```
/// use sail::common::ApiResponse;
/// use axum::http::StatusCode;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: String,
/// }
///
/// async fn get_user(id: String) -> ApiResponse<User> {
///     if id == "1" {
///         ApiResponse::success(User { id })
///     } else {
///         ApiResponse::error(StatusCode::NOT_FOUND, "User not found")
///     }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    pub success: bool,

    #[serde(skip)]
    pub http_status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data
    ///
    /// Defaults to HTTP 200 OK.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            http_status: StatusCode::OK,
        }
    }

    /// Create an error response
    ///
    /// The error `code` is the status' canonical reason, e.g. `"Not Found"`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ApiError {
                code: status.canonical_reason().unwrap_or("Unknown").to_string(),
                message: message.into(),
            }),
            success: false,
            http_status: status,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.http_status = status;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
