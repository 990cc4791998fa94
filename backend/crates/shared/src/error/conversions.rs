//! Error conversions - HTTP response mapping
//!
//! Turns [`AppError`] into an RFC 7807 body and, with the `axum` feature,
//! into a response.

use super::app_error::AppError;

// ============================================================================
// Problem details / Axum conversions (feature-gated)
// ============================================================================

impl AppError {
    /// RFC 7807 Problem Details 形式のボディを構築
    ///
    /// `source` は含めない（サーバーログ専用）。
    pub fn problem_details(&self) -> serde_json::Value {
        serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "category": self.category(),
            "action": self.action(),
        })
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.problem_details())).into_response()
    }
}
