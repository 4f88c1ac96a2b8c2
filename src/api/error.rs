//! HTTP mapping for [`MarketError`].
//!
//! Every failure kind maps to a stable `{code, message}` pair;
//! `insufficient_stock` additionally carries the maximum available quantity so
//! clients can retry with a corrected value.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::MarketError;

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = match &self {
            MarketError::InvalidQuantity => StatusCode::BAD_REQUEST,
            MarketError::Unauthorized => StatusCode::UNAUTHORIZED,
            MarketError::ProductNotFound
            | MarketError::CategoryNotFound
            | MarketError::ArtisanNotFound
            | MarketError::CartNotFound
            | MarketError::ItemNotFound => StatusCode::NOT_FOUND,
            MarketError::InsufficientStock { .. } | MarketError::CartConflict => {
                StatusCode::CONFLICT
            }
            MarketError::Storage(e) => {
                tracing::error!("storage failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut body = json!({ "code": self.code(), "message": self.to_string() });
        if let MarketError::InsufficientStock { available } = &self {
            body["max_available"] = json!(available);
        }
        (status, Json(json!({ "error": body }))).into_response()
    }
}
