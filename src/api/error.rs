//! HTTP mapping for core errors

use autodiag_core::{DiagnosisResponse, Error};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// A core error on its way out as an `{ ok: false, ... }` envelope
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(DiagnosisResponse::failure(&self.0))).into_response()
    }
}
