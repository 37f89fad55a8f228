//! Request extractors whose rejections render through [`ApiError`], so a
//! malformed body or query answers `400 {"detail": ..}` like every other error.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
