//! Extractors whose rejections render as [`ApiError`]
//!
//! A malformed body or a non-numeric path id becomes
//! `400 {"error": "..."}` instead of axum's plain-text rejection.

use crate::error::ApiError;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

/// JSON body extractor
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
