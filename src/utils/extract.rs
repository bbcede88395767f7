// src/utils/extract.rs

use axum::extract::{FromRequestParts, Path, Query};

use crate::error::AppError;

/// `Query` whose rejections render as `AppError::Validation`.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` whose rejections render as `AppError::Validation`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
