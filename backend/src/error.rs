//! Error handling for the Warehouse Back-Office Platform
//!
//! Provides consistent error responses in Thai and English. Error codes are
//! stable strings reused by the bulk processors when they downgrade a
//! single-item failure into a report entry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_th: String },

    // Validation errors (rejected before any mutation)
    #[error("{message}")]
    Validation {
        field: String,
        message: String,
        message_th: String,
    },

    #[error("{message}")]
    InvalidQuantity { message: String, message_th: String },

    #[error("{message}")]
    InvalidDate { message: String, message_th: String },

    // Conflict errors (rejected after a state check)
    #[error("{resource} already exists")]
    AlreadyExists { resource: String, message_th: String },

    #[error("{message}")]
    InsufficientStock { message: String, message_th: String },

    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("{0} not found")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Stable error code for the response body and bulk failure entries.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            AppError::InvalidDate { .. } => "INVALID_DATE",
            AppError::AlreadyExists { .. } => "ALREADY_EXISTS",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, message_en, message_th, field) = match &self {
            AppError::Unauthorized {
                message,
                message_th,
            } => (
                StatusCode::UNAUTHORIZED,
                message.clone(),
                message_th.clone(),
                None,
            ),
            AppError::Validation {
                field,
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                message_th.clone(),
                Some(field.clone()),
            ),
            AppError::InvalidQuantity {
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                message_th.clone(),
                None,
            ),
            AppError::InvalidDate {
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                message_th.clone(),
                None,
            ),
            AppError::AlreadyExists {
                resource,
                message_th,
            } => (
                StatusCode::CONFLICT,
                format!("{} already exists", resource),
                message_th.clone(),
                None,
            ),
            AppError::InsufficientStock {
                message,
                message_th,
            } => (
                StatusCode::CONFLICT,
                message.clone(),
                message_th.clone(),
                None,
            ),
            AppError::IllegalTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("Illegal transition from {} to {}", from, to),
                format!("ไม่สามารถเปลี่ยนสถานะจาก {} เป็น {} ได้", from, to),
                None,
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                format!("ไม่พบ {}", resource),
                None,
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred".to_string(),
                "เกิดข้อผิดพลาดกับฐานข้อมูล".to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                None,
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
                "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                None,
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let body = ErrorResponse {
            error: ErrorDetail {
                code,
                message_en,
                message_th,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
