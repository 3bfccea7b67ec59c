// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes shared by the capture store and the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Requested offset is beyond the configured retention; it will never have data.
    OutOfRange,
    /// Requested offset is within retention but not enough captures yet.
    NoData,
    BadRequest,
    /// Rejected at construction (e.g. zero retention).
    InvalidConfig,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::OutOfRange => 416,
            Self::NoData => 404,
            Self::BadRequest => 400,
            Self::InvalidConfig => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::NoData => "NO_DATA",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidConfig => "INVALID_CONFIG",
        }
    }

    /// Human-readable text shown in the viewer.
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfRange => "Index outside the range",
            Self::NoData => "No data",
            Self::BadRequest => "Bad request",
            Self::InvalidConfig => "Invalid configuration",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ErrorCode {}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
