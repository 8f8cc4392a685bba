use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;

use crate::{posts::PostError, store::StoreError, uploads::UploadError};

/// Errors the client can't do anything about. The details are logged, never
/// sent back outside of debug builds.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not write upload: {0}")]
    Upload(#[from] std::io::Error),
}

/// Errors caused by the request itself, mapped to a 4xx status.
pub trait ApiRequestError: std::fmt::Display {
    fn status_code(&self) -> StatusCode;
}

pub enum AppError {
    ServerError {
        error: ServerError,

        #[cfg(debug_assertions)]
        backtrace: Option<backtrace::Backtrace>,
    },
    RequestError {
        message: String,
        status: StatusCode,
    },
}

impl AppError {
    fn server(error: ServerError) -> Self {
        AppError::ServerError {
            error,

            #[cfg(debug_assertions)]
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    pub fn request<E: ApiRequestError>(e: E) -> Self {
        AppError::RequestError {
            message: e.to_string(),
            status: e.status_code(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    code: &'static str,
    message: String,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_ERR",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => "REQUEST_ERR",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(%error, "request failed with a server error");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: "SERVER_ERR",
                        message: "Internal server error".into(),
                        #[cfg(debug_assertions)]
                        debug_info: Some(HashMap::from([
                            (
                                "backtrace",
                                serde_json::to_value(
                                    backtrace.as_ref().map(filter_backtrace).unwrap_or_default(),
                                )
                                .unwrap_or_default(),
                            ),
                            ("error", Value::String(error.to_string())),
                        ])),
                    },
                )
            }
            AppError::RequestError { message, status } => (
                status,
                ErrorResponse {
                    code: error_code(status),
                    message,
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // The unique index caught a slug that slipped past the pre-check.
            StoreError::DuplicateSlug(_) => AppError::request(PostError::DuplicateSlug),
            e => AppError::server(ServerError::Store(e)),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotAnImage => AppError::request(PostError::NotAnImage),
            UploadError::Io(e) => AppError::server(ServerError::Upload(e)),
        }
    }
}

impl From<PostError> for AppError {
    fn from(e: PostError) -> Self {
        AppError::request(e)
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((message, status): (&'static str, StatusCode)) -> Self {
        AppError::RequestError {
            message: message.into(),
            status,
        }
    }
}

impl From<(String, StatusCode)> for AppError {
    fn from((message, status): (String, StatusCode)) -> Self {
        AppError::RequestError { message, status }
    }
}

#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
