//! 参数解析失败时的统一响应
//!
//! 注册到 `JsonConfig` / `PathConfig`，把 actix 默认的纯文本 400 换成 ApiResponse 信封。

use actix_web::{HttpRequest, HttpResponse, error};

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let message = match &err {
        error::JsonPayloadError::ContentType => {
            "Content type must be application/json".to_string()
        }
        error::JsonPayloadError::Overflow { .. }
        | error::JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        error::JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
        other => format!("Invalid JSON payload: {other}"),
    };

    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    error::InternalError::from_response(err, response).into()
}

pub fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
    let message = format!("Invalid path parameter: {err}");
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    error::InternalError::from_response(err, response).into()
}
