use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::path::Path;

use super::FileService;
use crate::errors::TrackerError;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_stored_name;

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    filename: String,
) -> ActixResult<HttpResponse> {
    // 只接受服务端生成的文件名，拒绝路径穿越
    if let Err(msg) = validate_stored_name(&filename) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::FileNameInvalid, msg)));
    }

    let config = service.get_config(request);
    let file_path = Path::new(&config.upload.dir).join(&filename);

    if !file_path.is_file() {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "File not found",
        )));
    }

    let buf = match std::fs::read(&file_path) {
        Ok(buf) => buf,
        Err(e) => {
            tracing::error!("{}", TrackerError::from(e));
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "File read failed",
                )),
            );
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(buf))
}
