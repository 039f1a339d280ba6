use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_owned_assignment};
use crate::middlewares::require_current_user;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::remove_stored_files;

pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match require_current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    // 权限检查：只有作业创建者才能删除
    if let Err(resp) = load_owned_assignment(&storage, &user, assignment_id).await {
        return Ok(resp);
    }

    match storage.delete_assignment(assignment_id).await {
        Ok(Some(files)) => {
            // 数据库已提交，磁盘清理失败只记录日志
            let config = service.get_config(request);
            remove_stored_files(&config.upload.dir, &files);

            tracing::info!(
                "Assignment {} deleted by teacher {} ({} files removed)",
                assignment_id,
                user.id,
                files.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assignment deleted successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to delete assignment: {e}"),
            )),
        ),
    }
}
