use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::middlewares::require_current_user;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assignments::load_owned_assignment;

/// 列出作业下的提交，仅限作业创建者
pub async fn list_for_assignment(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match require_current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    if let Err(resp) = load_owned_assignment(&storage, &user, assignment_id).await {
        return Ok(resp);
    }

    match storage.list_submissions_by_assignment(assignment_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items,
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list submissions: {e}"),
            )),
        ),
    }
}
