use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::middlewares::require_current_user;
use crate::models::submissions::entities::SubmissionState;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::assignments::load_owned_assignment;

/// 评分
/// PUT /api/submissions/{id}/grade
///
/// 只有提交所属作业的创建者可以评分；重复评分直接覆盖。
pub async fn grade_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    req: GradeSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let user = match require_current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    // 获取提交信息
    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(sub)) => sub,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load submission: {e}"),
                )),
            );
        }
    };

    // 权限验证
    if let Err(resp) = load_owned_assignment(&storage, &user, submission.assignment_id).await {
        return Ok(resp);
    }

    if let Err(msg) = req.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::GradeInvalid, msg)));
    }

    // 评分前的状态决定这次是首次评分还是覆盖
    let previous = submission.state();

    match storage.grade_submission(submission_id, req).await {
        Ok(Some(graded)) => {
            match previous {
                SubmissionState::Submitted => tracing::info!(
                    "Submission {} graded {:?} by teacher {}",
                    graded.id,
                    graded.grade,
                    user.id
                ),
                SubmissionState::Graded => tracing::info!(
                    "Submission {} re-graded {:?} -> {:?} by teacher {}",
                    graded.id,
                    submission.grade,
                    graded.grade,
                    user.id
                ),
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(graded, grade_message(previous))))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to grade submission: {e}"),
            )),
        ),
    }
}

fn grade_message(previous: SubmissionState) -> &'static str {
    match previous {
        SubmissionState::Submitted => "Submission graded successfully",
        SubmissionState::Graded => "Submission re-graded successfully",
    }
}
