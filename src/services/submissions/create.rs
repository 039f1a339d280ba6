use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::config::PolicyConfig;
use crate::middlewares::require_current_user;
use crate::models::assignments::entities::Assignment;
use crate::models::submissions::requests::NewSubmission;
use crate::models::users::entities::CurrentUser;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::remove_stored_files;
use crate::services::files::upload::{SubmissionForm, receive_submission_form};

/// 学生提交作业
///
/// 文件先落盘再做业务校验，提交被拒绝时删除本次写入的文件。
pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = match require_current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let config = service.get_config(request);

    let form = match receive_submission_form(payload, &config.upload).await {
        Ok(form) => form,
        Err(e) => return Ok(e.into_response()),
    };

    let files = form.files.clone();
    let response = submit(service, request, &user, &config.policy, form).await;

    if !response.status().is_success() {
        remove_stored_files(&config.upload.dir, &files);
    }

    Ok(response)
}

async fn submit(
    service: &SubmissionService,
    request: &HttpRequest,
    user: &CurrentUser,
    policy: &PolicyConfig,
    form: SubmissionForm,
) -> HttpResponse {
    // 1. 解析作业ID
    let assignment_id = match form
        .assignment_id
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
    {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Invalid submission data: assignmentId is required",
            ));
        }
    };

    let storage = service.get_storage(request);

    // 2. 作业必须存在
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            ));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load assignment: {e}"),
            ));
        }
    };

    // 3. 已提交过则拒绝
    match storage.get_submission_for_pair(assignment_id, user.id).await {
        Ok(Some(_)) => return duplicate_submission(),
        Ok(None) => {}
        Err(e) => {
            return HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to check existing submission: {e}"),
            ));
        }
    }

    // 4. 提交策略
    if let Err(resp) = check_policy(&assignment, policy, &form, chrono::Utc::now()) {
        return resp;
    }

    // 5. 写入，唯一索引兜住并发提交
    let new_submission = NewSubmission {
        assignment_id,
        student_id: user.id,
        notes: form.notes,
        files: form.files,
    };

    match storage.create_submission(new_submission).await {
        Ok(submission) => {
            tracing::info!(
                "Student {} submitted assignment {} ({} files)",
                user.id,
                assignment_id,
                submission.files.len()
            );
            HttpResponse::Ok().json(ApiResponse::success(
                submission,
                "Submission created successfully",
            ))
        }
        Err(e) if e.is_conflict() => duplicate_submission(),
        Err(e) => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Failed to create submission: {e}"),
        )),
    }
}

fn duplicate_submission() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::DuplicateSubmission,
        "Assignment already submitted",
    ))
}

/// 截止时间与必交文件检查，可分别通过 policy 配置关闭
fn check_policy(
    assignment: &Assignment,
    policy: &PolicyConfig,
    form: &SubmissionForm,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), HttpResponse> {
    if policy.enforce_due_date && !assignment.accepts_submission_at(now) {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::SubmissionPastDue,
            "The due date for this assignment has passed",
        )));
    }

    if policy.enforce_file_requirement && assignment.require_file_upload && form.files.is_empty()
    {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::SubmissionFileRequired,
            "This assignment requires at least one file",
        )));
    }

    Ok(())
}
