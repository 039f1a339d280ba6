pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::assignments::entities::Assignment;
use crate::models::assignments::requests::{CreateAssignmentRequest, UpdateAssignmentRequest};
use crate::models::users::entities::CurrentUser;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct AssignmentService;

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        request
            .app_data::<web::Data<Arc<dyn Storage>>>()
            .expect("Storage not found in app data")
            .get_ref()
            .clone()
    }

    pub(crate) fn get_config(&self, request: &HttpRequest) -> web::Data<AppConfig> {
        request
            .app_data::<web::Data<AppConfig>>()
            .expect("AppConfig not found in app data")
            .clone()
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        req: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, req).await
    }

    pub async fn list_assignments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_assignments(self, request).await
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_assignment(self, request, assignment_id).await
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, request, assignment_id, req).await
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, request, assignment_id).await
    }
}

/// 加载作业并确认当前教师是创建者
///
/// 作业不存在返回 404，不是创建者返回 403。
pub(crate) async fn load_owned_assignment(
    storage: &Arc<dyn Storage>,
    user: &CurrentUser,
    assignment_id: i64,
) -> Result<Assignment, HttpResponse> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => {
            return Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load assignment: {e}"),
                )),
            );
        }
    };

    if assignment.teacher_id != user.id {
        tracing::info!(
            "User {} denied access to assignment {} owned by {}",
            user.id,
            assignment.id,
            assignment.teacher_id
        );
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::AssignmentPermissionDenied,
            "You can only manage your own assignments",
        )));
    }

    Ok(assignment)
}
