pub mod create;
pub mod grade;
pub mod list;
pub mod mine;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::storage::Storage;

pub struct SubmissionService;

impl SubmissionService {
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

    /// 学生提交作业
    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, payload).await
    }

    /// 列出作业下的全部提交（教师）
    pub async fn list_for_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_for_assignment(self, request, assignment_id).await
    }

    /// 列出当前学生的提交
    pub async fn list_mine(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        mine::list_mine(self, request).await
    }

    /// 评分（教师）
    pub async fn grade_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        req: GradeSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, request, submission_id, req).await
    }
}
