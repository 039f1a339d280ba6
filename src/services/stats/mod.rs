use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::middlewares::require_current_user;
use crate::models::stats::responses::StatsResponse;
use crate::models::users::entities::Role;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct StatsService;

impl StatsService {
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

    /// 按角色返回统计
    pub async fn get_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match require_current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };

        let storage = self.get_storage(request);

        let result = match user.role {
            Role::Teacher => storage
                .teacher_stats(user.id)
                .await
                .map(StatsResponse::Teacher),
            Role::Student => storage
                .student_stats(user.id)
                .await
                .map(StatsResponse::Student),
        };

        match result {
            Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                stats,
                "Stats retrieved successfully",
            ))),
            Err(e) => Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load stats: {e}"),
                )),
            ),
        }
    }
}
