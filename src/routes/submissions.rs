use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::users::entities::Role;
use crate::services::SubmissionService;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 提交作业
pub async fn create_submission(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.create_submission(&req, payload).await
}

// 评分
pub async fn grade_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade_submission(&req, path.into_inner(), body.into_inner())
        .await
}

// 我的提交
pub async fn list_my_submissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.list_mine(&req).await
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/submissions")
            .wrap(middlewares::RequireJWT)
            // 提交作业 - 仅学生
            .service(
                web::resource("")
                    .route(web::post().to(create_submission))
                    .wrap(middlewares::RequireRole::new(Role::Student)),
            )
            // 评分 - 仅教师，业务层检查是否为作业创建者
            .service(
                web::resource("/{id}/grade")
                    .route(web::put().to(grade_submission))
                    .wrap(middlewares::RequireRole::new(Role::Teacher)),
            ),
    )
    .service(
        web::resource("/api/my-submissions")
            .route(web::get().to(list_my_submissions))
            .wrap(middlewares::RequireRole::new(Role::Student))
            .wrap(middlewares::RequireJWT),
    );
}
