use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::config::AppConfig;
use crate::models::system::responses::HealthResponse;
use crate::models::{AppStartTime, ApiResponse};

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    /// 健康检查，不需要认证
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let system_name = request
            .app_data::<web::Data<AppConfig>>()
            .map(|config| config.app.system_name.clone())
            .unwrap_or_default();

        let started_at = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|t| t.start_datetime)
            .unwrap_or_else(chrono::Utc::now);

        let response = HealthResponse {
            status: "ok".to_string(),
            system_name,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            uptime_seconds: (chrono::Utc::now() - started_at).num_seconds().max(0),
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Service is healthy")))
    }
}
