pub mod login;
pub mod me;
pub mod register;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, auth::AuthResponse};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

pub struct AuthService;

impl AuthService {
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

    // 登录验证
    pub async fn login(
        &self,
        login_request: crate::models::auth::LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    // 账户注册
    pub async fn register(
        &self,
        create_request: crate::models::users::requests::CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, create_request, request).await
    }

    // 获取当前账户信息
    pub async fn me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        me::handle_me(self, request).await
    }
}

// 签发令牌并组装登录/注册的响应
pub(crate) fn issue_token_response(
    user: User,
    config: &AppConfig,
    message: &str,
) -> HttpResponse {
    match JwtUtils::generate_token(&user, &config.jwt) {
        Ok(token) => {
            let response = AuthResponse {
                token,
                expires_in: JwtUtils::expires_in(&config.jwt),
                user: user.into(),
            };
            HttpResponse::Ok().json(ApiResponse::success(response, message))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "Unable to generate token",
            ))
        }
    }
}
