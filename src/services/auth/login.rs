use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{ApiResponse, ErrorCode, auth::LoginRequest};
use crate::utils::password::verify_password;
use crate::utils::validate::{validate_email, validate_password};

use super::{AuthService, issue_token_response};

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config(request);

    // 1. 请求格式校验
    let email = login_request.email.trim();
    if let Err(msg) = validate_email(email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }
    if let Err(msg) = validate_password(&login_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    // 2. 根据邮箱获取账户
    match storage.get_user_by_email(email).await {
        Ok(Some(user)) => {
            // 3. 验证密码
            if verify_password(&login_request.password, &user.password_hash) {
                tracing::info!("User {} logged in successfully", user.id);
                Ok(issue_token_response(user, &config, "Login successful"))
            } else {
                Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::AuthFailed,
                    "Invalid credentials",
                )))
            }
        }
        Ok(None) => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            "Invalid credentials",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Login failed: {e}"),
            )),
        ),
    }
}
