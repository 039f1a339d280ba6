/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <JWT_TOKEN>` 请求头，确保只有经过身份验证的账户才能访问受保护的路由。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::scope("/api/assignments")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_assignments));
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_current_user(&req)` 取得当前账户。
 *
 * ## 认证流程
 *
 * 1. 缺少或格式错误的 Authorization 头：返回 401 (`Unauthorized`)
 * 2. 签名错误或已过期的令牌：返回 403 (`TokenInvalid`)
 * 3. 令牌有效：将 `CurrentUser` 写入请求扩展，继续处理请求
 *
 * 身份完全来自令牌声明，不查询数据库。签名密钥取自 `web::Data<AppConfig>`。
 */

use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::CurrentUser;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因
#[derive(Debug, PartialEq, Eq)]
enum AuthFailure {
    MissingToken,
    InvalidToken(String),
}

impl AuthFailure {
    fn status(&self) -> StatusCode {
        match self {
            AuthFailure::MissingToken => StatusCode::UNAUTHORIZED,
            AuthFailure::InvalidToken(_) => StatusCode::FORBIDDEN,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            AuthFailure::MissingToken => ErrorCode::Unauthorized,
            AuthFailure::InvalidToken(_) => ErrorCode::TokenInvalid,
        }
    }

    fn message(&self) -> &str {
        match self {
            AuthFailure::MissingToken => "Access token required",
            AuthFailure::InvalidToken(_) => "Invalid token",
        }
    }
}

// 辅助函数：从请求头中取出 Bearer token
fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 辅助函数：提取并验证 JWT token
fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<CurrentUser, AuthFailure> {
    let token = bearer_token(req).ok_or(AuthFailure::MissingToken)?;

    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AuthFailure::InvalidToken("AppConfig not found in app data".into()))?;

    let claims = JwtUtils::verify_token(token, &config.jwt)
        .map_err(|err| AuthFailure::InvalidToken(err.to_string()))?;

    claims
        .to_current_user()
        .ok_or_else(|| AuthFailure::InvalidToken("malformed claims".into()))
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req) {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    info!(
                        "JWT authentication failed for request to {}: {:?}",
                        req.path(),
                        failure
                    );
                    Ok(req.into_response(
                        create_error_response(failure.status(), failure.code(), failure.message())
                            .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取当前账户
impl RequireJWT {
    /// 从请求扩展中提取当前账户
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_current_user(req: &actix_web::HttpRequest) -> Option<CurrentUser> {
        req.extensions().get::<CurrentUser>().cloned()
    }

    /// 从请求扩展中提取账户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<CurrentUser>().map(|user| user.id)
    }
}

/// 从请求扩展中取当前账户，缺失时返回 401
pub(crate) fn require_current_user(
    req: &actix_web::HttpRequest,
) -> Result<CurrentUser, actix_web::HttpResponse> {
    RequireJWT::extract_current_user(req).ok_or_else(|| {
        create_error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            AuthFailure::MissingToken.message(),
        )
    })
}
