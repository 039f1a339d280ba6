use crate::config::JwtConfig;
use crate::models::users::entities::{CurrentUser, Role, User};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // 邮箱
    pub role: String,  // 账户角色
    pub exp: usize,    // Expiration time (时间戳)
    pub iat: usize,    // Issued at (签发时间)
}

impl Claims {
    /// 转换为当前用户身份，sub 或 role 非法时返回 None
    pub fn to_current_user(&self) -> Option<CurrentUser> {
        Some(CurrentUser {
            id: self.sub.parse::<i64>().ok()?,
            email: self.email.clone(),
            role: self.role.parse::<Role>().ok()?,
        })
    }
}

pub struct JwtUtils;

impl JwtUtils {
    /// 令牌有效期（秒）
    pub fn expires_in(config: &JwtConfig) -> i64 {
        chrono::Duration::hours(config.token_expiry_hours).num_seconds()
    }

    // 为账户签发 Token
    pub fn generate_token(
        user: &User,
        config: &JwtConfig,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        Self::generate_token_with_expiry(
            user,
            config,
            chrono::Duration::hours(config.token_expiry_hours),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        user: &User,
        config: &JwtConfig,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 JWT token
    pub fn verify_token(
        token: &str,
        config: &JwtConfig,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }
}
