use crate::models::users::responses::UserProfile;
use serde::Serialize;
use ts_rs::TS;

// 登录/注册响应
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "auth.ts")]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64, // 秒
    pub user: UserProfile,
}
