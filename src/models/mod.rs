//! API 数据模型
//!
//! 每个业务域拆分为 `entities`（业务实体）、`requests`（请求体）、`responses`（响应体）。

pub mod auth {
    pub mod requests;
    pub mod responses;

    pub use requests::LoginRequest;
    pub use responses::AuthResponse;
}

pub mod users {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod assignments {
    pub mod entities;
    pub mod requests;
}

pub mod submissions {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod stats {
    pub mod responses;
}

pub mod system {
    pub mod responses;
}

pub mod common {
    pub mod response;

    pub use response::ApiResponse;
}

pub use common::ApiResponse;

/// 业务错误代码
///
/// 作为响应体中的 `code` 字段返回，前端据此区分错误原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 认证
    AuthFailed = 2000,
    TokenInvalid = 2001,
    RegisterFailed = 2002,

    // 账户
    UserNotFound = 3000,
    UserEmailInvalid = 3001,
    UserEmailAlreadyExists = 3002,
    UserPasswordInvalid = 3003,
    UserNameInvalid = 3004,

    // 作业
    AssignmentNotFound = 4000,
    AssignmentInvalid = 4001,
    AssignmentPermissionDenied = 4002,

    // 提交
    SubmissionNotFound = 5000,
    DuplicateSubmission = 5001,
    SubmissionPastDue = 5002,
    SubmissionFileRequired = 5003,
    GradeInvalid = 5004,

    // 文件
    FileNotFound = 6000,
    FileTypeNotAllowed = 6001,
    FileSizeExceeded = 6002,
    FileUploadFailed = 6003,
    FileNameInvalid = 6004,
}

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
