use serde::Deserialize;
use ts_rs::TS;

use super::entities::StoredFile;

/// 评分请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeSubmissionRequest {
    /// 分数，不得为负；允许超过作业满分
    pub grade: i32,
    pub feedback: Option<String>,
}

impl GradeSubmissionRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.grade < 0 {
            return Err("Grade must be greater than or equal to 0");
        }
        Ok(())
    }
}

// 用于存储层的内部创建参数
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub notes: Option<String>,
    pub files: Vec<StoredFile>,
}
