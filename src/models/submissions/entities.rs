use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 已落盘文件的引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "submission.ts")]
pub struct StoredFile {
    /// 服务端生成的文件名，用于 /api/files/{filename}
    pub stored_name: String,
    /// 上传时的原始文件名
    pub original_name: String,
    /// 文件大小（字节）
    pub size: i64,
    /// MIME 类型
    pub content_type: String,
}

/// 提交状态
///
/// 不存在提交记录的状态不在此表示，由存储层查询结果为 `None` 体现。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum SubmissionState {
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub notes: Option<String>,
    pub files: Vec<StoredFile>,
    pub submitted_at: DateTime<Utc>,
    // 以下三项在评分时一并写入
    pub grade: Option<i32>,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn state(&self) -> SubmissionState {
        match self.grade {
            Some(_) => SubmissionState::Graded,
            None => SubmissionState::Submitted,
        }
    }
}
