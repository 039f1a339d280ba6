use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 作业标题
    pub title: String,
    // 作业描述
    pub description: String,
    // 截止时间
    pub due_date: DateTime<Utc>,
    // 满分
    pub max_points: i32,
    // 是否允许迟交
    pub allow_late_submissions: bool,
    // 是否必须上传文件
    pub require_file_upload: bool,
    // 所属教师 ID
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// 在 `at` 时刻是否已过截止时间
    pub fn is_past_due(&self, at: DateTime<Utc>) -> bool {
        at > self.due_date
    }

    /// 在 `at` 时刻是否仍接受提交
    pub fn accepts_submission_at(&self, at: DateTime<Utc>) -> bool {
        self.allow_late_submissions || !self.is_past_due(at)
    }
}
