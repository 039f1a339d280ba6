use serde::Serialize;
use ts_rs::TS;

/// 教师统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "stats.ts")]
pub struct TeacherStats {
    pub total_assignments: u64,
    pub total_submissions: u64,
    pub pending_reviews: u64,
}

/// 学生统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "stats.ts")]
pub struct StudentStats {
    /// 全部作业数减去已提交数，不区分是否已过截止时间
    pub active_assignments: u64,
    pub completed_assignments: u64,
    pub pending_grading: u64,
}

impl StudentStats {
    pub fn from_counts(total_assignments: u64, submitted: u64, ungraded: u64) -> Self {
        Self {
            active_assignments: total_assignments.saturating_sub(submitted),
            completed_assignments: submitted,
            pending_grading: ungraded,
        }
    }
}

/// 按角色返回的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "stats.ts")]
pub enum StatsResponse {
    Teacher(TeacherStats),
    Student(StudentStats),
}
