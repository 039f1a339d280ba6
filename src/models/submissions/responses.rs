use serde::Serialize;
use ts_rs::TS;

use super::entities::Submission;
use crate::models::assignments::entities::Assignment;
use crate::models::users::responses::UserProfile;

/// 教师视角：提交 + 学生信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub student: UserProfile,
}

/// 学生视角：提交 + 作业信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionWithAssignment {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub assignment: Assignment,
}
