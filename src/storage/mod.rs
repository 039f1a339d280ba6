use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    stats::responses::{StudentStats, TeacherStats},
    submissions::{
        entities::{StoredFile, Submission},
        requests::{GradeSubmissionRequest, NewSubmission},
        responses::{SubmissionWithAssignment, SubmissionWithStudent},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 账户管理方法
    // 创建账户，password 字段需已是哈希值；邮箱重复返回 Conflict
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取账户
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取账户
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 作业管理方法
    // 创建作业
    async fn create_assignment(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 列出某教师的作业，按创建时间倒序
    async fn list_assignments_by_teacher(&self, teacher_id: i64) -> Result<Vec<Assignment>>;
    // 列出全部作业，按创建时间倒序
    async fn list_all_assignments(&self) -> Result<Vec<Assignment>>;
    // 更新作业，仅修改请求中给出的字段
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    // 删除作业及其提交，返回被删除提交的文件以便清理磁盘
    async fn delete_assignment(&self, id: i64) -> Result<Option<Vec<StoredFile>>>;

    /// 提交管理方法
    // 创建提交；同一学生同一作业已有提交时返回 Conflict
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 获取学生在某作业下的提交
    async fn get_submission_for_pair(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    // 列出作业下的提交（附学生信息），按提交时间倒序
    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>>;
    // 列出学生的提交（附作业信息），按提交时间倒序
    async fn list_submissions_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<SubmissionWithAssignment>>;
    // 评分，grade/feedback/graded_at 在同一条 UPDATE 中写入
    async fn grade_submission(
        &self,
        id: i64,
        grade: GradeSubmissionRequest,
    ) -> Result<Option<Submission>>;

    /// 统计方法
    async fn teacher_stats(&self, teacher_id: i64) -> Result<TeacherStats>;
    async fn student_stats(&self, student_id: i64) -> Result<StudentStats>;
}

pub async fn create_storage(config: &AppConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async(config).await?;
    Ok(Arc::new(storage))
}
