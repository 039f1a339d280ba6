//! 提交存储操作

use std::collections::{HashMap, HashSet};

use super::{SeaOrmStorage, write_error};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, TrackerError};
use crate::models::{
    submissions::{
        entities::Submission,
        requests::{GradeSubmissionRequest, NewSubmission},
        responses::{SubmissionWithAssignment, SubmissionWithStudent},
    },
    users::responses::UserProfile,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建提交
    ///
    /// (assignment_id, student_id) 上有唯一索引，并发重复提交只有一条能写入，
    /// 其余返回 Conflict。
    pub async fn create_submission_impl(&self, req: NewSubmission) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();
        let files = serde_json::to_string(&req.files)?;

        let model = ActiveModel {
            assignment_id: Set(req.assignment_id),
            student_id: Set(req.student_id),
            notes: Set(req.notes),
            files: Set(files),
            submitted_at: Set(now),
            grade: Set(None),
            feedback: Set(None),
            graded_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建提交失败", e))?;

        result.into_submission()
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 获取学生在某作业下的提交
    pub async fn get_submission_for_pair_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询提交失败: {e}")))?;

        result.map(|m| m.into_submission()).transpose()
    }

    /// 列出作业下的提交，并附带学生信息
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        let submissions = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询提交列表失败: {e}")))?;

        // 批量查询学生信息
        let student_ids: Vec<i64> = submissions
            .iter()
            .map(|s| s.student_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let students: HashMap<i64, UserProfile> = Users::find()
            .filter(UserColumn::Id.is_in(student_ids))
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询学生信息失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u.into_user())))
            .collect();

        let mut items = Vec::with_capacity(submissions.len());
        for model in submissions {
            // 外键保证学生存在，缺失时跳过该条
            let Some(student) = students.get(&model.student_id).cloned() else {
                continue;
            };
            items.push(SubmissionWithStudent {
                submission: model.into_submission()?,
                student,
            });
        }

        Ok(items)
    }

    /// 列出学生的提交，并附带作业信息
    pub async fn list_submissions_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<SubmissionWithAssignment>> {
        let submissions = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询提交列表失败: {e}")))?;

        // 批量查询作业信息
        let assignment_ids: Vec<i64> = submissions
            .iter()
            .map(|s| s.assignment_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let assignments: HashMap<i64, _> = Assignments::find()
            .filter(AssignmentColumn::Id.is_in(assignment_ids))
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业信息失败: {e}")))?
            .into_iter()
            .map(|a| (a.id, a.into_assignment()))
            .collect();

        let mut items = Vec::with_capacity(submissions.len());
        for model in submissions {
            let Some(assignment) = assignments.get(&model.assignment_id).cloned() else {
                continue;
            };
            items.push(SubmissionWithAssignment {
                submission: model.into_submission()?,
                assignment,
            });
        }

        Ok(items)
    }

    /// 评分
    ///
    /// 三个字段在一条 UPDATE 中写入，并发评分时最终结果总是某一次评分的完整值。
    /// 提交不存在时返回 `None`。
    pub async fn grade_submission_impl(
        &self,
        id: i64,
        req: GradeSubmissionRequest,
    ) -> Result<Option<Submission>> {
        let now = chrono::Utc::now().timestamp();

        let result = Submissions::update_many()
            .col_expr(Column::Grade, Expr::value(req.grade))
            .col_expr(Column::Feedback, Expr::value(req.feedback))
            .col_expr(Column::GradedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("评分失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_submission_by_id_impl(id).await
    }
}
