//! 统计查询

use super::SeaOrmStorage;
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::submissions::{Column, Entity as Submissions};
use crate::errors::{Result, TrackerError};
use crate::models::stats::responses::{StudentStats, TeacherStats};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait,
};

impl SeaOrmStorage {
    /// 教师统计，汇总其全部作业
    pub async fn teacher_stats_impl(&self, teacher_id: i64) -> Result<TeacherStats> {
        let total_assignments = Assignments::find()
            .filter(AssignmentColumn::TeacherId.eq(teacher_id))
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计作业数量失败: {e}")))?;

        let owned_submissions = || {
            Submissions::find()
                .join(
                    JoinType::InnerJoin,
                    crate::entity::submissions::Relation::Assignment.def(),
                )
                .filter(AssignmentColumn::TeacherId.eq(teacher_id))
        };

        let total_submissions = owned_submissions()
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计提交数量失败: {e}")))?;

        let pending_reviews = owned_submissions()
            .filter(Column::Grade.is_null())
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计待批改数量失败: {e}")))?;

        Ok(TeacherStats {
            total_assignments,
            total_submissions,
            pending_reviews,
        })
    }

    /// 学生统计
    pub async fn student_stats_impl(&self, student_id: i64) -> Result<StudentStats> {
        let total_assignments = Assignments::find()
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计作业数量失败: {e}")))?;

        let submitted = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计提交数量失败: {e}")))?;

        let ungraded = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Grade.is_null())
            .count(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("统计待批改数量失败: {e}")))?;

        Ok(StudentStats::from_counts(
            total_assignments,
            submitted,
            ungraded,
        ))
    }
}
