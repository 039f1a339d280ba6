//! 作业存储操作

use super::{SeaOrmStorage, write_error};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{Result, TrackerError};
use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    submissions::entities::StoredFile,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            due_date: Set(req.due_date.timestamp_millis()),
            max_points: Set(req.max_points),
            allow_late_submissions: Set(req.allow_late_submissions),
            require_file_upload: Set(req.require_file_upload),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建作业失败", e))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 列出作业，指定教师时只返回其创建的作业
    pub async fn list_assignments_impl(&self, teacher_id: Option<i64>) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find();

        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let results = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        // 先检查作业是否存在
        if self.get_assignment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }

        if let Some(description) = update.description {
            model.description = Set(description);
        }

        if let Some(due_date) = update.due_date {
            model.due_date = Set(due_date.timestamp_millis());
        }

        if let Some(max_points) = update.max_points {
            model.max_points = Set(max_points);
        }

        if let Some(allow_late) = update.allow_late_submissions {
            model.allow_late_submissions = Set(allow_late);
        }

        if let Some(require_file) = update.require_file_upload {
            model.require_file_upload = Set(require_file);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新作业失败", e))?;

        Ok(Some(result.into_assignment()))
    }

    /// 删除作业
    ///
    /// 作业和它的提交在同一事务中删除。返回被删除提交引用的文件，
    /// 由调用方在事务提交后清理磁盘。作业不存在时返回 `None`。
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<Option<Vec<StoredFile>>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TrackerError::database_operation(format!("开启事务失败: {e}")))?;

        let submissions = Submissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(id))
            .all(&txn)
            .await
            .map_err(|e| TrackerError::database_operation(format!("查询作业提交失败: {e}")))?;

        let mut files = Vec::new();
        for submission in submissions {
            files.extend(submission.into_submission()?.files);
        }

        Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TrackerError::database_operation(format!("删除作业提交失败: {e}")))?;

        let result = Assignments::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| TrackerError::database_operation(format!("删除作业失败: {e}")))?;

        if result.rows_affected == 0 {
            // 作业不存在，放弃事务
            txn.rollback()
                .await
                .map_err(|e| TrackerError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        txn.commit()
            .await
            .map_err(|e| TrackerError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(files))
    }
}
