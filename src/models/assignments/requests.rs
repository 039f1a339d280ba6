use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

const MAX_TITLE_LEN: usize = 255;

/// 创建作业请求
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    pub max_points: i32,
    #[serde(default)]
    pub allow_late_submissions: bool,
    #[serde(default = "default_require_file_upload")]
    pub require_file_upload: bool,
}

fn default_require_file_upload() -> bool {
    true
}

impl CreateAssignmentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_title(&self.title)?;
        validate_max_points(self.max_points)?;
        Ok(())
    }
}

/// 更新作业请求，缺省字段保持不变
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: Option<i32>,
    pub allow_late_submissions: Option<bool>,
    pub require_file_upload: Option<bool>,
}

impl UpdateAssignmentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(max_points) = self.max_points {
            validate_max_points(max_points)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("Title must not be empty");
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err("Title must be at most 255 characters");
    }
    Ok(())
}

fn validate_max_points(max_points: i32) -> Result<(), &'static str> {
    if max_points <= 0 {
        return Err("maxPoints must be greater than 0");
    }
    Ok(())
}
