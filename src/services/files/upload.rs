//! 提交表单的 multipart 解析
//!
//! 文件边接收边写入上传目录；任一环节失败时，本次请求已写入的文件全部删除。

use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::remove_stored_files;
use crate::config::UploadConfig;
use crate::errors::TrackerError;
use crate::models::submissions::entities::StoredFile;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::file_magic::extension_for;
use crate::utils::validate_magic_bytes;

// 文本字段上限
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;
// 魔术字节检查需要的头部长度
const MAGIC_HEAD_LEN: usize = 8;

/// 解析后的提交表单
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub assignment_id: Option<String>,
    pub notes: Option<String>,
    pub files: Vec<StoredFile>,
}

/// 接收失败原因
#[derive(Debug)]
pub enum UploadError {
    TypeNotAllowed(String),
    ContentMismatch(String),
    SizeExceeded(String),
    EmptyFile(String),
    Malformed(String),
    Io(TrackerError),
}

impl UploadError {
    pub fn into_response(self) -> HttpResponse {
        match self {
            UploadError::TypeNotAllowed(name) => {
                HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileTypeNotAllowed,
                    format!("Invalid file type: {name}"),
                ))
            }
            UploadError::ContentMismatch(name) => {
                HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileTypeNotAllowed,
                    format!("File content does not match its type: {name}"),
                ))
            }
            UploadError::SizeExceeded(name) => {
                HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    format!("File size exceeds the limit: {name}"),
                ))
            }
            UploadError::EmptyFile(name) => HttpResponse::BadRequest().json(
                ApiResponse::error_empty(ErrorCode::BadRequest, format!("File is empty: {name}")),
            ),
            UploadError::Malformed(msg) => HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
            UploadError::Io(e) => {
                tracing::error!("{}", e);
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::FileUploadFailed,
                    "Failed to store uploaded file",
                ))
            }
        }
    }
}

/// 读取提交表单：`assignmentId`、`notes` 文本字段和任意个 `files` 文件字段
pub async fn receive_submission_form(
    mut payload: Multipart,
    config: &UploadConfig,
) -> Result<SubmissionForm, UploadError> {
    // 确保上传目录存在
    if let Err(e) = fs::create_dir_all(&config.dir) {
        return Err(UploadError::Io(TrackerError::file_operation(format!(
            "Failed to create upload dir: {e}"
        ))));
    }

    let mut form = SubmissionForm::default();

    loop {
        let field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                remove_stored_files(&config.dir, &form.files);
                return Err(UploadError::Malformed(format!("Invalid multipart body: {e}")));
            }
        };

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        let result = match name.as_str() {
            "files" | "files[]" | "file" => match save_file_field(field, config).await {
                Ok(stored) => {
                    form.files.push(stored);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "assignmentId" => read_text_field(field)
                .await
                .map(|v| form.assignment_id = Some(v)),
            "notes" => read_text_field(field).await.map(|v| {
                // 空备注视为未填写
                form.notes = Some(v).filter(|s| !s.trim().is_empty());
            }),
            _ => drain_field(field).await,
        };

        if let Err(e) = result {
            remove_stored_files(&config.dir, &form.files);
            return Err(e);
        }
    }

    Ok(form)
}

async fn read_text_field(mut field: Field) -> Result<String, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| UploadError::Malformed(format!("Invalid field: {e}")))?;
        if buf.len() + data.len() > MAX_TEXT_FIELD_SIZE {
            return Err(UploadError::Malformed("Form field is too large".to_string()));
        }
        buf.extend_from_slice(&data);
    }
    String::from_utf8(buf).map_err(|_| UploadError::Malformed("Form field is not UTF-8".into()))
}

async fn drain_field(mut field: Field) -> Result<(), UploadError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| UploadError::Malformed(format!("Invalid field: {e}")))?;
    }
    Ok(())
}

// 客户端文件名只保留最后一段
fn client_file_name(field: &Field) -> String {
    field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(|name| name.chars().take(255).collect::<String>())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "file".to_string())
}

async fn save_file_field(
    mut field: Field,
    config: &UploadConfig,
) -> Result<StoredFile, UploadError> {
    let original_name = client_file_name(&field);

    // MIME 白名单，忽略参数部分
    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_ascii_lowercase())
        .unwrap_or_default();

    if !config
        .allowed_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&content_type))
    {
        drain_field(field).await?;
        return Err(UploadError::TypeNotAllowed(original_name));
    }

    let stored_name = format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp(),
        Uuid::new_v4(),
        extension_for(&content_type)
    );
    let file_path: PathBuf = Path::new(&config.dir).join(&stored_name);

    let mut f = File::create(&file_path).map_err(|e| UploadError::Io(e.into()))?;

    let outcome = write_field(&mut field, &mut f, config.max_size, &content_type).await;
    drop(f);

    match outcome {
        Ok(size) => Ok(StoredFile {
            stored_name,
            original_name,
            size: size as i64,
            content_type,
        }),
        Err(kind) => {
            let _ = fs::remove_file(&file_path);
            Err(match kind {
                WriteFailure::TooLarge => UploadError::SizeExceeded(original_name),
                WriteFailure::Mismatch => UploadError::ContentMismatch(original_name),
                WriteFailure::Empty => UploadError::EmptyFile(original_name),
                WriteFailure::Stream(msg) => UploadError::Malformed(msg),
                WriteFailure::Io(e) => UploadError::Io(e),
            })
        }
    }
}

enum WriteFailure {
    TooLarge,
    Mismatch,
    Empty,
    Stream(String),
    Io(TrackerError),
}

async fn write_field(
    field: &mut Field,
    f: &mut File,
    max_size: usize,
    content_type: &str,
) -> Result<usize, WriteFailure> {
    let mut total_size: usize = 0;
    let mut head: Vec<u8> = Vec::with_capacity(MAGIC_HEAD_LEN);
    let mut checked = false;

    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| WriteFailure::Stream(format!("Invalid file field: {e}")))?;

        // 凑够头部字节后验证魔术字节
        if !checked {
            let take = (MAGIC_HEAD_LEN - head.len()).min(data.len());
            head.extend_from_slice(&data[..take]);
            if head.len() >= MAGIC_HEAD_LEN {
                checked = true;
                if !validate_magic_bytes(&head, content_type) {
                    return Err(WriteFailure::Mismatch);
                }
            }
        }

        total_size += data.len();
        // 校验大小
        if total_size > max_size {
            return Err(WriteFailure::TooLarge);
        }
        f.write_all(&data).map_err(|e| WriteFailure::Io(e.into()))?;
    }

    if total_size == 0 {
        return Err(WriteFailure::Empty);
    }
    if !checked && !validate_magic_bytes(&head, content_type) {
        return Err(WriteFailure::Mismatch);
    }

    Ok(total_size)
}
