pub mod download;
pub mod upload;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::TrackerError;
use crate::models::submissions::entities::StoredFile;

pub struct FileService;

impl FileService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self, request: &HttpRequest) -> web::Data<AppConfig> {
        request
            .app_data::<web::Data<AppConfig>>()
            .expect("AppConfig not found in app data")
            .clone()
    }

    // Handle file download
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        filename: String,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, filename).await
    }
}

/// 删除已落盘的文件，失败只记录日志
pub(crate) fn remove_stored_files(upload_dir: &str, files: &[StoredFile]) {
    for file in files {
        let path = Path::new(upload_dir).join(&file.stored_name);
        if let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                "{}",
                TrackerError::file_operation(format!(
                    "Failed to remove {}: {e}",
                    path.display()
                ))
            );
        }
    }
}
