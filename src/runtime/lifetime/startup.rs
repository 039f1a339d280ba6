use actix_web::web;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::{Result, TrackerError};
use crate::models::AppStartTime;
use crate::routes;
use crate::storage::Storage;
use crate::utils::{json_error_handler, path_error_handler};

/// 服务启动所需的共享状态
///
/// 每个 worker 通过 [`StartupContext::configure`] 注册同一份存储和配置。
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub config: web::Data<AppConfig>,
    pub start_time: web::Data<AppStartTime>,
}

impl StartupContext {
    /// 注册应用数据、参数错误处理器和全部路由
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler)) // 设置JSON错误处理器
            .app_data(web::PathConfig::default().error_handler(path_error_handler)) // 设置路径参数错误处理器
            .app_data(web::PayloadConfig::new(
                self.config.server.limits.max_payload_size,
            )) // 设置最大请求体大小
            .app_data(web::Data::new(self.storage.clone()))
            .app_data(self.config.clone())
            .app_data(self.start_time.clone())
            .configure(routes::configure_auth_routes) // 配置认证相关路由
            .configure(routes::configure_assignment_routes) // 配置作业相关路由
            .configure(routes::configure_submission_routes) // 配置提交相关路由
            .configure(routes::configure_stats_routes) // 配置统计相关路由
            .configure(routes::configure_file_routes) // 配置文件相关路由
            .configure(routes::configure_system_routes); // 配置系统相关路由
    }
}

/// 准备服务器启动的上下文
/// 包括上传目录、存储和迁移
pub async fn prepare_server_startup(
    config: AppConfig,
    start_time: AppStartTime,
) -> Result<StartupContext> {
    // 已安装过 provider 时忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    std::fs::create_dir_all(&config.upload.dir).map_err(|e| {
        TrackerError::file_operation(format!(
            "Failed to create upload dir {}: {e}",
            config.upload.dir
        ))
    })?;
    debug!("Upload directory ready: {}", config.upload.dir);

    let storage = crate::storage::create_storage(&config).await?;
    warn!("Storage backend initialized and migrations completed");

    Ok(StartupContext {
        storage,
        config: web::Data::new(config),
        start_time: web::Data::new(start_time),
    })
}
