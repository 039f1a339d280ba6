use config::{Config, ConfigError, Environment, File};

use super::AppConfig;

/// 默认允许上传的 MIME 类型
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/zip",
    "text/javascript",
    "text/html",
    "text/css",
];

/// 默认单文件上限 50MB
pub const DEFAULT_MAX_UPLOAD_SIZE: i64 = 50 * 1024 * 1024;

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Self::with_defaults(Config::builder())?
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(File::with_name(&format!("config.{environment}")).required(false))
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("TRACKER")
                    .separator("__")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("upload.dir", std::env::var("UPLOAD_DIR").ok())?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.finalize()
    }

    /// 内置默认值，任何配置源都可以覆盖
    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("app.system_name", "Assignment Tracker")?
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.unix_socket_path", "")?
            .set_default("server.workers", 0)?
            .set_default("server.max_workers", 16)?
            .set_default("server.timeouts.client_request", 30_000)?
            .set_default("server.timeouts.client_disconnect", 5_000)?
            .set_default("server.timeouts.keep_alive", 75)?
            .set_default("server.limits.max_payload_size", 1024 * 1024)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.token_expiry_hours", 24)?
            .set_default("argon2.memory_cost", 19_456)?
            .set_default("argon2.time_cost", 2)?
            .set_default("argon2.parallelism", 1)?
            .set_default("database.url", "sqlite://tracker.db?mode=rwc")?
            .set_default("database.pool_size", 10)?
            .set_default("database.timeout", 30)?
            .set_default("cors.max_age", 3600)?
            .set_default("upload.dir", "uploads")?
            .set_default("upload.max_size", DEFAULT_MAX_UPLOAD_SIZE)?
            .set_default(
                "upload.allowed_types",
                DEFAULT_ALLOWED_TYPES
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>(),
            )?
            .set_default("policy.enforce_file_requirement", true)?
            .set_default("policy.enforce_due_date", true)
    }

    /// 仅使用内置默认值构建配置（测试与工具使用）
    pub fn defaults() -> Result<Self, ConfigError> {
        let config = Self::with_defaults(Config::builder())?.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.finalize()
    }

    /// 处理派生字段
    fn finalize(mut self) -> Result<Self, ConfigError> {
        // 处理工作线程数
        if self.server.workers == 0 {
            self.server.workers = num_cpus::get().min(self.server.max_workers);
        }

        if self.jwt.secret.is_empty() {
            if self.is_production() {
                return Err(ConfigError::Message(
                    "jwt.secret must be set in production (JWT_SECRET)".to_string(),
                ));
            }
            // 开发环境下生成随机密钥，重启后已签发的令牌失效
            self.jwt.secret = generate_random_secret(48);
        }

        Ok(self)
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

/// 生成随机密钥
fn generate_random_secret(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::defaults().expect("defaults should deserialize");
        assert_eq!(config.upload.max_size, 50 * 1024 * 1024);
        assert_eq!(config.upload.allowed_types.len(), 8);
        assert!(
            config
                .upload
                .allowed_types
                .iter()
                .all(|t| t != "image/png")
        );
        assert_eq!(config.jwt.token_expiry_hours, 24);
        assert!(config.policy.enforce_file_requirement);
        assert!(config.policy.enforce_due_date);
        assert!(config.server.workers >= 1);
    }

    #[test]
    fn test_development_secret_is_generated() {
        let config = AppConfig::defaults().expect("defaults should deserialize");
        assert!(config.is_development());
        assert_eq!(config.jwt.secret.len(), 48);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::defaults().expect("defaults should deserialize");
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
    }
}
