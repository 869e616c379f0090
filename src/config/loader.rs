use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 内置默认值，保证没有配置文件时也能启动
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("app.system_name", "Rust LMS")?
        .set_default("app.environment", "development")?
        .set_default("app.log_level", "info")?
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.unix_socket_path", "")?
        .set_default("server.workers", 0)?
        .set_default("server.max_workers", 16)?
        .set_default("server.timeouts.client_request", 5000)?
        .set_default("server.timeouts.client_disconnect", 1000)?
        .set_default("server.timeouts.keep_alive", 30)?
        .set_default("server.limits.max_payload_size", 52_428_800)?
        .set_default("session.secret", "")?
        .set_default("session.max_age_days", 7)?
        .set_default("session.selection_minutes", 60)?
        .set_default("session.secure", false)?
        .set_default("database.url", "sqlite://lms.db?mode=rwc")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 3306)?
        .set_default("database.user", "root")?
        .set_default("database.password", "")?
        .set_default("database.name", "lms")?
        .set_default("database.pool_size", 10)?
        .set_default("database.timeout", 10)?
        .set_default("cache.type", "moka")?
        .set_default("cache.default_ttl", 300)?
        .set_default("cache.memory.max_capacity", 10_000)?
        .set_default("cors.allowed_origins", Vec::<String>::new())?
        .set_default("cors.max_age", 3600)?
        .set_default("upload.dir", "public")?
        .set_default("upload.max_size", 20_971_520)?
        .set_default(
            "upload.allowed_types",
            vec![
                ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".txt", ".md", ".csv",
                ".zip", ".7z", ".rar", ".png", ".jpg", ".jpeg", ".gif", ".webp",
            ],
        )?
        .set_default("argon2.memory_cost", 19_456)?
        .set_default("argon2.time_cost", 2)?
        .set_default("argon2.parallelism", 1)
}

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = with_defaults(Config::builder())?
            .add_source(File::with_name("config").required(false))
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(
                Environment::with_prefix("LMS")
                    .separator("_")
                    .try_parsing(true),
            );

        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("session.secret", std::env::var("SESSION_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("database.host", std::env::var("DB_HOST").ok())?
            .set_override_option("database.port", std::env::var("DB_PORT").ok())?
            .set_override_option("database.user", std::env::var("DB_USER").ok())?
            .set_override_option("database.password", std::env::var("DB_PASSWORD").ok())?
            .set_override_option("database.name", std::env::var("DB_NAME").ok())?
            .set_override_option("upload.dir", std::env::var("UPLOAD_DIR").ok())?;

        // 只给出 DB_HOST 时按分项拼接 MySQL 连接
        if std::env::var("DATABASE_URL").is_err() && std::env::var("DB_HOST").is_ok() {
            builder = builder.set_override("database.url", "")?;
        }

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        if app_config.database.url.trim().is_empty() {
            app_config.database.url = app_config.database.mysql_url();
        }

        // 未配置密钥时使用随机密钥，重启后已有会话全部失效
        if app_config.session.secret.is_empty() {
            app_config.session.secret = random_secret(48);
            app_config.session.secret_generated = true;
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
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

fn random_secret(length: usize) -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = with_defaults(Config::builder())
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("defaults should form a complete config");
        assert_eq!(config.session.max_age_days, 7);
        assert_eq!(config.cache.cache_type, "moka");
        assert!(config.upload.allowed_types.contains(&".pdf".to_string()));
        assert!(!config.session.secret_generated);
    }

    #[test]
    fn test_random_secret_length() {
        let secret = random_secret(32);
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
