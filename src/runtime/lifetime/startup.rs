use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::accounts::{AccountRole, NewAccount};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::upload::FileStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub files: FileStore,
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    // 根据配置选择缓存后端
    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", cache_type, e),
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);
    }

    // 配置的缓存不可用时回退到内存缓存
    if cache_type != "moka"
        && let Some(fallback_constructor) = get_object_cache_plugin("moka")
    {
        warn!("Falling back to memory cache");
        match fallback_constructor().await {
            Ok(cache) => {
                warn!("Successfully created fallback Moka (in-memory) cache backend");
                return Ok(Arc::from(cache));
            }
            Err(fallback_e) => warn!("Failed to create fallback Moka cache: {}", fallback_e),
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何账号，则创建一个默认的 admin 账号
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_accounts().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} account(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No accounts found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count accounts: {}, skipping admin seed", e);
            return;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin = NewAccount {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password_hash,
        role: AccountRole::Administrator,
        first_name: String::new(),
        last_name: String::new(),
    };

    match storage.create_account(admin).await {
        Ok(created) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                created.account.id, created.account.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存与上传目录
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        debug!(
            "Registered cache plugins: {:?}",
            crate::cache::register::registered_object_cache_plugins()
        );
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    seed_admin(&storage).await;

    // 创建缓存实例
    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let files = FileStore::from_config();
    files
        .ensure_dirs()
        .await
        .expect("Failed to create upload directories");
    warn!("Upload directory ready at {}", files.root().display());

    StartupContext {
        storage,
        cache,
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_length_and_charset() {
        let password = generate_random_password(16);
        assert_eq!(password.chars().count(), 16);
        assert!(password.chars().all(|c| c.is_ascii_graphic()));
    }

    #[tokio::test]
    async fn test_seed_admin_only_on_empty_database() {
        let storage: Arc<dyn Storage> = Arc::new(
            crate::storage::sea_orm_storage::SeaOrmStorage::in_memory()
                .await
                .expect("in-memory storage"),
        );

        seed_admin(&storage).await;
        let admin = storage
            .get_account_by_username("admin")
            .await
            .expect("query")
            .expect("seeded admin");
        assert_eq!(admin.role, AccountRole::Administrator);

        seed_admin(&storage).await;
        assert_eq!(storage.count_accounts().await.expect("count"), 1);
    }
}
