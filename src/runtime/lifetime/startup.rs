use crate::cache::ObjectCache;
use crate::cache::register::{create_object_cache, debug_registry};
use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    match create_object_cache(cache_type).await {
        Ok(cache) => Ok(cache),
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}, falling back to moka", cache_type, e);
            create_object_cache("moka").await
        }
        Err(e) => Err(e),
    }
}

/// 确保上传目录存在
async fn ensure_upload_dir() -> Result<()> {
    let dir = &AppConfig::get().upload.dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PortalError::file_operation(format!("创建上传目录 {dir} 失败: {e}")))
}

/// 准备服务器启动的上下文（存储、缓存、上传目录）
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if cfg!(debug_assertions) {
        debug_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    ensure_upload_dir().await?;
    debug!("Upload directory ready: {}", AppConfig::get().upload.dir);

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
