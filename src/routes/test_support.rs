//! 路由测试：内存存储 + 真实中间件

use actix_web::web;
use std::sync::Arc;

use crate::storage::Storage;
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::utils::jwt::JwtUtils;
use crate::utils::{json_error_handler, path_error_handler, query_error_handler};

pub(crate) fn storage_data(storage: &SeaOrmStorage) -> web::Data<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = Arc::new(storage.clone());
    web::Data::new(storage)
}

pub(crate) fn param_handlers(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

pub(crate) fn bearer(user_id: i64, role: &str) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user_id, role).expect("token");
    ("Authorization", format!("Bearer {token}"))
}
