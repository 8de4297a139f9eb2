pub mod admin;
pub mod evaluations;
pub mod files;
pub mod mentor;
pub mod proposals;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin::configure_admin_routes;
pub use files::configure_file_routes;
pub use mentor::configure_mentor_routes;
pub use proposals::configure_proposal_routes;

/// 注册全部路由
pub fn configure_all_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(configure_mentor_routes)
        .configure(configure_proposal_routes)
        .configure(configure_admin_routes)
        .configure(configure_file_routes);
}
