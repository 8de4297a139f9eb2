//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod evaluations;
mod files;
mod proposals;
mod teams;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use dashmap::DashMap;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    /// 按团队串行化评分写入
    team_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            db,
            team_locks: Arc::new(DashMap::new()),
        }
    }

    /// 内存 SQLite（单连接，连接关闭即丢弃数据）
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self::from_connection(db))
    }

    /// 文件 SQLite，连接池可多连接；调用方可用同一连接构造多个存储实例
    #[cfg(test)]
    pub(crate) async fn file_backed(path: &std::path::Path, connections: u32) -> Result<DatabaseConnection> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let db = Self::connect_sqlite(&url, connections, 5).await?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(db)
    }

    /// 获取团队写锁
    pub(crate) fn team_lock(&self, team_id: i64) -> Arc<Mutex<()>> {
        self.team_locks.entry(team_id).or_default().clone()
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, max_connections: u32, timeout_secs: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    evaluations::{Evaluation, responses::EvaluationExportRow},
    files::File,
    proposals::{Proposal, ProposalRequest, ProposalState},
    teams::{MentorTeamSummary, Team, TeamOverview},
    users::User,
};
use crate::scoring::ValidatedEvaluation;
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 团队模块
    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>> {
        self.get_team_by_id_impl(team_id).await
    }

    async fn get_team_by_student(&self, user_id: i64) -> Result<Option<Team>> {
        self.get_team_by_student_impl(user_id).await
    }

    async fn list_mentor_teams(&self, mentor_id: i64) -> Result<Vec<MentorTeamSummary>> {
        self.list_mentor_teams_impl(mentor_id).await
    }

    async fn list_team_overviews(&self) -> Result<Vec<TeamOverview>> {
        self.list_team_overviews_impl().await
    }

    async fn get_team_overview(&self, team_id: i64) -> Result<Option<TeamOverview>> {
        self.get_team_overview_impl(team_id).await
    }

    // 评分模块
    async fn get_evaluation_by_team_id(&self, team_id: i64) -> Result<Option<Evaluation>> {
        self.get_evaluation_by_team_id_impl(team_id).await
    }

    async fn create_evaluation(
        &self,
        team_id: i64,
        mentor_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Evaluation> {
        self.create_evaluation_impl(team_id, mentor_id, evaluation)
            .await
    }

    async fn replace_evaluation(
        &self,
        team_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Option<Evaluation>> {
        self.replace_evaluation_impl(team_id, evaluation).await
    }

    async fn list_evaluation_export_rows(&self) -> Result<Vec<EvaluationExportRow>> {
        self.list_evaluation_export_rows_impl().await
    }

    // 申报模块
    async fn create_proposal(
        &self,
        team_id: i64,
        author_id: i64,
        proposal: ProposalRequest,
    ) -> Result<Proposal> {
        self.create_proposal_impl(team_id, author_id, proposal)
            .await
    }

    async fn get_proposal_by_id(&self, proposal_id: i64) -> Result<Option<Proposal>> {
        self.get_proposal_by_id_impl(proposal_id).await
    }

    async fn update_proposal(
        &self,
        proposal_id: i64,
        proposal: ProposalRequest,
    ) -> Result<Option<Proposal>> {
        self.update_proposal_impl(proposal_id, proposal).await
    }

    async fn review_proposal(
        &self,
        proposal_id: i64,
        state: ProposalState,
        remarks: Option<String>,
    ) -> Result<Option<Proposal>> {
        self.review_proposal_impl(proposal_id, state, remarks).await
    }

    // 文件模块
    async fn upload_file(
        &self,
        stored_name: &str,
        original_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        self.upload_file_impl(stored_name, original_name, file_size, file_type, user_id)
            .await
    }

    async fn get_file_by_stored_name(&self, stored_name: &str) -> Result<Option<File>> {
        self.get_file_by_stored_name_impl(stored_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("portal.db").unwrap(),
            "sqlite://portal.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u@h/db").unwrap(),
            "postgres://u@h/db"
        );
        assert!(SeaOrmStorage::build_database_url("portal").is_err());
    }
}
