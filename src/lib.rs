//! SRP Portal - 社会责任项目门户的评分与提交后端
//!
//! 基于 Actix Web 构建，导师为所负责团队评分，学生提交项目申报。
//!
//! # 架构
//! - `cache`: 缓存层（Moka），缓存已认证用户
//! - `client`: 客户端库（附件上传重试、提交前检查、表单状态）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `scoring`: 评分细则与汇总
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod client;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod scoring;
pub mod services;
pub mod storage;
pub mod utils;
