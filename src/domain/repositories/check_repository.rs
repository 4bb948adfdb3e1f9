// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::check::RankCheck;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 排名检查仓库特质
///
/// 定义检查任务的数据访问接口。`acquire_next` 是队列的核心：
/// 以原子方式把一条到期的 Queued 检查转为 Active 并盖上租约，
/// 同一条检查绝不会同时被两个工作器持有。
#[async_trait]
pub trait CheckRepository: Send + Sync {
    /// 创建新检查
    async fn create(&self, check: &RankCheck) -> Result<RankCheck, RepositoryError>;
    /// 根据ID查找检查
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RankCheck>, RepositoryError>;
    /// 更新检查（阶段、重试与调度字段）
    async fn update(&self, check: &RankCheck) -> Result<RankCheck, RepositoryError>;
    /// 领取下一条到期的检查，没有到期工作时返回 None
    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<RankCheck>, RepositoryError>;
    /// 标记检查已完成
    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记检查永久失败并记录原因
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), RepositoryError>;
    /// 重新入队租约过期的检查（工作器崩溃后恢复）
    async fn reset_stuck_checks(&self, timeout: chrono::Duration) -> Result<u64, RepositoryError>;
}
