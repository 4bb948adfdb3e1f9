// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::check::{CheckRequest, RankCheck};
use crate::domain::repositories::check_repository::CheckRepository;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::check_repository::RepositoryError),
}

/// 检查队列特质
///
/// 队列是数据库支撑的：入队即持久化，出队即租约认领。
/// 轮询与重试的重新入队不走队列接口，由工作器直接写回
/// 检查的 scheduled_at。
#[async_trait]
pub trait CheckQueue: Send + Sync {
    /// 入队检查请求
    async fn enqueue(&self, request: CheckRequest) -> Result<RankCheck, QueueError>;

    /// 出队一个到期的检查
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<RankCheck>, QueueError>;

    /// 完成检查
    async fn complete(&self, check_id: Uuid) -> Result<(), QueueError>;

    /// 永久失败检查
    async fn fail(&self, check_id: Uuid, reason: &str) -> Result<(), QueueError>;
}

/// 数据库检查队列实现
pub struct DatabaseCheckQueue<R: CheckRepository> {
    /// 检查仓库
    repository: Arc<R>,
    /// 新检查的重试上限
    max_retries: i32,
}

impl<R: CheckRepository> DatabaseCheckQueue<R> {
    /// 创建新的数据库检查队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 检查仓库
    /// * `max_retries` - 新入队检查允许的最大重试次数
    ///
    /// # 返回值
    ///
    /// 返回新的数据库检查队列实例
    pub fn new(repository: Arc<R>, max_retries: i32) -> Self {
        Self {
            repository,
            max_retries,
        }
    }
}

#[async_trait]
impl<R: CheckRepository> CheckQueue for DatabaseCheckQueue<R> {
    /// 入队检查请求
    ///
    /// # 参数
    ///
    /// * `request` - 要入队的检查请求
    ///
    /// # 返回值
    ///
    /// * `Ok(RankCheck)` - 入队成功的检查
    /// * `Err(QueueError)` - 入队失败
    async fn enqueue(&self, request: CheckRequest) -> Result<RankCheck, QueueError> {
        let mut check = RankCheck::new(request);
        check.max_retries = self.max_retries;

        let created = self.repository.create(&check).await?;
        Ok(created)
    }

    /// 出队一个到期的检查
    ///
    /// # 参数
    ///
    /// * `worker_id` - 工作者ID
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(RankCheck))` - 成功出队的检查
    /// * `Ok(None)` - 没有到期的检查
    /// * `Err(QueueError)` - 出队失败
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<RankCheck>, QueueError> {
        let check = self.repository.acquire_next(worker_id).await?;
        Ok(check)
    }

    /// 完成检查
    ///
    /// # 参数
    ///
    /// * `check_id` - 检查ID
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功
    /// * `Err(QueueError)` - 失败
    async fn complete(&self, check_id: Uuid) -> Result<(), QueueError> {
        self.repository.mark_completed(check_id).await?;
        Ok(())
    }

    /// 永久失败检查
    ///
    /// # 参数
    ///
    /// * `check_id` - 检查ID
    /// * `reason` - 失败原因，落入检查的 last_error
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功
    /// * `Err(QueueError)` - 失败
    async fn fail(&self, check_id: Uuid, reason: &str) -> Result<(), QueueError> {
        self.repository.mark_failed(check_id, reason).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: CheckQueue + ?Sized> CheckQueue for Arc<T> {
    async fn enqueue(&self, request: CheckRequest) -> Result<RankCheck, QueueError> {
        (**self).enqueue(request).await
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<RankCheck>, QueueError> {
        (**self).dequeue(worker_id).await
    }

    async fn complete(&self, check_id: Uuid) -> Result<(), QueueError> {
        (**self).complete(check_id).await
    }

    async fn fail(&self, check_id: Uuid, reason: &str) -> Result<(), QueueError> {
        (**self).fail(check_id, reason).await
    }
}
