// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::check_repository::CheckRepository;
use chrono::Duration;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{error, info};

/// 队列维护调度器
///
/// 实际的检查调度（领取到期检查）由工作器通过 acquire_next
/// 主动拉取，这里只负责周期性维护：把租约过期仍处于
/// Active 的检查重新入队，崩溃的工作器不会让检查永久卡死。
pub struct MaintenanceScheduler<R: CheckRepository + Send + Sync + 'static> {
    /// 检查仓库
    repository: Arc<R>,
    /// 超过该时长未完成的 active 检查视为卡死
    lock_timeout: Duration,
}

impl<R: CheckRepository + Send + Sync + 'static> MaintenanceScheduler<R> {
    /// 创建新的维护调度器实例
    ///
    /// # 参数
    ///
    /// * `repository` - 检查仓库
    /// * `lock_timeout` - 卡死判定时长
    ///
    /// # 返回值
    ///
    /// 返回新的维护调度器实例
    pub fn new(repository: Arc<R>, lock_timeout: Duration) -> Self {
        Self {
            repository,
            lock_timeout,
        }
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(&self) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let lock_timeout = self.lock_timeout;

        tokio::spawn(async move {
            let mut interval = interval(TokioDuration::from_secs(60)); // 每分钟检查一次

            loop {
                interval.tick().await;

                match repository.reset_stuck_checks(lock_timeout).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Requeued {} stuck checks", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to requeue stuck checks: {}", e);
                    }
                }
            }
        })
    }
}
