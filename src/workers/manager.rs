// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PipelineSettings;
use crate::domain::repositories::check_repository::CheckRepository;
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::domain::search::provider::SearchProvider;
use crate::infrastructure::cache::serp_cache::SerpCache;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::check_worker::CheckWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
pub struct WorkerManager<C, R, P>
where
    C: CheckRepository + Send + Sync + 'static,
    R: RankingRepository + Send + Sync + 'static,
    P: SearchProvider + Send + Sync + 'static,
{
    repository: Arc<C>,
    ranking_repository: Arc<R>,
    provider: Arc<P>,
    cache: Arc<dyn SerpCache>,
    pipeline: PipelineSettings,
    cache_ttl: Duration,
    handles: Vec<JoinHandle<()>>,
}

impl<C, R, P> WorkerManager<C, R, P>
where
    C: CheckRepository + Send + Sync + 'static,
    R: RankingRepository + Send + Sync + 'static,
    P: SearchProvider + Send + Sync + 'static,
{
    pub fn new(
        repository: Arc<C>,
        ranking_repository: Arc<R>,
        provider: Arc<P>,
        cache: Arc<dyn SerpCache>,
        pipeline: PipelineSettings,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            ranking_repository,
            provider,
            cache,
            pipeline,
            cache_ttl,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub async fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = CheckWorker::new(
                self.repository.clone(),
                self.ranking_repository.clone(),
                self.provider.clone(),
                self.cache.clone(),
                RetryPolicy::from_settings(&self.pipeline),
                self.pipeline.clone(),
                self.cache_ttl,
            );

            // We spawn the worker loop on a separate task to avoid blocking the main thread
            // or the loop that spawns workers.
            let handle = tokio::spawn(async move {
                worker.run().await;
            });
            self.handles.push(handle);
        }

        info!("Started {} check workers", count);
    }

    /// 等待关闭信号并关闭工作进程
    ///
    /// 监听关闭信号并优雅地关闭所有工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        info!("Shutting down workers...");
        for handle in &self.handles {
            handle.abort();
        }

        info!("Workers shut down successfully");
    }
}
