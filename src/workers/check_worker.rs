// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::PipelineSettings;
use crate::domain::models::check::{CheckPhase, RankCheck};
use crate::domain::models::ranking::RankingRecord;
use crate::domain::models::serp::SerpSnapshot;
use crate::domain::repositories::check_repository::CheckRepository;
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::domain::search::provider::{PollOutcome, SearchProvider};
use crate::domain::services::rank_extractor::extract_rank;
use crate::infrastructure::cache::serp_cache::SerpCache;
use crate::utils::errors::CheckError;
use crate::utils::retry_policy::RetryPolicy;

/// 排名检查工作者
///
/// 从队列领取到期的检查并推进一个阶段：Submit 阶段查缓存、
/// 未命中则向供应商提交；Poll 阶段查询一次操作状态。
/// 阶段之间不在进程内等待，检查连同 next-due 时间写回
/// 数据库后工作器立即继续领取下一个检查。
pub struct CheckWorker<C, R, P>
where
    C: CheckRepository + Send + Sync,
    R: RankingRepository + Send + Sync,
    P: SearchProvider + Send + Sync,
{
    repository: Arc<C>,
    ranking_repository: Arc<R>,
    provider: Arc<P>,
    cache: Arc<dyn SerpCache>,
    policy: RetryPolicy,
    pipeline: PipelineSettings,
    cache_ttl: Duration,
    worker_id: Uuid,
}

impl<C, R, P> CheckWorker<C, R, P>
where
    C: CheckRepository + Send + Sync,
    R: RankingRepository + Send + Sync,
    P: SearchProvider + Send + Sync,
{
    /// 创建新的检查工作器实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<C>,
        ranking_repository: Arc<R>,
        provider: Arc<P>,
        cache: Arc<dyn SerpCache>,
        policy: RetryPolicy,
        pipeline: PipelineSettings,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            ranking_repository,
            provider,
            cache,
            policy,
            pipeline,
            cache_ttl,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 运行检查工作器
    pub async fn run(&self) {
        info!(
            "Check worker {} started (provider: {})",
            self.worker_id,
            self.provider.name()
        );

        loop {
            match self.process_next_check().await {
                Ok(processed) => {
                    if !processed {
                        sleep(Duration::from_secs(1)).await;
                    }
                }
                Err(e) => {
                    error!("Error processing check: {}", e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn process_next_check(&self) -> Result<bool> {
        let check_opt = self.repository.acquire_next(self.worker_id).await?;

        if let Some(check) = check_opt {
            self.process_check(check).await?;
            return Ok(true);
        }

        Ok(false)
    }

    #[instrument(skip(self, check), fields(check_id = %check.id, keyword_id = check.keyword_id, phase = check.phase.name()))]
    async fn process_check(&self, check: RankCheck) -> Result<()> {
        info!("Processing check");

        match check.phase.clone() {
            CheckPhase::Submit => self.run_submit_phase(check).await,
            CheckPhase::Poll {
                operation_id,
                polls_done,
            } => self.run_poll_phase(check, operation_id, polls_done).await,
        }
    }

    /// 提交阶段：先查缓存，未命中则提交搜索并进入轮询
    async fn run_submit_phase(&self, mut check: RankCheck) -> Result<()> {
        match self.cache.get(&check.region, &check.query).await {
            Ok(Some(snapshot)) => {
                counter!("serp_cache_hit_total").increment(1);
                info!("SERP cache hit, skipping provider round trip");
                return self.finish_with_snapshot(check, snapshot).await;
            }
            Ok(None) => {
                counter!("serp_cache_miss_total").increment(1);
            }
            Err(e) => {
                // 缓存不可用降级为未命中，检查照常走完整流水线
                counter!("serp_cache_miss_total").increment(1);
                warn!("SERP cache read failed, treating as miss: {}", e);
            }
        }

        match self.provider.submit(&check.query, &check.region).await {
            Ok(operation_id) => {
                info!(operation_id = %operation_id, "Search submitted, polling scheduled");
                check.begin_polling(operation_id, self.next_poll_due());
                self.repository.update(&check).await?;
                Ok(())
            }
            Err(e) => {
                self.handle_retryable(check, CheckError::Transient(e))
                    .await
            }
        }
    }

    /// 轮询阶段：查询一次操作状态并决定完成、重新入队或超时
    async fn run_poll_phase(
        &self,
        check: RankCheck,
        operation_id: String,
        polls_done: u32,
    ) -> Result<()> {
        if polls_done >= self.pipeline.max_poll_attempts {
            // 恢复出的检查可能已经耗尽预算
            counter!("provider_poll_timeout_total").increment(1);
            return self
                .handle_retryable(check, CheckError::Timeout { polls: polls_done })
                .await;
        }

        match self.provider.fetch(&operation_id).await {
            Ok(PollOutcome::Complete(snapshot)) => {
                if let Err(e) = self
                    .cache
                    .set(&check.region, &check.query, &snapshot, self.cache_ttl)
                    .await
                {
                    warn!("SERP cache write failed: {}", e);
                }
                self.finish_with_snapshot(check, snapshot).await
            }
            Ok(PollOutcome::Pending) => self.schedule_next_poll(check, polls_done).await,
            Err(e) if e.is_transient() => {
                // 出错的轮询消耗预算，持续出错最终等同超时
                warn!(operation_id = %operation_id, "Poll attempt failed: {}", e);
                self.schedule_next_poll(check, polls_done).await
            }
            Err(e) => self.fail_permanently(check, CheckError::Decode(e)).await,
        }
    }

    async fn schedule_next_poll(&self, mut check: RankCheck, polls_done: u32) -> Result<()> {
        let polls_total = polls_done + 1;

        if polls_total >= self.pipeline.max_poll_attempts {
            counter!("provider_poll_timeout_total").increment(1);
            warn!(
                "Search operation still pending after {} polls, giving up",
                polls_total
            );
            return self
                .handle_retryable(check, CheckError::Timeout { polls: polls_total })
                .await;
        }

        if check.continue_polling(self.next_poll_due()).is_err() {
            // 不在轮询阶段的检查不可能走到这里
            return self
                .fail_permanently(check, CheckError::Timeout { polls: polls_total })
                .await;
        }
        self.repository.update(&check).await?;
        Ok(())
    }

    /// 终结阶段：提取排名、追加排名记录并完成检查
    async fn finish_with_snapshot(&self, check: RankCheck, snapshot: SerpSnapshot) -> Result<()> {
        let placement = extract_rank(&snapshot, &check.target_url);
        let record = RankingRecord::new(check.keyword_id, placement, snapshot.total_results());

        match self.ranking_repository.insert(&record).await {
            Ok(saved) => {
                self.repository.mark_completed(check.id).await?;
                counter!("rank_check_completed_total").increment(1);
                Self::observe_duration(&check);
                info!(
                    position = ?saved.position,
                    total_results = saved.total_results,
                    "Rank check completed"
                );
                Ok(())
            }
            Err(e) => {
                self.fail_permanently(check, CheckError::Persistence(e))
                    .await
            }
        }
    }

    /// 可重试失败：还有名额就按固定延迟重新入队，否则永久失败
    async fn handle_retryable(&self, mut check: RankCheck, err: CheckError) -> Result<()> {
        if self.policy.should_retry(check.attempt_count) {
            check.schedule_retry(err.to_string(), self.policy.next_attempt_at(Utc::now()));
            self.repository.update(&check).await?;
            counter!("rank_check_retries_total").increment(1);
            info!(
                attempt = check.attempt_count,
                max_retries = check.max_retries,
                "Scheduled retry in {}s: {}",
                self.policy.retry_delay.as_secs(),
                err
            );
            Ok(())
        } else {
            warn!("Check failed after {} retries", check.max_retries);
            self.fail_permanently(check, err).await
        }
    }

    /// 永久失败：不写排名记录，历史序列在此留下缺口
    async fn fail_permanently(&self, check: RankCheck, err: CheckError) -> Result<()> {
        error!("Rank check failed permanently: {}", err);
        self.repository.mark_failed(check.id, &err.to_string()).await?;
        counter!("rank_check_failed_total", "reason" => err.kind()).increment(1);
        Self::observe_duration(&check);
        Ok(())
    }

    fn next_poll_due(&self) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(self.pipeline.poll_interval_secs as i64)
    }

    fn observe_duration(check: &RankCheck) {
        if let Some(started) = check.started_at {
            let elapsed = Utc::now().signed_duration_since(started);
            histogram!("rank_check_duration_seconds")
                .record(elapsed.num_milliseconds().max(0) as f64 / 1000.0);
        }
    }
}
