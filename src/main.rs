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

use axum::Extension;
use serptrack::config::settings::Settings;
use serptrack::infrastructure::cache::redis_client::RedisClient;
use serptrack::infrastructure::cache::serp_cache::{MemorySerpCache, RedisSerpCache, SerpCache};
use serptrack::infrastructure::database::connection;
use serptrack::infrastructure::repositories::{CheckRepositoryImpl, RankingRepositoryImpl};
use serptrack::infrastructure::search::YandexProvider;
use serptrack::presentation::routes;
use serptrack::queue::check_queue::DatabaseCheckQueue;
use serptrack::queue::scheduler::MaintenanceScheduler;
use serptrack::workers::manager::WorkerManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use serptrack::utils::telemetry;
use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting serptrack...");

    // Initialize Prometheus Metrics
    serptrack::infrastructure::metrics::init_metrics();

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize the SERP cache backend
    let cache: Arc<dyn SerpCache> = if settings.cache.backend == "redis" {
        let redis_client = RedisClient::new(&settings.redis.url).await?;
        info!("Redis client initialized");
        Arc::new(RedisSerpCache::new(redis_client))
    } else {
        Arc::new(MemorySerpCache::new())
    };
    info!("SERP cache backend: {}", cache.backend());

    // 5. Initialize Components
    let check_repo = Arc::new(CheckRepositoryImpl::new(db.clone()));
    let ranking_repo = Arc::new(RankingRepositoryImpl::new(db.clone()));
    let queue = Arc::new(DatabaseCheckQueue::new(
        check_repo.clone(),
        settings.pipeline.max_retries,
    ));
    let provider = Arc::new(YandexProvider::new(settings.yandex.clone()));

    // 6. Start the maintenance scheduler (requeues stuck checks)
    let scheduler = MaintenanceScheduler::new(
        check_repo.clone(),
        chrono::Duration::seconds(settings.pipeline.lock_timeout_secs as i64),
    );
    scheduler.start();

    // 7. Start Workers
    let mut worker_manager = WorkerManager::new(
        check_repo.clone(),
        ranking_repo.clone(),
        provider.clone(),
        cache.clone(),
        settings.pipeline.clone(),
        Duration::from_secs(settings.cache.ttl_secs),
    );
    worker_manager.start_workers(settings.pipeline.workers).await;

    // 8. Start HTTP server
    let app = routes::routes()
        .layer(Extension(queue))
        .layer(Extension(check_repo.clone()))
        .layer(Extension(ranking_repo.clone()))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            worker_manager.wait_for_shutdown().await;
        })
        .await?;

    Ok(())
}
