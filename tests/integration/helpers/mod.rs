// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use serptrack::config::settings::{PipelineSettings, YandexSettings, DEFAULT_USER_AGENT};
use serptrack::domain::models::check::{CheckStatus, RankCheck};
use serptrack::domain::repositories::check_repository::CheckRepository;
use serptrack::infrastructure::repositories::{CheckRepositoryImpl, RankingRepositoryImpl};
use serptrack::presentation::routes;
use serptrack::queue::check_queue::DatabaseCheckQueue;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 基于内存 SQLite 的测试应用
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub check_repo: Arc<CheckRepositoryImpl>,
    pub ranking_repo: Arc<RankingRepositoryImpl>,
}

/// 创建内存数据库并应用迁移
///
/// 单连接池：内存 SQLite 每个连接是独立数据库，连接数
/// 必须固定为 1 才能让所有组件看到同一份数据。
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("in-memory database must connect");
    Migrator::up(&db, None).await.expect("migrations must apply");

    Arc::new(db)
}

/// 构建完整的测试应用（HTTP 层 + 真实仓库，不启动工作器）
pub async fn create_test_app() -> TestApp {
    let db = create_test_db().await;
    let check_repo = Arc::new(CheckRepositoryImpl::new(db.clone()));
    let ranking_repo = Arc::new(RankingRepositoryImpl::new(db.clone()));
    let queue = Arc::new(DatabaseCheckQueue::new(check_repo.clone(), 3));

    let app = routes::routes()
        .layer(Extension(queue))
        .layer(Extension(check_repo.clone()))
        .layer(Extension(ranking_repo.clone()));

    let server = TestServer::new(app).expect("test server must build");

    TestApp {
        server,
        db,
        check_repo,
        ranking_repo,
    }
}

/// 指向本地 mock 服务的供应商配置
pub fn mock_yandex_settings(base_url: &str) -> YandexSettings {
    YandexSettings {
        api_key: "test-key".to_string(),
        folder_id: "test-folder".to_string(),
        search_url: format!("{}/v2/web/searchAsync", base_url),
        operations_url: format!("{}/operations", base_url),
        user_agent: DEFAULT_USER_AGENT.to_string(),
        request_timeout_secs: 5,
    }
}

/// 无延迟的流水线配置，让测试里的轮询与重试立即到期
pub fn fast_pipeline(max_poll_attempts: u32, max_retries: i32) -> PipelineSettings {
    PipelineSettings {
        workers: 1,
        poll_interval_secs: 0,
        max_poll_attempts,
        retry_delay_secs: 0,
        max_retries,
        lock_timeout_secs: 600,
    }
}

/// 构造供应商完成载荷：JSON 快照经 base64 编码后放入 rawData
pub fn encoded_snapshot(urls: &[&str]) -> String {
    let items: Vec<_> = urls.iter().map(|u| json!({ "url": u })).collect();
    let body = json!({ "items": items }).to_string();
    STANDARD.encode(body)
}

/// 轮询仓库直到检查进入指定状态
///
/// 工作器在后台任务里推进检查，这里只能观察数据库。
pub async fn wait_for_status(
    repo: &CheckRepositoryImpl,
    id: Uuid,
    expected: CheckStatus,
    timeout: Duration,
) -> RankCheck {
    let deadline = Utc::now() + chrono::Duration::from_std(timeout).expect("timeout fits");

    loop {
        if let Some(check) = repo.find_by_id(id).await.expect("find_by_id") {
            if check.status == expected {
                return check;
            }
        }

        if Utc::now() > deadline {
            panic!("check {} did not reach {:?} within {:?}", id, expected, timeout);
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
