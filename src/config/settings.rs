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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 提交请求固定携带的桌面浏览器标识
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 YaBrowser/25.2.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含数据库、Redis、缓存、服务器、检查流水线和搜索供应商等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 缓存配置
    pub cache: CacheSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 排名检查流水线配置
    pub pipeline: PipelineSettings,
    /// Yandex 搜索 API 配置
    pub yandex: YandexSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 缓存配置设置
#[derive(Debug, Deserialize)]
pub struct CacheSettings {
    /// 缓存后端（"redis" 或 "memory"）
    pub backend: String,
    /// 搜索结果缓存的新鲜度窗口（秒）
    pub ttl_secs: u64,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 排名检查流水线配置设置
///
/// 默认值即为流水线的既定行为：每 5 秒轮询一次、上限 60 次、
/// 失败后固定延迟 60 秒重试、最多重试 3 次。
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 工作器数量
    pub workers: usize,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 单次提交的最大轮询次数
    pub max_poll_attempts: u32,
    /// 重试前的固定延迟（秒）
    pub retry_delay_secs: u64,
    /// 每个检查请求的最大重试次数
    pub max_retries: i32,
    /// 工作器租约超时（秒），超时的 active 检查会被重新入队
    pub lock_timeout_secs: u64,
}

impl PipelineSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

/// Yandex 搜索 API 配置设置
///
/// 凭证与端点在构造时注入搜索客户端，进程内没有全局可变状态。
/// 端点可配置，测试可以指向本地 mock 服务。
#[derive(Debug, Clone, Deserialize)]
pub struct YandexSettings {
    /// API 密钥
    pub api_key: String,
    /// 云目录 ID
    pub folder_id: String,
    /// 异步搜索提交端点
    pub search_url: String,
    /// 操作状态查询端点
    pub operations_url: String,
    /// 请求中携带的浏览器标识
    pub user_agent: String,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
}

impl YandexSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量按序加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Default DB pool settings
            .set_default("database.url", "postgres://localhost/serptrack")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 5)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default Redis / cache settings
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("cache.backend", "redis")?
            .set_default("cache.ttl_secs", 900)?
            // Default pipeline settings
            .set_default("pipeline.workers", 4)?
            .set_default("pipeline.poll_interval_secs", 5)?
            .set_default("pipeline.max_poll_attempts", 60)?
            .set_default("pipeline.retry_delay_secs", 60)?
            .set_default("pipeline.max_retries", 3)?
            .set_default("pipeline.lock_timeout_secs", 600)?
            // Default provider settings
            .set_default("yandex.api_key", "")?
            .set_default("yandex.folder_id", "")?
            .set_default(
                "yandex.search_url",
                "https://searchapi.api.cloud.yandex.net/v2/web/searchAsync",
            )?
            .set_default(
                "yandex.operations_url",
                "https://operation.api.cloud.yandex.net/operations",
            )?
            .set_default("yandex.user_agent", DEFAULT_USER_AGENT)?
            .set_default("yandex.request_timeout_secs", 10)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SERPTRACK").separator("__"));

        builder.build()?.try_deserialize()
    }
}
