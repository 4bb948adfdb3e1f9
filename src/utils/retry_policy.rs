// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PipelineSettings;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// 重试策略配置
///
/// 检查流水线的重试是固定延迟、有上限的：每次失败的提交周期
/// 之后等待固定时长再从头提交，最多重试 max_retries 次。
/// 延迟通过持久化的 scheduled_at 实现，而不是进程内退避等待。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_retries: i32,
    /// 重试前的固定延迟
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// 从流水线配置构建重试策略
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay(),
        }
    }

    /// 是否还有重试名额
    ///
    /// # 参数
    ///
    /// * `attempt` - 已经消耗的重试次数
    pub fn should_retry(&self, attempt: i32) -> bool {
        attempt < self.max_retries
    }

    /// 计算下次重试的到期时间
    pub fn next_attempt_at(&self, base_time: DateTime<Utc>) -> DateTime<Utc> {
        base_time + chrono::Duration::milliseconds(self.retry_delay.as_millis() as i64)
    }
}
