// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::serp::SerpSnapshot;
use async_trait::async_trait;
use thiserror::Error;

/// 搜索供应商错误
///
/// Submit 与 Poll 是瞬态错误（网络/超时/非 2xx），由调度器决定
/// 是否重试；Decode 表示载荷损坏，重试不会改变结果。
#[derive(Debug, Error, Clone)]
pub enum SearchError {
    #[error("Search submit failed: {0}")]
    Submit(String),
    #[error("Operation poll failed: {0}")]
    Poll(String),
    #[error("Malformed search payload: {0}")]
    Decode(String),
}

impl SearchError {
    /// 该错误是否属于可在下一个间隔重试的瞬态失败
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchError::Submit(_) | SearchError::Poll(_))
    }
}

/// 单次轮询的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 操作尚未完成，到下一个间隔再查
    Pending,
    /// 操作完成且载荷解码成功
    Complete(SerpSnapshot),
}

/// 异步搜索供应商特质
///
/// 供应商在自己那侧异步执行搜索：提交得到操作句柄，
/// 随后按句柄查询状态直到完成。轮询节奏、次数上限
/// 和重试策略全部由调度器持有——实现本身绝不重试，
/// 也不在内部睡眠等待。
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 提交一次异步搜索，成功时返回操作句柄
    async fn submit(&self, query: &str, region: &str) -> Result<String, SearchError>;

    /// 查询一次操作状态；完成时载荷已解码为结果快照
    async fn fetch(&self, operation_id: &str) -> Result<PollOutcome, SearchError>;

    /// 供应商名称，用于日志与指标标签
    fn name(&self) -> &'static str;
}
