// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::check_repository::RepositoryError;
use crate::domain::search::provider::SearchError;
use thiserror::Error;

/// 一次检查执行的失败分类
///
/// 调度器依据该分类决定局部恢复还是立即失败：
/// 瞬态与超时走有上限的固定延迟重试；解码与持久化失败
/// 重试不会改变结果，立即置为失败并向上暴露。
#[derive(Error, Debug)]
pub enum CheckError {
    /// 提交阶段的瞬态外部错误（网络/超时/非 2xx）
    #[error("Transient provider error: {0}")]
    Transient(#[source] SearchError),

    /// 轮询预算耗尽仍未完成（含持续出错的轮询）
    #[error("Search operation timed out after {polls} polls")]
    Timeout { polls: u32 },

    /// 载荷解码失败
    #[error("Payload decode failed: {0}")]
    Decode(#[source] SearchError),

    /// 查询成功但记录写入失败
    #[error("Ranking persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl CheckError {
    /// 该失败是否允许重新提交整个检查
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckError::Transient(_) | CheckError::Timeout { .. })
    }

    /// 失败类别，用于日志与指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Transient(_) => "transient",
            CheckError::Timeout { .. } => "timeout",
            CheckError::Decode(_) => "decode",
            CheckError::Persistence(_) => "persistence",
        }
    }
}
