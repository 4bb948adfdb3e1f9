// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::services::rank_extractor::RankPlacement;

/// 排名记录实体
///
/// 一次成功的排名检查产出的不可变历史记录。记录只追加，
/// 核心从不更新或删除既有行——排名历史是日志而非可变状态。
/// position 与 found_url 要么同时存在（目标命中），
/// 要么同时缺失（目标未出现在结果中，这是合法结果而非错误）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRecord {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 关键词标识符
    pub keyword_id: i64,
    /// 目标URL在结果中的位置（从1开始），未命中时缺失
    pub position: Option<i32>,
    /// 命中的结果URL（供应商返回的原始形式），未命中时缺失
    pub found_url: Option<String>,
    /// 本次检查的结果总数
    pub total_results: i32,
    /// 检查时间，同一关键词的记录仅由它确定先后
    pub checked_at: DateTime<Utc>,
}

impl RankingRecord {
    /// 从一次提取结果创建排名记录
    ///
    /// # 参数
    ///
    /// * `keyword_id` - 关键词标识符
    /// * `placement` - 提取到的排名位置，未命中时为 None
    /// * `total_results` - 结果总数
    ///
    /// # 返回值
    ///
    /// 返回一个新的RankingRecord实例，包含生成的唯一ID和当前时间戳
    pub fn new(keyword_id: i64, placement: Option<RankPlacement>, total_results: i32) -> Self {
        let (position, found_url) = match placement {
            Some(p) => (Some(p.position), Some(p.url)),
            None => (None, None),
        };

        Self {
            id: Uuid::new_v4(),
            keyword_id,
            position,
            found_url,
            total_results,
            checked_at: Utc::now(),
        }
    }

    /// 目标是否出现在结果中
    pub fn is_found(&self) -> bool {
        self.position.is_some()
    }
}
