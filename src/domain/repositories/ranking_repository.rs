// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingRecord;
use crate::domain::repositories::check_repository::RepositoryError;
use async_trait::async_trait;

/// 排名记录仓库特质
///
/// 定义排名历史的数据访问接口。写入只追加；存储错误必须向上
/// 传播——静默丢失一条记录会让历史序列无法区分
/// "没检查过"与"检查过但未命中"。
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// 追加一条排名记录
    async fn insert(&self, record: &RankingRecord) -> Result<RankingRecord, RepositoryError>;
    /// 按关键词读取最近的记录，按 checked_at 倒序
    async fn find_by_keyword(
        &self,
        keyword_id: i64,
        limit: u64,
    ) -> Result<Vec<RankingRecord>, RepositoryError>;
}
