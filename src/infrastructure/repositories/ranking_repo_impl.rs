// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingRecord;
use crate::domain::repositories::check_repository::RepositoryError;
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::infrastructure::database::entities::ranking as ranking_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;

/// 排名记录仓库实现
///
/// 排名历史是只追加的：实现只提供插入与按关键词回溯，
/// 不提供更新或删除。
#[derive(Clone)]
pub struct RankingRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RankingRepositoryImpl {
    /// 创建新的排名仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<ranking_entity::Model> for RankingRecord {
    fn from(model: ranking_entity::Model) -> Self {
        Self {
            id: model.id,
            keyword_id: model.keyword_id,
            position: model.position,
            found_url: model.found_url,
            total_results: model.total_results,
            checked_at: model.checked_at.with_timezone(&Utc),
        }
    }
}

#[async_trait]
impl RankingRepository for RankingRepositoryImpl {
    async fn insert(&self, record: &RankingRecord) -> Result<RankingRecord, RepositoryError> {
        let model = ranking_entity::ActiveModel {
            id: Set(record.id),
            keyword_id: Set(record.keyword_id),
            position: Set(record.position),
            found_url: Set(record.found_url.clone()),
            total_results: Set(record.total_results),
            checked_at: Set(record.checked_at.into()),
        };

        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_keyword(
        &self,
        keyword_id: i64,
        limit: u64,
    ) -> Result<Vec<RankingRecord>, RepositoryError> {
        let models = ranking_entity::Entity::find()
            .filter(ranking_entity::Column::KeywordId.eq(keyword_id))
            .order_by_desc(ranking_entity::Column::CheckedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
