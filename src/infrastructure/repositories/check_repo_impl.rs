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

use crate::domain::models::check::{CheckPhase, CheckStatus, RankCheck};
use crate::domain::repositories::check_repository::{CheckRepository, RepositoryError};
use crate::infrastructure::database::entities::check as check_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 工作器租约时长
///
/// 租约在正常执行中会由阶段流转主动释放；只有工作器崩溃时
/// 租约才会走到期回收路径。
const LOCK_LEASE_SECS: i64 = 600;

/// 排名检查仓库实现
///
/// 基于SeaORM实现的检查数据访问层。出队不依赖
/// FOR UPDATE SKIP LOCKED，而是先选候选再做受保护的
/// 条件更新，同样的语义在 Postgres 与 SQLite 上都成立。
#[derive(Clone)]
pub struct CheckRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl CheckRepositoryImpl {
    /// 创建新的检查仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的检查仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<check_entity::Model> for RankCheck {
    fn from(model: check_entity::Model) -> Self {
        Self {
            id: model.id,
            keyword_id: model.keyword_id,
            query: model.query,
            target_url: model.target_url,
            region: model.region,
            status: model.status.parse().unwrap_or_default(),
            phase: serde_json::from_value(model.phase).unwrap_or(CheckPhase::Submit),
            attempt_count: model.attempt_count,
            max_retries: model.max_retries,
            last_error: model.last_error,
            scheduled_at: model.scheduled_at,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
            lock_token: model.lock_token,
            lock_expires_at: model.lock_expires_at,
        }
    }
}

impl From<RankCheck> for check_entity::ActiveModel {
    fn from(check: RankCheck) -> Self {
        Self {
            id: Set(check.id),
            keyword_id: Set(check.keyword_id),
            query: Set(check.query.clone()),
            target_url: Set(check.target_url.clone()),
            region: Set(check.region.clone()),
            status: Set(check.status.to_string()),
            phase: Set(serde_json::to_value(&check.phase).unwrap_or_default()),
            attempt_count: Set(check.attempt_count),
            max_retries: Set(check.max_retries),
            last_error: Set(check.last_error.clone()),
            scheduled_at: Set(check.scheduled_at),
            created_at: Set(check.created_at),
            started_at: Set(check.started_at),
            completed_at: Set(check.completed_at),
            updated_at: Set(check.updated_at),
            lock_token: Set(check.lock_token),
            lock_expires_at: Set(check.lock_expires_at),
        }
    }
}

#[async_trait]
impl CheckRepository for CheckRepositoryImpl {
    async fn create(&self, check: &RankCheck) -> Result<RankCheck, RepositoryError> {
        let model: check_entity::ActiveModel = check.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(check.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RankCheck>, RepositoryError> {
        let model = check_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, check: &RankCheck) -> Result<RankCheck, RepositoryError> {
        let mut model: check_entity::ActiveModel = check.clone().into();
        model.updated_at = Set(Utc::now().into());

        let updated_model = model.update(self.db.as_ref()).await?;
        Ok(updated_model.into())
    }

    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<RankCheck>, RepositoryError> {
        let now = Utc::now();

        let candidate = check_entity::Entity::find()
            .filter(check_entity::Column::Status.eq(CheckStatus::Queued.to_string()))
            .filter(
                Condition::any()
                    .add(check_entity::Column::ScheduledAt.is_null())
                    .add(check_entity::Column::ScheduledAt.lte(now)),
            )
            .order_by_asc(check_entity::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        let Some(candidate) = candidate else {
            return Ok(None);
        };

        // 受保护的认领：status 条件保证同一候选只会被一个工作器
        // 改成 Active，落空的一方拿到 rows_affected == 0。
        let lease_until: DateTime<FixedOffset> =
            (now + chrono::Duration::seconds(LOCK_LEASE_SECS)).into();
        let claimed = check_entity::Entity::update_many()
            .col_expr(
                check_entity::Column::Status,
                Expr::value(CheckStatus::Active.to_string()),
            )
            .col_expr(check_entity::Column::LockToken, Expr::value(Some(worker_id)))
            .col_expr(
                check_entity::Column::LockExpiresAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(lease_until)),
            )
            .col_expr(
                check_entity::Column::StartedAt,
                Expr::cust_with_values("COALESCE(started_at, ?)", [now]),
            )
            .col_expr(
                check_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(now.into()),
            )
            .filter(check_entity::Column::Id.eq(candidate.id))
            .filter(check_entity::Column::Status.eq(CheckStatus::Queued.to_string()))
            .exec(self.db.as_ref())
            .await?;

        if claimed.rows_affected != 1 {
            // 被其它工作器抢先，下一轮出队再试
            return Ok(None);
        }

        let model = check_entity::Entity::find_by_id(candidate.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Some(model.into()))
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let check = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = check;
        updated.status = CheckStatus::Completed;
        updated.completed_at = Some(Utc::now().into());
        updated.lock_token = None;
        updated.lock_expires_at = None;
        self.update(&updated).await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), RepositoryError> {
        let check = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = check;
        updated.status = CheckStatus::Failed;
        updated.completed_at = Some(Utc::now().into());
        updated.last_error = Some(reason.to_string());
        updated.lock_token = None;
        updated.lock_expires_at = None;
        self.update(&updated).await?;
        Ok(())
    }

    async fn reset_stuck_checks(&self, timeout: chrono::Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - timeout;

        let result = check_entity::Entity::update_many()
            .col_expr(
                check_entity::Column::Status,
                Expr::value(CheckStatus::Queued.to_string()),
            )
            .col_expr(
                check_entity::Column::LockToken,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(
                check_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(check_entity::Column::Status.eq(CheckStatus::Active.to_string()))
            .filter(
                Condition::any()
                    .add(check_entity::Column::LockExpiresAt.lte(Utc::now()))
                    .add(
                        Condition::all()
                            .add(check_entity::Column::LockExpiresAt.is_null())
                            .add(check_entity::Column::StartedAt.lte(threshold)),
                    ),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
