// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 排名检查任务表迁移
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Checks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Checks::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Checks::KeywordId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Checks::Query).string().not_null())
                    .col(ColumnDef::new(Checks::TargetUrl).string().not_null())
                    .col(ColumnDef::new(Checks::Region).string().not_null())
                    .col(ColumnDef::new(Checks::Status).string().not_null())
                    .col(ColumnDef::new(Checks::Phase).json().not_null())
                    .col(
                        ColumnDef::new(Checks::AttemptCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Checks::MaxRetries)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(Checks::LastError).text().null())
                    .col(
                        ColumnDef::new(Checks::ScheduledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Checks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Checks::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Checks::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Checks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Checks::LockToken).uuid().null())
                    .col(
                        ColumnDef::new(Checks::LockExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 出队查询按 (status, scheduled_at) 扫描
        manager
            .create_index(
                Index::create()
                    .name("idx_checks_status_scheduled")
                    .table(Checks::Table)
                    .col(Checks::Status)
                    .col(Checks::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checks_keyword")
                    .table(Checks::Table)
                    .col(Checks::KeywordId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Checks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Checks {
    Table,
    Id,
    KeywordId,
    Query,
    TargetUrl,
    Region,
    Status,
    Phase,
    AttemptCount,
    MaxRetries,
    LastError,
    ScheduledAt,
    CreatedAt,
    StartedAt,
    CompletedAt,
    UpdatedAt,
    LockToken,
    LockExpiresAt,
}
